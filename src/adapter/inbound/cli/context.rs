//! Per-invocation setup shared by the ledger-facing commands.

use tracing::debug;

use super::command::SessionArgs;
use super::output;
use crate::application::orchestrator::Orchestrator;
use crate::domain::session::WalletSession;
use crate::error::{ConfigError, Result, SessionError};
use crate::infrastructure::bootstrap::{self, Runtime};
use crate::infrastructure::config::settings::Config;

/// Loaded config, wired runtime and the selected provider.
pub struct CommandContext {
    pub config: Config,
    pub runtime: Runtime,
    provider: String,
}

impl CommandContext {
    /// Load config, start logging and build the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or names no usable provider.
    pub fn load(args: &SessionArgs) -> Result<Self> {
        let config = Config::load(&args.config)?;
        config.init_logging();
        let provider = resolve_provider(&config, args.provider.as_deref())?;
        let runtime = bootstrap::build(&config)?;
        Ok(Self {
            config,
            runtime,
            provider,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.runtime.orchestrator
    }

    pub fn provider_id(&self) -> &str {
        &self.provider
    }

    /// Adopt an already-authorised account, falling back to a prompting
    /// connect.
    ///
    /// # Errors
    ///
    /// Returns the session error if the handshake fails.
    pub async fn connect(&self) -> Result<WalletSession> {
        let message = format!("Connecting {}", self.provider);
        let pb = output::spinner(&message);
        let sessions = self.orchestrator().sessions();

        let restored = match sessions.restore(&self.provider).await {
            Ok(session) => session,
            Err(err) => {
                debug!(provider = %self.provider, error = %err, "Silent restore failed");
                None
            }
        };
        let result = match restored {
            Some(session) => Ok(session),
            None => self.orchestrator().connect(&self.provider).await,
        };

        match result {
            Ok(session) => {
                output::spinner_success(&pb, &format!("Connected {}", session.address));
                if !sessions.is_on_expected_network() {
                    output::warning(&format!(
                        "wallet reports network {}, expected {}",
                        session.network.as_deref().unwrap_or("unknown"),
                        sessions.expected_network()
                    ));
                }
                Ok(session)
            }
            Err(err) => {
                output::spinner_fail(&pb, &message);
                Err(err)
            }
        }
    }
}

/// Pick the provider: the requested one, else `wallet.default_provider`,
/// else the first configured.
///
/// # Errors
///
/// Returns `NoCompatibleWallet` for an unknown id and a config error when no
/// provider is configured.
pub fn resolve_provider(config: &Config, requested: Option<&str>) -> Result<String> {
    if let Some(id) = requested {
        return config
            .wallet
            .provider(id)
            .map(|p| p.id.clone())
            .ok_or_else(|| {
                SessionError::NoCompatibleWallet {
                    provider: id.to_string(),
                }
                .into()
            });
    }
    if let Some(id) = &config.wallet.default_provider {
        return Ok(id.clone());
    }
    config
        .wallet
        .providers
        .first()
        .map(|p| p.id.clone())
        .ok_or_else(|| {
            ConfigError::MissingField {
                field: "wallet.providers",
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testkit::config::config;

    #[test]
    fn requested_provider_matches_case_insensitively() {
        assert_eq!(resolve_provider(&config(), Some("MARTIAN")).unwrap(), "martian");
    }

    #[test]
    fn unknown_provider_is_no_compatible_wallet() {
        let err = resolve_provider(&config(), Some("phantom")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCompatibleWallet);
    }

    #[test]
    fn default_provider_wins_over_first() {
        let mut config = config();
        config.wallet.default_provider = Some("martian".into());
        assert_eq!(resolve_provider(&config, None).unwrap(), "martian");
    }

    #[test]
    fn first_provider_is_the_fallback() {
        let mut config = config();
        config.wallet.default_provider = None;
        assert_eq!(resolve_provider(&config, None).unwrap(), "adapter");
    }

    #[test]
    fn no_providers_is_a_config_error() {
        let mut config = config();
        config.wallet.providers.clear();
        config.wallet.default_provider = None;
        let err = resolve_provider(&config, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
