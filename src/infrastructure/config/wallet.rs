//! Wallet provider configuration.

use serde::Deserialize;

use crate::port::outbound::wallet::PayloadDialect;

/// One wallet provider reachable through a signing bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Identifier used on the command line and in session state.
    pub id: String,
    /// Base URL of the bridge that relays calls to the wallet.
    pub bridge_url: String,
    /// Payload shape the wallet accepts.
    #[serde(default)]
    pub dialect: PayloadDialect,
    /// Whether the wallet exposes generate-then-sign as a fallback path.
    #[serde(default)]
    pub split_submission: bool,
}

/// Wallet selection configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// Preferred concrete wallet name, matched as a case-insensitive substring.
    #[serde(default)]
    pub default_wallet: Option<String>,
    /// Provider used when none is given on the command line.
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl WalletConfig {
    /// Look up a provider by id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id.eq_ignore_ascii_case(id))
    }
}
