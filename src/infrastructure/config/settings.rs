//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; `HYPERFILL_NODE_URL` overrides
//! the node endpoint when set.
//!
//! # Example
//!
//! ```no_run
//! use hyperfill::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::contracts::{AssetsConfig, ContractsConfig, MarketConfig};
use super::logging::LoggingConfig;
use super::network::{GatewayConfig, NetworkConfig};
use super::wallet::WalletConfig;
use crate::domain::intent::FunctionId;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `network.node_url`.
pub const NODE_URL_ENV: &str = "HYPERFILL_NODE_URL";

/// Main application configuration.
///
/// Every section has defaults pointing at the testnet deployment, so an
/// empty file plus one `[[wallet.providers]]` entry is a working config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Ledger network selection.
    #[serde(default)]
    pub network: NetworkConfig,

    /// HTTP and finality-wait bounds for the ledger gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Vault, token and order-book program locations.
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Order-book market selection.
    #[serde(default)]
    pub market: MarketConfig,

    /// Fixed-point scales.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Wallet providers and selection preferences.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        if let Ok(url) = std::env::var(NODE_URL_ENV) {
            if !url.trim().is_empty() {
                config.network.node_url = url;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.network.node_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "node_url" }.into());
        }
        url::Url::parse(&self.network.node_url).map_err(|e| ConfigError::InvalidValue {
            field: "node_url",
            reason: e.to_string(),
        })?;

        if self.gateway.confirmation_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.gateway.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let vault = FunctionId::new(
            self.contracts.vault_address.as_str(),
            self.contracts.vault_module.as_str(),
            self.contracts.init_function.as_str(),
        );
        if FunctionId::parse(&vault.to_string()).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "vault_address",
                reason: "vault address, module and init function must be non-empty".to_string(),
            }
            .into());
        }
        if self.contracts.token_module().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "token_type",
                reason: "expected <address>::<module>::<struct>".to_string(),
            }
            .into());
        }

        let scales = [
            ("token_decimals", self.assets.token_decimals),
            ("base_decimals", self.assets.base_decimals),
            ("share_price_decimals", self.assets.share_price_decimals),
            ("price_decimals", self.market.price_decimals),
        ];
        for (field, scale) in scales {
            if scale > 18 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be at most 18".to_string(),
                }
                .into());
            }
        }

        let mut seen = HashSet::new();
        for provider in &self.wallet.providers {
            if provider.id.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "wallet.providers.id" }.into());
            }
            if !seen.insert(provider.id.to_ascii_lowercase()) {
                return Err(ConfigError::InvalidValue {
                    field: "wallet.providers.id",
                    reason: format!("duplicate provider '{}'", provider.id),
                }
                .into());
            }
            url::Url::parse(&provider.bridge_url).map_err(|e| ConfigError::InvalidValue {
                field: "wallet.providers.bridge_url",
                reason: format!("{}: {e}", provider.id),
            })?;
        }
        if let Some(default) = &self.wallet.default_provider {
            if self.wallet.provider(default).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "wallet.default_provider",
                    reason: format!("no provider named '{default}'"),
                }
                .into());
            }
        }

        Ok(())
    }
}
