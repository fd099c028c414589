//! On-chain program addresses, asset types and market settings.

use serde::Deserialize;

use crate::domain::amount::{PRICE_TICK_DECIMALS, SHARE_PRICE_DECIMALS, TOKEN_DECIMALS};

/// Deployed program address used by the default testnet deployment.
pub const DEFAULT_PROGRAM_ADDRESS: &str =
    "0x96d2b185a5b581f98dc1df57b59a5875eb53b3a65ef7a9b0d5e42aa44c3b8b82";

/// Native coin type.
pub const APTOS_COIN: &str = "0x1::aptos_coin::AptosCoin";

/// Vault and token program locations.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_address")]
    pub vault_address: String,
    #[serde(default = "default_vault_module")]
    pub vault_module: String,
    /// Fully qualified coin type of the deposit token.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Fully qualified coin type of the native asset.
    #[serde(default = "default_base_asset")]
    pub base_asset: String,
    #[serde(default = "default_address")]
    pub orderbook_address: String,
    #[serde(default = "default_orderbook_module")]
    pub orderbook_module: String,
    /// Account resource the vault needs before a first deposit.
    #[serde(default)]
    pub user_resource: Option<String>,
    /// Entry function name (in the vault module) that creates it.
    #[serde(default = "default_init_function")]
    pub init_function: String,
}

fn default_address() -> String {
    DEFAULT_PROGRAM_ADDRESS.into()
}

fn default_vault_module() -> String {
    "hyperfill_vault".into()
}

fn default_token_type() -> String {
    format!("{DEFAULT_PROGRAM_ADDRESS}::mock_token::MockToken")
}

fn default_base_asset() -> String {
    APTOS_COIN.into()
}

fn default_orderbook_module() -> String {
    "orderbook".into()
}

fn default_init_function() -> String {
    "init_user".into()
}

impl ContractsConfig {
    /// Resource type the vault requires, defaulting to `<vault>::UserPosition`.
    #[must_use]
    pub fn user_resource_type(&self) -> String {
        self.user_resource.clone().unwrap_or_else(|| {
            format!(
                "{}::{}::UserPosition",
                self.vault_address, self.vault_module
            )
        })
    }

    /// Address and module of the deposit token, split from its coin type.
    #[must_use]
    pub fn token_module(&self) -> Option<(&str, &str)> {
        let mut parts = self.token_type.split("::");
        let address = parts.next()?;
        let module = parts.next()?;
        parts.next()?;
        Some((address, module))
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            vault_address: default_address(),
            vault_module: default_vault_module(),
            token_type: default_token_type(),
            base_asset: default_base_asset(),
            orderbook_address: default_address(),
            orderbook_module: default_orderbook_module(),
            user_resource: None,
            init_function: default_init_function(),
        }
    }
}

/// Order-book market selection.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Address that owns the market resource.
    #[serde(default = "default_address")]
    pub owner: String,
    #[serde(default = "default_token_type")]
    pub base_type: String,
    #[serde(default = "default_base_asset")]
    pub quote_type: String,
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

fn default_price_decimals() -> u32 {
    PRICE_TICK_DECIMALS
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            owner: default_address(),
            base_type: default_token_type(),
            quote_type: default_base_asset(),
            price_decimals: default_price_decimals(),
        }
    }
}

/// Fixed-point scales of the assets involved.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,
    #[serde(default = "default_token_decimals")]
    pub base_decimals: u32,
    #[serde(default = "default_share_price_decimals")]
    pub share_price_decimals: u32,
    /// Fractional digits shown when rendering amounts.
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
}

fn default_token_decimals() -> u32 {
    TOKEN_DECIMALS
}

fn default_share_price_decimals() -> u32 {
    SHARE_PRICE_DECIMALS
}

fn default_display_decimals() -> u32 {
    4
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            token_decimals: default_token_decimals(),
            base_decimals: default_token_decimals(),
            share_price_decimals: default_share_price_decimals(),
            display_decimals: default_display_decimals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_module_splits_coin_type() {
        let contracts = ContractsConfig::default();
        assert_eq!(
            contracts.token_module(),
            Some((DEFAULT_PROGRAM_ADDRESS, "mock_token"))
        );
    }

    #[test]
    fn user_resource_defaults_under_vault_module() {
        let contracts = ContractsConfig::default();
        assert!(contracts
            .user_resource_type()
            .ends_with("::hyperfill_vault::UserPosition"));
    }
}
