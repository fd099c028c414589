//! Ledger network and node gateway configuration.

use serde::Deserialize;

/// Public Aptos testnet fullnode REST endpoint.
pub const TESTNET_NODE_URL: &str = "https://api.testnet.aptoslabs.com/v1";

/// Public Aptos mainnet fullnode REST endpoint.
pub const MAINNET_NODE_URL: &str = "https://fullnode.mainnet.aptoslabs.com/v1";

/// Target ledger network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Network name as wallets report it (e.g. "testnet").
    #[serde(default = "default_name")]
    pub name: String,
    /// Fullnode REST base URL.
    #[serde(default = "default_node_url")]
    pub node_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u8,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
}

fn default_name() -> String {
    "testnet".into()
}

fn default_node_url() -> String {
    TESTNET_NODE_URL.into()
}

fn default_chain_id() -> u8 {
    2
}

fn default_explorer_url() -> String {
    "https://explorer.aptoslabs.com".into()
}

impl NetworkConfig {
    /// Explorer link for a transaction on this network.
    #[must_use]
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!(
            "{}/txn/{}?network={}",
            self.explorer_url.trim_end_matches('/'),
            hash,
            self.name
        )
    }

    /// True when a wallet-reported network name refers to this network.
    ///
    /// Wallets that report no network are assumed to be on it.
    #[must_use]
    pub fn matches(&self, reported: Option<&str>) -> bool {
        match reported {
            None => true,
            Some(name) => name.eq_ignore_ascii_case(&self.name),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            node_url: default_node_url(),
            chain_id: default_chain_id(),
            explorer_url: default_explorer_url(),
        }
    }
}

/// HTTP and finality-wait bounds for the ledger gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Upper bound on a finality wait.
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
    /// Delay between finality polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_confirmation_timeout_ms() -> u64 {
    60_000
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive_and_accepts_unreported() {
        let network = NetworkConfig::default();
        assert!(network.matches(Some("Testnet")));
        assert!(network.matches(None));
        assert!(!network.matches(Some("mainnet")));
    }

    #[test]
    fn explorer_url_includes_network() {
        let network = NetworkConfig::default();
        assert_eq!(
            network.explorer_tx_url("0xabc"),
            "https://explorer.aptoslabs.com/txn/0xabc?network=testnet"
        );
    }
}
