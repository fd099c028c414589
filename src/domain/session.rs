//! Wallet session types.

use std::fmt;

use serde::Serialize;

use super::id::Address;

/// Lifecycle status of the wallet session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// Account reported by a provider handshake or account-change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: Address,
    pub public_key: Option<String>,
    /// Network name as reported by the wallet, if it reports one.
    pub network: Option<String>,
}

impl AccountInfo {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            public_key: None,
            network: None,
        }
    }

    #[must_use]
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }
}

/// Snapshot of the wallet session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub provider_id: String,
    /// Concrete wallet selected under the provider.
    pub wallet_name: String,
    pub address: Address,
    pub public_key: Option<String>,
    pub network: Option<String>,
    pub status: SessionStatus,
}

impl WalletSession {
    pub(crate) fn connected(provider_id: &str, wallet_name: &str, account: AccountInfo) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            wallet_name: wallet_name.to_string(),
            address: account.address,
            public_key: account.public_key,
            network: account.network,
            status: SessionStatus::Connected,
        }
    }
}

/// Asynchronous account change pushed by a provider.
///
/// `account: None` means the provider removed the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEvent {
    pub provider_id: String,
    pub account: Option<AccountInfo>,
}

impl AccountEvent {
    pub fn changed(provider_id: impl Into<String>, account: AccountInfo) -> Self {
        Self {
            provider_id: provider_id.into(),
            account: Some(account),
        }
    }

    pub fn removed(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            account: None,
        }
    }
}
