//! Signing bridge wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::session::AccountInfo;

/// `GET /wallets`.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletsResponse {
    #[serde(default)]
    pub wallets: Vec<String>,
}

/// `POST /connect` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectRequest<'a> {
    pub wallet: &'a str,
}

/// Wallets report the network either as a bare name or as `{ "name": .. }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NetworkField {
    Name(String),
    Info { name: String },
}

/// Account as reported by `POST /connect` and `GET /account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDto {
    pub address: String,
    #[serde(default, alias = "publicKey")]
    pub public_key: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkField>,
}

impl From<AccountDto> for AccountInfo {
    fn from(dto: AccountDto) -> Self {
        let mut info = AccountInfo::new(dto.address);
        if let Some(key) = dto.public_key {
            info = info.with_public_key(key);
        }
        match dto.network {
            Some(NetworkField::Name(name) | NetworkField::Info { name }) => info.with_network(name),
            None => info,
        }
    }
}

/// `GET /account`: `{"account": null}` when nothing is authorised.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentAccountResponse {
    #[serde(default)]
    pub account: Option<AccountDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignAndSubmitRequest<'a> {
    pub payload: &'a Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub sender: &'a str,
    pub payload: &'a Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitGeneratedRequest<'a> {
    pub transaction: &'a Value,
}

/// Error body returned by the bridge with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeError {
    #[serde(alias = "message")]
    pub error: String,
}

impl BridgeError {
    #[must_use]
    pub fn describe(body: &str) -> String {
        serde_json::from_str::<Self>(body).map_or_else(
            |_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "empty response body".to_string()
                } else {
                    trimmed.chars().take(200).collect()
                }
            },
            |err| err.error,
        )
    }
}
