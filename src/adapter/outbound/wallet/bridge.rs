//! HTTP signing bridge provider.
//!
//! A bridge is a small local service that fronts one wallet family (a browser
//! extension, a hardware signer, a keystore). Each configured provider points
//! at its own bridge, so the session manager treats them as independent
//! providers and enforces that only one is active.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::{
    AccountDto, BridgeError, ConnectRequest, CurrentAccountResponse, GenerateRequest,
    SignAndSubmitRequest, SubmitGeneratedRequest, WalletsResponse,
};
use crate::domain::{id::Address, session::AccountEvent, session::AccountInfo};
use crate::error::{ConfigError, Result, SessionError, SubmissionError};
use crate::infrastructure::config::network::GatewayConfig;
use crate::infrastructure::config::wallet::ProviderConfig;
use crate::port::outbound::wallet::{PayloadDialect, ProviderCapabilities, WalletProvider};

/// Wallet provider backed by a signing bridge.
#[derive(Clone)]
pub struct BridgeWallet {
    id: String,
    http: HttpClient,
    base_url: Url,
    dialect: PayloadDialect,
    capabilities: ProviderCapabilities,
}

impl BridgeWallet {
    /// Build a provider from its config entry.
    ///
    /// Signing may wait on a human approving a prompt, so only the connect
    /// timeout comes from the gateway section.
    ///
    /// # Errors
    ///
    /// Returns an error if `bridge_url` is not a valid URL.
    pub fn from_config(config: &ProviderConfig, gateway: &GatewayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_millis(gateway.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        // Url::join drops the last path segment without a trailing slash.
        let mut bridge_url = config.bridge_url.trim_end_matches('/').to_string();
        bridge_url.push('/');
        let base_url = Url::parse(&bridge_url).map_err(|e| ConfigError::InvalidValue {
            field: "wallet.providers.bridge_url",
            reason: format!("{}: {e}", config.id),
        })?;

        Ok(Self {
            id: config.id.clone(),
            http,
            base_url,
            dialect: config.dialect,
            capabilities: ProviderCapabilities {
                split_submission: config.split_submission,
            },
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, String> {
        self.base_url.join(path).map_err(|e| e.to_string())
    }

    /// Send a request and decode the JSON body. Errors are returned as text
    /// so each caller can wrap them in its own error variant.
    async fn call<B, T>(&self, method: reqwest::Method, path: &str, body: Option<&B>) -> std::result::Result<T, String>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("{status}: {}", BridgeError::describe(&text)));
        }
        if text.trim().is_empty() {
            return serde_json::from_value(Value::Null).map_err(|e| e.to_string());
        }
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON from bridge: {e}"))
    }

    /// Poll the bridge for account changes and forward them as events.
    ///
    /// Emits an event whenever the authorised account differs from the last
    /// one seen, including removal. The task ends when the receiver is
    /// dropped.
    pub fn watch_accounts(
        &self,
        interval: Duration,
        events: mpsc::Sender<AccountEvent>,
    ) -> JoinHandle<()> {
        let provider = self.clone();
        tokio::spawn(async move {
            let mut last: Option<AccountInfo> = provider.current_account().await.ok().flatten();
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current = match provider.current_account().await {
                    Ok(current) => current,
                    Err(err) => {
                        debug!(provider = %provider.id, error = %err, "Account poll failed");
                        continue;
                    }
                };
                if current == last {
                    continue;
                }
                let event = match &current {
                    Some(account) => AccountEvent::changed(&provider.id, account.clone()),
                    None => AccountEvent::removed(&provider.id),
                };
                last = current;
                if events.send(event).await.is_err() {
                    break;
                }
            }
        })
    }
}

#[async_trait]
impl WalletProvider for BridgeWallet {
    fn id(&self) -> &str {
        &self.id
    }

    fn dialect(&self) -> PayloadDialect {
        self.dialect
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn available_wallets(&self) -> Result<Vec<String>> {
        let response: WalletsResponse = self
            .call::<(), _>(reqwest::Method::GET, "wallets", None)
            .await
            .map_err(|reason| SessionError::ConnectFailed {
                provider: self.id.clone(),
                reason,
            })?;
        debug!(provider = %self.id, count = response.wallets.len(), "Wallets enumerated");
        Ok(response.wallets)
    }

    async fn connect(&self, wallet_name: &str) -> Result<AccountInfo> {
        let account: AccountDto = self
            .call(
                reqwest::Method::POST,
                "connect",
                Some(&ConnectRequest { wallet: wallet_name }),
            )
            .await
            .map_err(|reason| SessionError::ConnectFailed {
                provider: self.id.clone(),
                reason,
            })?;
        let account = AccountInfo::from(account);
        info!(provider = %self.id, wallet = wallet_name, address = %account.address, "Bridge connected");
        Ok(account)
    }

    async fn disconnect(&self) -> Result<()> {
        self.call::<(), Value>(reqwest::Method::POST, "disconnect", None)
            .await
            .map_err(|reason| SessionError::ConnectFailed {
                provider: self.id.clone(),
                reason,
            })?;
        Ok(())
    }

    async fn current_account(&self) -> Result<Option<AccountInfo>> {
        let response: CurrentAccountResponse = self
            .call::<(), _>(reqwest::Method::GET, "account", None)
            .await
            .map_err(|reason| SessionError::ConnectFailed {
                provider: self.id.clone(),
                reason,
            })?;
        Ok(response.account.map(AccountInfo::from))
    }

    async fn sign_and_submit(&self, payload: &Value) -> Result<Value> {
        self.call(
            reqwest::Method::POST,
            "sign_and_submit",
            Some(&SignAndSubmitRequest { payload }),
        )
        .await
        .map_err(|reason| SubmissionError::Failed(reason).into())
    }

    async fn generate_transaction(&self, sender: &Address, payload: &Value) -> Result<Value> {
        if !self.capabilities.split_submission {
            return Err(SubmissionError::Failed(format!(
                "{} does not support split submission",
                self.id
            ))
            .into());
        }
        self.call(
            reqwest::Method::POST,
            "generate_transaction",
            Some(&GenerateRequest {
                sender: sender.as_str(),
                payload,
            }),
        )
        .await
        .map_err(|reason| SubmissionError::Failed(reason).into())
    }

    async fn sign_and_submit_generated(&self, transaction: &Value) -> Result<Value> {
        if !self.capabilities.split_submission {
            return Err(SubmissionError::Failed(format!(
                "{} does not support split submission",
                self.id
            ))
            .into());
        }
        self.call(
            reqwest::Method::POST,
            "sign_and_submit_transaction",
            Some(&SubmitGeneratedRequest { transaction }),
        )
        .await
        .map_err(|reason| SubmissionError::Failed(reason).into())
    }
}
