//! Aptos fullnode REST client implementing [`LedgerGateway`].
//!
//! Endpoints used:
//! - `POST /view` for view functions
//! - `GET /accounts/{address}/resource/{type}` for account resources
//! - `GET /transactions/by_hash/{hash}` polled until the transaction commits
//!
//! Requests are not retried. The finality wait is the only loop and it is
//! bounded by `gateway.confirmation_timeout_ms`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use url::Url;

use super::dto::{ApiError, MoveResource, TransactionView};
use crate::domain::{id::Address, id::TxHash, intent::ViewCall};
use crate::error::{LedgerError, Result, SubmissionError};
use crate::infrastructure::config::network::{GatewayConfig, NetworkConfig};
use crate::port::outbound::ledger::{LedgerGateway, TransactionReceipt};

/// HTTP client for one Aptos fullnode.
pub struct AptosGateway {
    http: HttpClient,
    base_url: Url,
    network: String,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl AptosGateway {
    /// Build a gateway from the network and gateway config sections.
    ///
    /// # Errors
    ///
    /// Returns an error if `node_url` is not a valid URL.
    pub fn from_config(network: &NetworkConfig, gateway: &GatewayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(gateway.timeout_ms))
            .connect_timeout(Duration::from_millis(gateway.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        // Url::join drops the last path segment without a trailing slash.
        let mut node_url = network.node_url.trim_end_matches('/').to_string();
        node_url.push('/');

        Ok(Self {
            http,
            base_url: Url::parse(&node_url)?,
            network: network.name.clone(),
            confirmation_timeout: Duration::from_millis(gateway.confirmation_timeout_ms),
            poll_interval: Duration::from_millis(gateway.poll_interval_ms),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| LedgerError::remote("endpoint", "node url cannot be a base"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn fetch_transaction(&self, url: &Url) -> Result<Option<TransactionView>> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LedgerError::remote("transactions/by_hash", e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::remote("transactions/by_hash", e.to_string()))?;
        if !status.is_success() {
            return Err(LedgerError::remote("transactions/by_hash", ApiError::describe(&body)).into());
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn poll_until_committed(&self, hash: &TxHash) -> Result<TransactionReceipt> {
        let url = self.endpoint(&["transactions", "by_hash", hash.as_str()])?;
        loop {
            match self.fetch_transaction(&url).await {
                Ok(Some(tx)) => {
                    if let Some(receipt) = classify_transaction(hash, &tx)? {
                        return Ok(receipt);
                    }
                    debug!(hash = %hash, "Transaction pending");
                }
                Ok(None) => debug!(hash = %hash, "Transaction not yet indexed"),
                Err(err) => warn!(hash = %hash, error = %err, "Transaction lookup failed"),
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// Interpret a transaction lookup.
///
/// `Ok(None)` means the transaction is still pending.
fn classify_transaction(hash: &TxHash, tx: &TransactionView) -> Result<Option<TransactionReceipt>> {
    if tx.is_pending() {
        return Ok(None);
    }
    let vm_status = tx.vm_status.clone().unwrap_or_default();
    match tx.success {
        Some(true) => Ok(Some(TransactionReceipt {
            hash: hash.clone(),
            version: tx.version.as_deref().and_then(|v| v.parse().ok()),
            vm_status,
        })),
        Some(false) => Err(SubmissionError::NotCommitted {
            hash: hash.to_string(),
            reason: vm_status,
        }
        .into()),
        None => Ok(None),
    }
}

/// Require the view response to be a JSON array of return values.
fn view_values(function: &str, body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(values) => Ok(values),
        other => Err(LedgerError::remote(
            function,
            format!("expected an array of return values, got {other}"),
        )
        .into()),
    }
}

#[async_trait]
impl LedgerGateway for AptosGateway {
    async fn view(&self, call: &ViewCall) -> Result<Vec<Value>> {
        let function = call.function_id();
        let url = self.endpoint(&["view"])?;
        debug!(function, "View call");

        let response = self
            .http
            .post(url)
            .json(call)
            .send()
            .await
            .map_err(|e| LedgerError::remote(function, e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::remote(function, e.to_string()))?;
        if !status.is_success() {
            return Err(LedgerError::remote(function, ApiError::describe(&body)).into());
        }
        let parsed: Value = serde_json::from_str(&body)
            .map_err(|e| LedgerError::remote(function, format!("invalid JSON: {e}")))?;
        view_values(function, parsed)
    }

    async fn get_resource(&self, address: &Address, resource_type: &str) -> Result<Value> {
        let url = self.endpoint(&["accounts", address.as_str(), "resource", resource_type])?;
        debug!(address = %address, resource_type, "Resource read");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LedgerError::remote(resource_type, e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(LedgerError::ResourceNotFound {
                address: address.to_string(),
                resource_type: resource_type.to_string(),
            }
            .into());
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::remote(resource_type, e.to_string()))?;
        if !status.is_success() {
            return Err(LedgerError::remote(resource_type, ApiError::describe(&body)).into());
        }
        let resource: MoveResource = serde_json::from_str(&body)
            .map_err(|e| LedgerError::remote(resource_type, format!("invalid JSON: {e}")))?;
        Ok(resource.data)
    }

    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<TransactionReceipt> {
        match timeout(self.confirmation_timeout, self.poll_until_committed(hash)).await {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::NotCommitted {
                hash: hash.to_string(),
                reason: format!(
                    "timed out after {}ms waiting for confirmation",
                    self.confirmation_timeout.as_millis()
                ),
            }
            .into()),
        }
    }

    fn network_name(&self) -> &str {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use serde_json::json;

    fn gateway(node_url: &str) -> AptosGateway {
        let network = NetworkConfig {
            node_url: node_url.to_string(),
            ..NetworkConfig::default()
        };
        AptosGateway::from_config(&network, &GatewayConfig::default()).unwrap()
    }

    fn tx(body: Value) -> TransactionView {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let gw = gateway("https://api.testnet.aptoslabs.com/v1");
        let url = gw.endpoint(&["view"]).unwrap();
        assert_eq!(url.as_str(), "https://api.testnet.aptoslabs.com/v1/view");

        let gw = gateway("https://api.testnet.aptoslabs.com/v1/");
        let url = gw.endpoint(&["view"]).unwrap();
        assert_eq!(url.as_str(), "https://api.testnet.aptoslabs.com/v1/view");
    }

    #[test]
    fn resource_type_is_percent_encoded() {
        let gw = gateway("http://localhost:8080/v1");
        let url = gw
            .endpoint(&[
                "accounts",
                "0x1",
                "resource",
                "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
            ])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/accounts/0x1/resource/0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E"
        );
    }

    #[test]
    fn network_name_comes_from_config() {
        assert_eq!(gateway("http://localhost:8080/v1").network_name(), "testnet");
    }

    #[test]
    fn view_response_must_be_array() {
        let values = view_values("f", json!(["5", true])).unwrap();
        assert_eq!(values.len(), 2);

        let err = view_values("f", json!({"message": "nope"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteReadError);
    }

    #[test]
    fn pending_transaction_is_not_terminal() {
        let hash = TxHash::from("0xabc");
        let pending = tx(json!({"type": "pending_transaction", "hash": "0xabc"}));
        assert!(classify_transaction(&hash, &pending).unwrap().is_none());
    }

    #[test]
    fn successful_transaction_yields_receipt() {
        let hash = TxHash::from("0xabc");
        let done = tx(json!({
            "type": "user_transaction",
            "hash": "0xabc",
            "success": true,
            "vm_status": "Executed successfully",
            "version": "1234"
        }));
        let receipt = classify_transaction(&hash, &done).unwrap().unwrap();
        assert_eq!(receipt.version, Some(1234));
        assert_eq!(receipt.vm_status, "Executed successfully");
    }

    #[test]
    fn aborted_transaction_is_not_committed() {
        let hash = TxHash::from("0xabc");
        let aborted = tx(json!({
            "type": "user_transaction",
            "hash": "0xabc",
            "success": false,
            "vm_status": "Move abort in 0x1::coin: EINSUFFICIENT_BALANCE"
        }));
        let err = classify_transaction(&hash, &aborted).unwrap_err();
        match err {
            Error::Submission(SubmissionError::NotCommitted { reason, .. }) => {
                assert!(reason.contains("EINSUFFICIENT_BALANCE"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
