//! Aptos REST API response types.
//!
//! Only the fields the gateway inspects are modelled; everything else in a
//! response is ignored.

use serde::Deserialize;

/// Error body returned with non-2xx responses.
///
/// ```json
/// {"message":"Resource not found","error_code":"resource_not_found","vm_error_code":null}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ApiError {
    /// Best-effort description of an error body.
    #[must_use]
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<Self>(body) {
            Ok(err) => match err.error_code {
                Some(code) => format!("{} ({code})", err.message),
                None => err.message,
            },
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().chars().take(200).collect(),
        }
    }
}

/// `GET /accounts/{address}/resource/{type}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: serde_json::Value,
}

/// `GET /transactions/by_hash/{hash}`.
///
/// Pending transactions carry `type = "pending_transaction"` and no
/// `success` field.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionView {
    #[serde(rename = "type")]
    pub kind: String,
    pub hash: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl TransactionView {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.kind == "pending_transaction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_prefers_message_and_code() {
        let body = r#"{"message":"Resource not found","error_code":"resource_not_found"}"#;
        assert_eq!(
            ApiError::describe(body),
            "Resource not found (resource_not_found)"
        );
    }

    #[test]
    fn describe_falls_back_to_raw_body() {
        assert_eq!(ApiError::describe("bad gateway"), "bad gateway");
        assert_eq!(ApiError::describe("  "), "empty response body");
    }

    #[test]
    fn pending_transaction_is_detected() {
        let tx: TransactionView = serde_json::from_str(
            r#"{"type":"pending_transaction","hash":"0xabc","sender":"0x1"}"#,
        )
        .unwrap();
        assert!(tx.is_pending());
        assert_eq!(tx.success, None);
    }

    #[test]
    fn committed_transaction_parses_status() {
        let tx: TransactionView = serde_json::from_str(
            r#"{"type":"user_transaction","hash":"0xabc","success":false,"vm_status":"Move abort","version":"42"}"#,
        )
        .unwrap();
        assert!(!tx.is_pending());
        assert_eq!(tx.success, Some(false));
        assert_eq!(tx.vm_status.as_deref(), Some("Move abort"));
    }

    #[test]
    fn coin_store_resource_parses() {
        let res: MoveResource = serde_json::from_str(
            r#"{"type":"0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>","data":{"coin":{"value":"1500"}}}"#,
        )
        .unwrap();
        assert_eq!(res.data["coin"]["value"], "1500");
    }
}
