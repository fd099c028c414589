//! Rendering of flow results.

use serde_json::json;

use super::output;
use crate::application::orchestrator::FlowResult;
use crate::error::ErrorKind;
use crate::infrastructure::config::network::NetworkConfig;

/// Print a [`FlowResult`] and return whether it succeeded.
///
/// JSON mode emits the result object tagged with `command`.
pub fn flow(command: &str, result: &FlowResult, network: &NetworkConfig) -> bool {
    if output::is_json() {
        let mut value = serde_json::to_value(result).unwrap_or_else(|_| json!({}));
        if let Some(map) = value.as_object_mut() {
            map.insert("command".into(), json!(command));
            if let Some(hash) = &result.transaction_hash {
                map.insert("explorer_url".into(), json!(network.explorer_tx_url(hash)));
            }
        }
        output::json_output(value);
        return result.success;
    }

    output::section(command);
    if let Some(err) = &result.error {
        output::error(&err.message);
        output::field("Kind", err.kind);
        if let Some(hint) = hint_for(err.kind) {
            output::hint(hint);
        }
        return false;
    }

    output::success("Transaction committed");
    if let Some(hash) = &result.transaction_hash {
        output::field("Transaction", output::highlight(hash));
        output::field("Explorer", output::muted(network.explorer_tx_url(hash)));
    }
    if let Some(shares) = &result.shares {
        output::field("Deposited", shares);
    }
    if let Some(assets) = &result.assets {
        output::field("Shares held", assets);
    }
    if let Some(minted) = &result.minted {
        output::field("Minted", minted);
    }
    true
}

fn hint_for(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::NoCompatibleWallet => Some("check the provider id and that its bridge is running"),
        ErrorKind::SessionNotConnected => Some("approve the connection in your wallet and retry"),
        ErrorKind::InsufficientBalance => Some("mint test tokens with `hyperfill faucet`"),
        ErrorKind::MalformedResponse => {
            Some("the wallet may have broadcast the transaction; check the explorer before retrying")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_cover_actionable_kinds() {
        assert!(hint_for(ErrorKind::InsufficientBalance).is_some());
        assert!(hint_for(ErrorKind::MalformedResponse).is_some());
        assert!(hint_for(ErrorKind::OperationPaused).is_none());
    }
}
