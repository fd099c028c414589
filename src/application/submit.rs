//! Transaction submission with payload normalization and a bounded fallback.
//!
//! Submission is an explicit strategy list evaluated in order:
//!
//! 1. [`SubmissionStrategy::Combined`]: one sign-and-submit call.
//! 2. [`SubmissionStrategy::Split`]: generate, then sign-and-submit the
//!    generated transaction. Only tried when the provider supports it and
//!    the combined call failed outright.
//!
//! Each strategy runs at most once. A response without a recognizable hash
//! is [`SubmissionError::MalformedResponse`] and ends the attempt, because
//! the transaction may already have been broadcast.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::session::WalletSessionManager;
use crate::domain::{id::Address, id::TxHash, intent::TransactionIntent};
use crate::error::{Error, Result, SubmissionError};
use crate::port::outbound::ledger::{LedgerGateway, TransactionReceipt};
use crate::port::outbound::wallet::{PayloadDialect, ProviderCapabilities, WalletProvider};

/// Field names a provider may put the transaction hash under.
const HASH_FIELDS: [&str; 2] = ["hash", "transactionHash"];

/// One way of handing a transaction to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    Combined,
    Split,
}

impl fmt::Display for SubmissionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined => f.write_str("combined"),
            Self::Split => f.write_str("split"),
        }
    }
}

/// Strategies to try, in order, for a provider.
#[must_use]
pub fn strategies(capabilities: ProviderCapabilities) -> Vec<SubmissionStrategy> {
    let mut list = vec![SubmissionStrategy::Combined];
    if capabilities.split_submission {
        list.push(SubmissionStrategy::Split);
    }
    list
}

/// Successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub transaction_hash: TxHash,
    /// Strategy that produced the hash.
    pub strategy: SubmissionStrategy,
}

/// Translate an intent into the payload shape a provider accepts.
///
/// Pure and deterministic in `(intent, dialect, sender)`.
#[must_use]
pub fn normalize(intent: &TransactionIntent, dialect: PayloadDialect, sender: &Address) -> Value {
    let function = intent.function_id().to_string();
    let arguments: Vec<Value> = intent.arguments().iter().map(|arg| arg.to_json()).collect();
    let type_arguments = intent.type_arguments();

    match dialect {
        PayloadDialect::WalletStandard => json!({
            "sender": sender.as_str(),
            "data": {
                "function": function,
                "typeArguments": type_arguments,
                "functionArguments": arguments,
            },
        }),
        PayloadDialect::EntryFunction => json!({
            "type": "entry_function_payload",
            "function": function,
            "type_arguments": type_arguments,
            "arguments": arguments,
        }),
        PayloadDialect::Minimal => json!({
            "function": function,
            "type_arguments": type_arguments,
            "arguments": arguments,
        }),
    }
}

/// Pull the transaction hash out of a provider response.
///
/// Accepts a bare non-empty string, or an object with a non-empty string
/// under `hash` or `transactionHash`.
///
/// # Errors
///
/// Returns [`SubmissionError::MalformedResponse`] for anything else.
pub fn extract_hash(response: &Value) -> Result<TxHash> {
    let hash = match response {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => HASH_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str)),
        _ => None,
    };
    match hash.map(str::trim) {
        Some(hash) if !hash.is_empty() => Ok(TxHash::from(hash)),
        _ => Err(SubmissionError::MalformedResponse(truncate(response)).into()),
    }
}

fn truncate(response: &Value) -> String {
    let text = response.to_string();
    if text.len() > 120 {
        format!("{}...", text.chars().take(120).collect::<String>())
    } else {
        text
    }
}

/// Submits intents through the active session and awaits finality.
pub struct TransactionSubmitter {
    sessions: Arc<WalletSessionManager>,
    ledger: Arc<dyn LedgerGateway>,
}

impl TransactionSubmitter {
    pub fn new(sessions: Arc<WalletSessionManager>, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self { sessions, ledger }
    }

    /// Hand the intent to the active provider and return its hash.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`](crate::error::SessionError) without a
    ///   session
    /// - [`SubmissionError::MalformedResponse`] if a response carries no hash
    /// - [`SubmissionError::Failed`] once every strategy has failed
    pub async fn submit(&self, intent: &TransactionIntent) -> Result<SubmissionResult> {
        let (session, provider) = self.sessions.active_provider()?;
        let payload = normalize(intent, provider.dialect(), &session.address);
        debug!(
            provider = %session.provider_id,
            dialect = %provider.dialect(),
            payload = %payload,
            "Normalized payload"
        );

        let mut failures = Vec::new();
        for strategy in strategies(provider.capabilities()) {
            let response = match strategy {
                SubmissionStrategy::Combined => provider.sign_and_submit(&payload).await,
                SubmissionStrategy::Split => {
                    submit_split(provider.as_ref(), &session.address, &payload).await
                }
            };

            match response {
                Ok(response) => {
                    let transaction_hash = extract_hash(&response)?;
                    info!(
                        function = %intent.function_id(),
                        provider = %session.provider_id,
                        %strategy,
                        hash = %transaction_hash,
                        "Transaction submitted"
                    );
                    return Ok(SubmissionResult {
                        transaction_hash,
                        strategy,
                    });
                }
                Err(Error::Submission(SubmissionError::Failed(reason))) => {
                    warn!(
                        function = %intent.function_id(),
                        provider = %session.provider_id,
                        %strategy,
                        reason = %reason,
                        "Submission attempt failed"
                    );
                    failures.push(format!("{strategy}: {reason}"));
                }
                Err(other) => return Err(other),
            }
        }

        Err(SubmissionError::Failed(failures.join("; ")).into())
    }

    /// Wait for the ledger to report the transaction committed.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NotCommitted`] on rejection or timeout.
    pub async fn confirm(&self, hash: &TxHash) -> Result<TransactionReceipt> {
        let receipt = self.ledger.wait_for_transaction(hash).await?;
        info!(hash = %receipt.hash, version = ?receipt.version, "Transaction confirmed");
        Ok(receipt)
    }

    /// [`submit`](Self::submit) followed by [`confirm`](Self::confirm).
    pub async fn submit_and_confirm(&self, intent: &TransactionIntent) -> Result<SubmissionResult> {
        let result = self.submit(intent).await?;
        self.confirm(&result.transaction_hash).await?;
        Ok(result)
    }
}

async fn submit_split(
    provider: &dyn WalletProvider,
    sender: &Address,
    payload: &Value,
) -> Result<Value> {
    let transaction = provider.generate_transaction(sender, payload).await?;
    provider.sign_and_submit_generated(&transaction).await
}
