//! Ledger port for view calls, resource reads and finality waits.
//!
//! Implementations perform no retries; retry policy belongs to callers.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;

use crate::domain::{id::Address, id::TxHash, intent::ViewCall};
use crate::error::Result;

/// Terminal state of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Hash of the committed transaction.
    pub hash: TxHash,
    /// Ledger version at which it was committed, if reported.
    pub version: Option<u64>,
    /// VM status string reported by the ledger.
    pub vm_status: String,
}

/// Read access to the ledger.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Invoke a view function and return its positional return values.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RemoteRead`](crate::error::LedgerError) when the
    /// call fails or the response is not a JSON array.
    async fn view(&self, call: &ViewCall) -> Result<Vec<Value>>;

    /// Invoke many view functions concurrently with settle-all semantics.
    ///
    /// The output has one entry per input call, in order. One call's failure
    /// never cancels the others.
    async fn batch_view(&self, calls: &[ViewCall]) -> Vec<Result<Vec<Value>>> {
        join_all(calls.iter().map(|call| self.view(call))).await
    }

    /// Read an account resource's `data` object.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ResourceNotFound`](crate::error::LedgerError)
    /// when the account has no such resource.
    async fn get_resource(&self, address: &Address, resource_type: &str) -> Result<Value>;

    /// Block until the transaction reaches a terminal committed state.
    ///
    /// The bound on this wait is owned by the implementation.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::NotCommitted`](crate::error::SubmissionError)
    /// if the transaction failed or the wait timed out.
    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<TransactionReceipt>;

    /// Name of the ledger network for logging.
    fn network_name(&self) -> &str;
}
