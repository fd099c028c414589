//! Wallet provider port.
//!
//! Each signing backend is one implementation of [`WalletProvider`]. The
//! session manager and submitter are the only callers; nothing else talks to
//! a provider directly.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{id::Address, session::AccountInfo};
use crate::error::{Result, SubmissionError};

/// Payload shape a provider accepts for entry-function calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadDialect {
    /// `{ sender, data: { function, typeArguments, functionArguments } }`.
    #[default]
    WalletStandard,
    /// `{ type: "entry_function_payload", function, type_arguments, arguments }`.
    EntryFunction,
    /// `{ function, type_arguments, arguments }` with no discriminator.
    Minimal,
}

impl fmt::Display for PayloadDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WalletStandard => f.write_str("wallet_standard"),
            Self::EntryFunction => f.write_str("entry_function"),
            Self::Minimal => f.write_str("minimal"),
        }
    }
}

/// Optional entry points a provider exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Provider exposes generate-then-sign-and-submit as a second path.
    pub split_submission: bool,
}

/// A wallet signing backend.
///
/// Responses from the submission calls are returned raw; extracting the
/// transaction hash is the submitter's job.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Stable provider identifier used in config and session state.
    fn id(&self) -> &str;

    /// Payload shape this provider accepts.
    fn dialect(&self) -> PayloadDialect;

    /// Optional entry points.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Concrete wallets available under this provider, in enumeration order.
    async fn available_wallets(&self) -> Result<Vec<String>>;

    /// Perform the handshake with one concrete wallet.
    async fn connect(&self, wallet_name: &str) -> Result<AccountInfo>;

    /// Tear down the provider-side connection.
    async fn disconnect(&self) -> Result<()>;

    /// Account already authorised for this origin, without prompting.
    async fn current_account(&self) -> Result<Option<AccountInfo>>;

    /// Combined sign-and-submit call.
    async fn sign_and_submit(&self, payload: &Value) -> Result<Value>;

    /// First half of the split path: build an unsigned transaction.
    async fn generate_transaction(&self, _sender: &Address, _payload: &Value) -> Result<Value> {
        Err(SubmissionError::Failed(format!(
            "{} does not support split submission",
            self.id()
        ))
        .into())
    }

    /// Second half of the split path: sign and submit a generated transaction.
    async fn sign_and_submit_generated(&self, _transaction: &Value) -> Result<Value> {
        Err(SubmissionError::Failed(format!(
            "{} does not support split submission",
            self.id()
        ))
        .into())
    }
}
