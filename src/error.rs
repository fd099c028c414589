use std::fmt;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Wallet session errors.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("no compatible wallet found for provider '{provider}'")]
    NoCompatibleWallet { provider: String },

    #[error("wallet not connected")]
    NotConnected,

    #[error("failed to connect {provider}: {reason}")]
    ConnectFailed { provider: String, reason: String },

    #[error("connection to {provider} was superseded by a newer connect")]
    Superseded { provider: String },
}

/// Ledger read errors.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("view call {function} failed: {reason}")]
    RemoteRead { function: String, reason: String },

    #[error("resource {resource_type} not found at {address}")]
    ResourceNotFound {
        address: String,
        resource_type: String,
    },
}

impl LedgerError {
    /// Build a read error for a function or endpoint.
    pub fn remote(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteRead {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

/// Transaction submission and confirmation errors.
#[derive(Error, Debug, Clone)]
pub enum SubmissionError {
    #[error("transaction failed: {0}")]
    Failed(String),

    #[error("provider response carried no transaction hash: {0}")]
    MalformedResponse(String),

    #[error("transaction {hash} was not committed: {reason}")]
    NotCommitted { hash: String, reason: String },
}

/// Preflight invariant violations.
///
/// Raised before any submission call is made.
#[derive(Error, Debug, Clone)]
pub enum PreflightError {
    #[error("vault is paused")]
    OperationPaused,

    #[error("amount is below the minimum deposit of {minimum}")]
    BelowMinimum {
        /// Human-readable minimum.
        minimum: String,
        /// Requested amount in on-chain units.
        requested: u64,
    },

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Human-readable requested amount.
        requested: String,
        /// Human-readable available balance.
        available: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error("setup step {step} failed: {reason}")]
    SetupStepFailed { step: &'static str, reason: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy surfaced to callers of the business flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoCompatibleWallet,
    SessionNotConnected,
    InvalidAmount,
    RemoteReadError,
    ResourceNotFound,
    SubmissionFailed,
    MalformedResponse,
    OperationPaused,
    BelowMinimum,
    InsufficientBalance,
    SetupStepFailed,
    Config,
}

impl ErrorKind {
    /// Stable name used in results, logs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCompatibleWallet => "NoCompatibleWallet",
            Self::SessionNotConnected => "SessionNotConnected",
            Self::InvalidAmount => "InvalidAmount",
            Self::RemoteReadError => "RemoteReadError",
            Self::ResourceNotFound => "ResourceNotFound",
            Self::SubmissionFailed => "SubmissionFailed",
            Self::MalformedResponse => "MalformedResponse",
            Self::OperationPaused => "OperationPaused",
            Self::BelowMinimum => "BelowMinimum",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::SetupStepFailed => "SetupStepFailed",
            Self::Config => "Config",
        }
    }
}

impl serde::Serialize for ErrorKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error into the caller-facing taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Domain(_) => ErrorKind::InvalidAmount,
            Self::Session(SessionError::NoCompatibleWallet { .. }) => {
                ErrorKind::NoCompatibleWallet
            }
            Self::Session(_) => ErrorKind::SessionNotConnected,
            Self::Ledger(LedgerError::RemoteRead { .. }) => ErrorKind::RemoteReadError,
            Self::Ledger(LedgerError::ResourceNotFound { .. }) => ErrorKind::ResourceNotFound,
            Self::Submission(SubmissionError::MalformedResponse(_)) => {
                ErrorKind::MalformedResponse
            }
            Self::Submission(_) => ErrorKind::SubmissionFailed,
            Self::Preflight(PreflightError::OperationPaused) => ErrorKind::OperationPaused,
            Self::Preflight(PreflightError::BelowMinimum { .. }) => ErrorKind::BelowMinimum,
            Self::Preflight(PreflightError::InsufficientBalance { .. }) => {
                ErrorKind::InsufficientBalance
            }
            Self::SetupStepFailed { .. } => ErrorKind::SetupStepFailed,
            Self::Json(_) | Self::Http(_) | Self::Url(_) => ErrorKind::RemoteReadError,
            Self::Io(_) => ErrorKind::Config,
        }
    }
}
