//! Domain validation errors.
//!
//! Returned by the amount codec and by `try_new` constructors that validate
//! caller input before anything reaches the network.
//!
//! # Examples
//!
//! ```
//! use hyperfill::domain::amount::to_on_chain;
//! use hyperfill::domain::error::DomainError;
//!
//! let result = to_on_chain("-1", 8);
//! assert!(matches!(result, Err(DomainError::InvalidAmount { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The input does not encode a finite positive amount.
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount {
        /// The rejected input as given.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An order failed validation after scaling.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// Why it was rejected.
        reason: String,
    },

    /// An on-chain value could not be decoded.
    #[error("cannot decode on-chain value {value}")]
    Undecodable {
        /// The raw value.
        value: String,
    },
}

impl DomainError {
    pub(crate) fn invalid_amount(input: &str, reason: &'static str) -> Self {
        Self::InvalidAmount {
            input: input.to_string(),
            reason,
        }
    }
}
