//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the two external collaborators of the core:
//! the ledger node and the wallet signing backends.

pub mod ledger;
pub mod wallet;
