//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] - [`ScriptedLedger`](ledger::ScriptedLedger), a
//!   [`LedgerGateway`](crate::port::outbound::ledger::LedgerGateway) with
//!   canned view results, a resource table and call counters.
//! - [`wallet`] - [`ScriptedWallet`](wallet::ScriptedWallet), a
//!   [`WalletProvider`](crate::port::outbound::wallet::WalletProvider) with
//!   scripted handshakes and submission responses.
//! - [`config`] - Canonical test configuration.

pub mod config;
pub mod ledger;
pub mod wallet;
