//! Hyperfill - wallet-session and transaction orchestration for the
//! Hyperfill vault and order book on Aptos.
//!
//! The crate turns user intents ("deposit 50", "bid 7 at 12.34") into
//! entry-function calls, routes them through exactly one connected wallet,
//! waits for ledger finality and re-reads vault state afterwards.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Pure types: fixed-point amounts, intents, orders, sessions
//!   and snapshots. No I/O.
//! - [`port`] - The two outbound seams: [`port::LedgerGateway`] (node reads
//!   and finality) and [`port::WalletProvider`] (signing backends).
//! - [`application`] - Session management, submission with fallback,
//!   preflight checks, idempotent account setup, snapshot reads and the
//!   business flows in [`application::Orchestrator`].
//! - [`adapter`] - Aptos REST gateway, HTTP wallet bridges and the CLI.
//! - [`infrastructure`] - TOML configuration, logging and wiring.
//!
//! # Features
//!
//! - `testkit` - Scripted ledger and wallet doubles for integration tests.
//!
//! # Example
//!
//! ```no_run
//! use hyperfill::infrastructure::{bootstrap, config::settings::Config};
//!
//! # async fn run() -> hyperfill::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let runtime = bootstrap::build(&config)?;
//! runtime.orchestrator.connect("petra").await?;
//! let result = runtime.orchestrator.deposit("50").await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
