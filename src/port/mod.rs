//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  session · submit ·     │
//!                    │  preflight · orchestr.  │
//!                    └────────────┬────────────┘
//!                  ┌──────────────┴──────────────┐
//!                  ▼                             ▼
//!          ┌───────────────┐             ┌───────────────┐
//!          │ LedgerGateway │             │WalletProvider │
//!          │ (REST node)   │             │ (bridges)     │
//!          └───────────────┘             └───────────────┘
//! ```

pub mod outbound;

pub use outbound::ledger::{LedgerGateway, TransactionReceipt};
pub use outbound::wallet::{PayloadDialect, ProviderCapabilities, WalletProvider};
