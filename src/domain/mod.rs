//! Exchange-agnostic domain types: amounts, intents, orders, sessions.
//!
//! Nothing in this module performs I/O.

pub mod amount;
pub mod error;
pub mod id;
pub mod intent;
pub mod order;
pub mod session;
pub mod snapshot;

pub use amount::{from_on_chain, to_on_chain, OnChainAmount};
pub use error::DomainError;
pub use id::{Address, TxHash};
pub use intent::{FunctionId, IntentArg, TransactionIntent, ViewCall};
pub use order::{DepthLevel, OrderBookDepth, OrderIntent, Restriction, Side};
pub use session::{AccountEvent, AccountInfo, SessionStatus, WalletSession};
pub use snapshot::{Sourced, VaultSnapshot};
