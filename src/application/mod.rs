//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the business flows.

pub mod orchestrator;
pub mod preflight;
pub mod program;
pub mod session;
pub mod setup;
pub mod snapshot;
pub mod submit;

pub use orchestrator::{FlowError, FlowResult, Orchestrator};
pub use session::WalletSessionManager;
pub use submit::{SubmissionResult, TransactionSubmitter};
