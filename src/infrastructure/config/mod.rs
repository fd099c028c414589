//! Infrastructure configuration modules.

pub mod contracts;
pub mod logging;
pub mod network;
pub mod settings;
pub mod wallet;
