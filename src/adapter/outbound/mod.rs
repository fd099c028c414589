//! Outbound adapters (driven side).

pub mod aptos;
pub mod wallet;
