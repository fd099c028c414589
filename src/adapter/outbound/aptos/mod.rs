//! Aptos fullnode REST integration.

pub mod dto;
pub mod gateway;

pub use gateway::AptosGateway;
