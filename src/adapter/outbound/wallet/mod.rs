//! Wallet providers reached through a local signing bridge.

pub mod bridge;
pub mod dto;

pub use bridge::BridgeWallet;
