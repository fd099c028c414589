//! Canonical test configuration.
//!
//! Single source of truth for the config used across tests, so contract
//! addresses and scales agree between the scripted ledger and the code
//! under test.

use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::wallet::ProviderConfig;
use crate::port::outbound::wallet::PayloadDialect;

/// Program address used by every test contract.
pub const PROGRAM: &str = "0xcafe";

/// Account the scripted wallet connects by default.
pub const ACCOUNT: &str = "0xa11ce";

/// Default config with contracts at [`PROGRAM`] and two providers.
pub fn config() -> Config {
    let mut config = Config::default();
    config.contracts.vault_address = PROGRAM.into();
    config.contracts.orderbook_address = PROGRAM.into();
    config.contracts.token_type = format!("{PROGRAM}::mock_token::MockToken");
    config.market.owner = PROGRAM.into();
    config.market.base_type = format!("{PROGRAM}::mock_token::MockToken");
    config.market.quote_type = "0x1::aptos_coin::AptosCoin".into();
    config.wallet.providers = vec![
        ProviderConfig {
            id: "adapter".into(),
            bridge_url: "http://127.0.0.1:8787".into(),
            dialect: PayloadDialect::WalletStandard,
            split_submission: false,
        },
        ProviderConfig {
            id: "martian".into(),
            bridge_url: "http://127.0.0.1:8788".into(),
            dialect: PayloadDialect::Minimal,
            split_submission: true,
        },
    ];
    config
}
