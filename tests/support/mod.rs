//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use hyperfill::application::Orchestrator;
use hyperfill::infrastructure::bootstrap;
use hyperfill::port::WalletProvider;
use hyperfill::testkit::config::{config, ACCOUNT};
use hyperfill::testkit::ledger::ScriptedLedger;
use hyperfill::testkit::wallet::ScriptedWallet;
use serde_json::json;

/// One token at the default 8-decimal scale.
pub const ONE: u64 = 100_000_000;

/// Orchestrator wired the way the binary wires it, over scripted doubles.
pub struct Rig {
    pub orchestrator: Orchestrator,
    pub ledger: Arc<ScriptedLedger>,
    pub wallet: Arc<ScriptedWallet>,
}

impl Rig {
    pub fn new(ledger: ScriptedLedger, wallet: ScriptedWallet) -> Self {
        let ledger = Arc::new(ledger);
        let wallet = Arc::new(wallet);
        let orchestrator = bootstrap::build_orchestrator(
            &config(),
            ledger.clone(),
            vec![wallet.clone() as Arc<dyn WalletProvider>],
        );
        Self {
            orchestrator,
            ledger,
            wallet,
        }
    }

    /// Rig over [`open_vault`] with the default wallet, already connected.
    pub async fn connected() -> Self {
        let rig = Self::new(open_vault(), ScriptedWallet::new("adapter"));
        rig.orchestrator
            .connect("adapter")
            .await
            .expect("scripted connect");
        rig
    }
}

/// Unpaused vault, minimum deposit 1, balance 100, setup already satisfied.
pub fn open_vault() -> ScriptedLedger {
    let config = config();
    ScriptedLedger::new()
        .with_view("is_registered", vec![json!(true)])
        .with_view("is_paused", vec![json!(false)])
        .with_view("get_min_deposit", vec![json!(ONE.to_string())])
        .with_view("get_balance", vec![json!((100 * ONE).to_string())])
        .with_view("get_user_shares", vec![json!("0")])
        .with_resource(ACCOUNT, &config.contracts.user_resource_type(), json!({}))
}
