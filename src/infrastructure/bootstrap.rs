//! Composition root: builds adapters and services from [`Config`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::aptos::AptosGateway;
use crate::adapter::outbound::wallet::BridgeWallet;
use crate::application::orchestrator::Orchestrator;
use crate::application::program::Programs;
use crate::application::session::WalletSessionManager;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::LedgerGateway;
use crate::port::outbound::wallet::WalletProvider;

/// Fully wired runtime.
pub struct Runtime {
    pub orchestrator: Arc<Orchestrator>,
    /// Concrete bridges, kept for account watching.
    pub bridges: Vec<Arc<BridgeWallet>>,
}

/// Build the ledger gateway for the configured node.
///
/// # Errors
///
/// Returns an error if the node URL is invalid.
pub fn build_ledger(config: &Config) -> Result<Arc<AptosGateway>> {
    let gateway = AptosGateway::from_config(&config.network, &config.gateway)?;
    info!(network = %config.network.name, node = %config.network.node_url, "Ledger gateway ready");
    Ok(Arc::new(gateway))
}

/// Build one bridge provider per `[[wallet.providers]]` entry.
///
/// # Errors
///
/// Returns an error if a bridge URL is invalid.
pub fn build_bridges(config: &Config) -> Result<Vec<Arc<BridgeWallet>>> {
    config
        .wallet
        .providers
        .iter()
        .map(|provider| {
            let bridge = BridgeWallet::from_config(provider, &config.gateway)?;
            info!(provider = %provider.id, dialect = %provider.dialect, "Wallet provider registered");
            Ok(Arc::new(bridge))
        })
        .collect()
}

/// Wire the session manager and orchestrator over any port implementations.
pub fn build_orchestrator(
    config: &Config,
    ledger: Arc<dyn LedgerGateway>,
    providers: Vec<Arc<dyn WalletProvider>>,
) -> Orchestrator {
    let sessions = Arc::new(WalletSessionManager::new(
        providers,
        config.wallet.default_wallet.clone(),
        config.network.clone(),
    ));
    Orchestrator::new(sessions, ledger, Programs::from_config(config), config.assets)
}

/// Build the production runtime: Aptos gateway plus bridge providers.
///
/// # Errors
///
/// Returns an error if any adapter cannot be constructed.
pub fn build(config: &Config) -> Result<Runtime> {
    let ledger = build_ledger(config)?;
    let bridges = build_bridges(config)?;
    let providers = bridges
        .iter()
        .map(|bridge| Arc::clone(bridge) as Arc<dyn WalletProvider>)
        .collect();
    let orchestrator = Arc::new(build_orchestrator(config, ledger, providers));
    Ok(Runtime {
        orchestrator,
        bridges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::config::config;
    use crate::testkit::ledger::ScriptedLedger;
    use crate::testkit::wallet::ScriptedWallet;

    #[test]
    fn build_registers_every_configured_provider() {
        let runtime = build(&config()).unwrap();
        assert_eq!(runtime.bridges.len(), 2);
        assert_eq!(
            runtime.orchestrator.sessions().provider_ids(),
            vec!["adapter", "martian"]
        );
    }

    #[tokio::test]
    async fn orchestrator_uses_default_wallet_preference() {
        let mut config = config();
        config.wallet.default_wallet = Some("petra".into());
        let wallet = Arc::new(ScriptedWallet::new("adapter").with_wallets(&["Martian", "Petra"]));
        let orchestrator = build_orchestrator(
            &config,
            Arc::new(ScriptedLedger::new()),
            vec![wallet as Arc<dyn WalletProvider>],
        );

        let session = orchestrator.connect("adapter").await.unwrap();
        assert_eq!(session.wallet_name, "Petra");
    }
}
