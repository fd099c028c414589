//! Wallet session state machine.
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                           Connecting --err--> Disconnected
//! Connected --disconnect | account removed--> Disconnected
//! Connected --connect(other)--> Connecting   (prior session torn down first)
//! ```
//!
//! [`WalletSessionManager`] is the only owner of the active session. Other
//! components read it through the accessors and never mutate it.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::id::Address;
use crate::domain::session::{AccountEvent, AccountInfo, SessionStatus, WalletSession};
use crate::error::{Result, SessionError};
use crate::infrastructure::config::network::NetworkConfig;
use crate::port::outbound::wallet::WalletProvider;

enum SessionState {
    Disconnected,
    Connecting {
        provider_id: String,
    },
    Connected {
        session: WalletSession,
        provider: Arc<dyn WalletProvider>,
    },
}

struct Inner {
    state: SessionState,
    /// Bumped by every connect and disconnect. A handshake whose epoch is
    /// stale when it completes has been superseded.
    epoch: u64,
}

/// Holds at most one connected wallet session.
pub struct WalletSessionManager {
    providers: Vec<Arc<dyn WalletProvider>>,
    default_wallet: Option<String>,
    network: NetworkConfig,
    inner: RwLock<Inner>,
}

/// Pick a wallet from those a provider enumerates.
///
/// Prefers the first name containing `preferred` (case-insensitive), then
/// the first enumerated wallet.
#[must_use]
pub fn select_wallet<'a>(wallets: &'a [String], preferred: Option<&str>) -> Option<&'a str> {
    if let Some(preferred) = preferred.map(str::to_lowercase) {
        if let Some(found) = wallets
            .iter()
            .find(|name| name.to_lowercase().contains(&preferred))
        {
            return Some(found);
        }
    }
    wallets.first().map(String::as_str)
}

impl WalletSessionManager {
    pub fn new(
        providers: Vec<Arc<dyn WalletProvider>>,
        default_wallet: Option<String>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            providers,
            default_wallet,
            network,
            inner: RwLock::new(Inner {
                state: SessionState::Disconnected,
                epoch: 0,
            }),
        }
    }

    /// Configured provider ids, in registration order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Look up a registered provider (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoCompatibleWallet`] for an unknown id.
    pub fn provider(&self, provider_id: &str) -> Result<Arc<dyn WalletProvider>> {
        self.providers
            .iter()
            .find(|p| p.id().eq_ignore_ascii_case(provider_id))
            .cloned()
            .ok_or_else(|| {
                SessionError::NoCompatibleWallet {
                    provider: provider_id.to_string(),
                }
                .into()
            })
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        match self.inner.read().state {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting { .. } => SessionStatus::Connecting,
            SessionState::Connected { .. } => SessionStatus::Connected,
        }
    }

    /// Address of the connected account, if any.
    pub fn active_account(&self) -> Option<Address> {
        match &self.inner.read().state {
            SessionState::Connected { session, .. } => Some(session.address.clone()),
            _ => None,
        }
    }

    /// The connected session, if any.
    pub fn active_session(&self) -> Option<WalletSession> {
        match &self.inner.read().state {
            SessionState::Connected { session, .. } => Some(session.clone()),
            _ => None,
        }
    }

    /// The connected session together with its provider.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] unless a session is connected.
    pub fn active_provider(&self) -> Result<(WalletSession, Arc<dyn WalletProvider>)> {
        match &self.inner.read().state {
            SessionState::Connected { session, provider } => {
                Ok((session.clone(), Arc::clone(provider)))
            }
            _ => Err(SessionError::NotConnected.into()),
        }
    }

    /// Whether the wallet reports the configured network.
    ///
    /// A wallet that reports no network is assumed to be on it. Returns
    /// `false` when nothing is connected.
    pub fn is_on_expected_network(&self) -> bool {
        match &self.inner.read().state {
            SessionState::Connected { session, .. } => {
                self.network.matches(session.network.as_deref())
            }
            _ => false,
        }
    }

    /// Name of the configured network.
    pub fn expected_network(&self) -> &str {
        &self.network.name
    }

    /// Connect a provider, tearing down any existing session first.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoCompatibleWallet`] if the provider is unknown or
    ///   enumerates no wallets
    /// - [`SessionError::ConnectFailed`] if the handshake fails
    /// - [`SessionError::Superseded`] if another connect or a disconnect
    ///   started while this handshake was in flight
    pub async fn connect(&self, provider_id: &str) -> Result<WalletSession> {
        let provider = self.provider(provider_id)?;
        let provider_id = provider.id().to_string();

        let (epoch, prior) = {
            let mut inner = self.inner.write();
            inner.epoch += 1;
            let prior = std::mem::replace(
                &mut inner.state,
                SessionState::Connecting {
                    provider_id: provider_id.clone(),
                },
            );
            (inner.epoch, prior)
        };

        if let SessionState::Connected { session, provider: old } = prior {
            info!(
                provider = %session.provider_id,
                address = %session.address,
                "Tearing down prior session"
            );
            if let Err(err) = old.disconnect().await {
                warn!(provider = %session.provider_id, error = %err, "Provider disconnect failed");
            }
        }

        match self.handshake(&provider).await {
            Ok((wallet_name, account)) => {
                let session = WalletSession::connected(&provider_id, &wallet_name, account);
                let superseded_by = {
                    let mut inner = self.inner.write();
                    if inner.epoch == epoch {
                        inner.state = SessionState::Connected {
                            session: session.clone(),
                            provider: Arc::clone(&provider),
                        };
                        None
                    } else {
                        Some(current_provider_id(&inner.state))
                    }
                };

                if let Some(current) = superseded_by {
                    warn!(provider = %provider_id, "Handshake superseded, dropping result");
                    // The newer connect owns the provider if it is the same one.
                    if current.as_deref() != Some(provider_id.as_str()) {
                        if let Err(err) = provider.disconnect().await {
                            debug!(provider = %provider_id, error = %err, "Disconnect after supersede failed");
                        }
                    }
                    return Err(SessionError::Superseded {
                        provider: provider_id,
                    }
                    .into());
                }

                info!(
                    provider = %session.provider_id,
                    wallet = %session.wallet_name,
                    address = %session.address,
                    network = session.network.as_deref().unwrap_or("unreported"),
                    "Wallet connected"
                );
                if !self.network.matches(session.network.as_deref()) {
                    warn!(
                        expected = %self.network.name,
                        reported = session.network.as_deref().unwrap_or_default(),
                        "Wallet is on a different network"
                    );
                }
                Ok(session)
            }
            Err(err) => {
                let mut inner = self.inner.write();
                if inner.epoch == epoch {
                    inner.state = SessionState::Disconnected;
                }
                drop(inner);
                warn!(provider = %provider_id, error = %err, "Wallet connect failed");
                Err(err)
            }
        }
    }

    async fn handshake(&self, provider: &Arc<dyn WalletProvider>) -> Result<(String, AccountInfo)> {
        let wallets = provider.available_wallets().await?;
        let wallet_name = select_wallet(&wallets, self.default_wallet.as_deref())
            .ok_or_else(|| SessionError::NoCompatibleWallet {
                provider: provider.id().to_string(),
            })?
            .to_string();
        debug!(provider = provider.id(), wallet = %wallet_name, "Wallet selected");
        let account = provider.connect(&wallet_name).await?;
        Ok((wallet_name, account))
    }

    /// Drop the active session. Provider-side teardown failures are logged.
    ///
    /// Also invalidates any handshake still in flight.
    pub async fn disconnect(&self) {
        let prior = {
            let mut inner = self.inner.write();
            inner.epoch += 1;
            std::mem::replace(&mut inner.state, SessionState::Disconnected)
        };
        if let SessionState::Connected { session, provider } = prior {
            if let Err(err) = provider.disconnect().await {
                warn!(provider = %session.provider_id, error = %err, "Provider disconnect failed");
            }
            info!(provider = %session.provider_id, address = %session.address, "Wallet disconnected");
        }
    }

    /// Adopt an account the provider already authorised, without prompting.
    ///
    /// Only acts when disconnected, and drops the account if a connect or
    /// disconnect landed while the lookup was in flight. Returns the active
    /// session either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unknown or the lookup fails.
    pub async fn restore(&self, provider_id: &str) -> Result<Option<WalletSession>> {
        let epoch = {
            let inner = self.inner.read();
            if !matches!(inner.state, SessionState::Disconnected) {
                drop(inner);
                return Ok(self.active_session());
            }
            inner.epoch
        };
        let provider = self.provider(provider_id)?;
        let Some(account) = provider.current_account().await? else {
            debug!(provider = provider.id(), "No authorised account to restore");
            return Ok(None);
        };

        let mut inner = self.inner.write();
        if inner.epoch != epoch {
            debug!(provider = provider.id(), "Restore superseded by a later connect or disconnect");
        } else if matches!(inner.state, SessionState::Disconnected) {
            let session = WalletSession::connected(provider.id(), provider.id(), account);
            info!(provider = provider.id(), address = %session.address, "Session restored");
            inner.state = SessionState::Connected {
                session: session.clone(),
                provider,
            };
            return Ok(Some(session));
        }
        match &inner.state {
            SessionState::Connected { session, .. } => Ok(Some(session.clone())),
            _ => Ok(None),
        }
    }

    /// Reconcile the session with a provider-pushed account change.
    ///
    /// Applying the same event twice leaves the same state. Events from a
    /// provider other than the connected one are ignored.
    pub fn apply_account_event(&self, event: &AccountEvent) -> SessionStatus {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        match (&mut inner.state, &event.account) {
            (SessionState::Connected { session, .. }, _)
                if !session.provider_id.eq_ignore_ascii_case(&event.provider_id) =>
            {
                debug!(
                    provider = %event.provider_id,
                    active = %session.provider_id,
                    "Ignoring account event from inactive provider"
                );
            }
            (SessionState::Connected { session, .. }, None) => {
                info!(provider = %session.provider_id, address = %session.address, "Account removed by provider");
                inner.epoch += 1;
                inner.state = SessionState::Disconnected;
            }
            (SessionState::Connected { session, .. }, Some(account)) => {
                if session.address != account.address {
                    info!(
                        provider = %session.provider_id,
                        from = %session.address,
                        to = %account.address,
                        "Account changed"
                    );
                }
                session.address = account.address.clone();
                if account.public_key.is_some() {
                    session.public_key = account.public_key.clone();
                }
                if account.network.is_some() {
                    session.network = account.network.clone();
                }
            }
            (SessionState::Disconnected, Some(account)) => {
                if let Ok(provider) = self.provider(&event.provider_id) {
                    let session =
                        WalletSession::connected(provider.id(), provider.id(), account.clone());
                    info!(provider = provider.id(), address = %session.address, "Session adopted from account event");
                    inner.state = SessionState::Connected { session, provider };
                }
            }
            (SessionState::Disconnected, None) | (SessionState::Connecting { .. }, _) => {}
        }
        drop(guard);
        self.status()
    }

    /// Apply account events from a channel until it closes.
    pub fn spawn_account_listener(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<AccountEvent>,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let status = manager.apply_account_event(&event);
                debug!(provider = %event.provider_id, %status, "Account event applied");
            }
        })
    }
}

fn current_provider_id(state: &SessionState) -> Option<String> {
    match state {
        SessionState::Disconnected => None,
        SessionState::Connecting { provider_id } => Some(provider_id.clone()),
        SessionState::Connected { session, .. } => Some(session.provider_id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::testkit::wallet::ScriptedWallet;

    fn manager(wallets: Vec<Arc<ScriptedWallet>>, default: Option<&str>) -> WalletSessionManager {
        WalletSessionManager::new(
            wallets
                .into_iter()
                .map(|w| w as Arc<dyn WalletProvider>)
                .collect(),
            default.map(str::to_string),
            NetworkConfig::default(),
        )
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn select_wallet_prefers_case_insensitive_substring() {
        let wallets = names(&["Martian", "Petra Wallet", "Pontem"]);
        assert_eq!(select_wallet(&wallets, Some("petra")), Some("Petra Wallet"));
        assert_eq!(select_wallet(&wallets, Some("nightly")), Some("Martian"));
        assert_eq!(select_wallet(&wallets, None), Some("Martian"));
        assert_eq!(select_wallet(&[], Some("petra")), None);
    }

    #[tokio::test]
    async fn connect_uses_preferred_wallet() {
        let adapter = Arc::new(ScriptedWallet::new("adapter").with_wallets(&["Martian", "Petra"]));
        let sessions = manager(vec![adapter.clone()], Some("PETRA"));

        let session = sessions.connect("adapter").await.unwrap();
        assert_eq!(session.wallet_name, "Petra");
        assert_eq!(adapter.connected_wallets(), vec!["Petra".to_string()]);
        assert_eq!(sessions.status(), SessionStatus::Connected);
        assert!(sessions.is_on_expected_network());
    }

    #[tokio::test]
    async fn empty_enumeration_is_no_compatible_wallet() {
        let adapter = Arc::new(ScriptedWallet::new("adapter").with_wallets(&[]));
        let sessions = manager(vec![adapter.clone()], None);

        let err = sessions.connect("adapter").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCompatibleWallet);
        assert_eq!(sessions.status(), SessionStatus::Disconnected);
        assert_eq!(adapter.connect_count(), 0);
    }

    #[tokio::test]
    async fn failed_handshake_returns_to_disconnected() {
        let adapter = Arc::new(ScriptedWallet::new("adapter").with_connect_error("user rejected"));
        let sessions = manager(vec![adapter], None);

        let err = sessions.connect("adapter").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::ConnectFailed { .. })));
        assert_eq!(sessions.status(), SessionStatus::Disconnected);
        assert!(sessions.active_session().is_none());
    }

    #[tokio::test]
    async fn connecting_second_provider_tears_down_first() {
        let a = Arc::new(ScriptedWallet::new("adapter"));
        let b = Arc::new(
            ScriptedWallet::new("martian").with_account(AccountInfo::new("0xb0b")),
        );
        let sessions = manager(vec![a.clone(), b.clone()], None);

        sessions.connect("adapter").await.unwrap();
        sessions.connect("martian").await.unwrap();

        let active = sessions.active_session().unwrap();
        assert_eq!(active.provider_id, "martian");
        assert_eq!(active.address.as_str(), "0xb0b");
        assert_eq!(a.disconnect_count(), 1);
        assert_eq!(b.disconnect_count(), 0);
    }

    #[tokio::test]
    async fn racing_connects_leave_only_the_latest() {
        let slow = Arc::new(
            ScriptedWallet::new("adapter").with_connect_delay(Duration::from_millis(50)),
        );
        let fast = Arc::new(ScriptedWallet::new("martian"));
        let sessions = Arc::new(manager(vec![slow.clone(), fast.clone()], None));

        let first = {
            let sessions = Arc::clone(&sessions);
            tokio::spawn(async move { sessions.connect("adapter").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        sessions.connect("martian").await.unwrap();

        let err = first.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::Superseded { .. })));
        assert_eq!(sessions.active_session().unwrap().provider_id, "martian");
        assert_eq!(slow.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let sessions = manager(vec![Arc::new(ScriptedWallet::new("adapter"))], None);
        let err = sessions.connect("ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCompatibleWallet);
    }

    #[tokio::test]
    async fn disconnect_clears_session() {
        let adapter = Arc::new(ScriptedWallet::new("adapter"));
        let sessions = manager(vec![adapter.clone()], None);
        sessions.connect("adapter").await.unwrap();

        sessions.disconnect().await;
        assert!(sessions.active_account().is_none());
        assert_eq!(adapter.disconnect_count(), 1);
        assert_eq!(
            sessions.active_provider().err().map(|e| e.kind()),
            Some(ErrorKind::SessionNotConnected)
        );
    }

    #[tokio::test]
    async fn account_events_are_idempotent() {
        let sessions = manager(vec![Arc::new(ScriptedWallet::new("adapter"))], None);
        sessions.connect("adapter").await.unwrap();

        let changed = AccountEvent::changed("adapter", AccountInfo::new("0xd00d"));
        assert_eq!(sessions.apply_account_event(&changed), SessionStatus::Connected);
        assert_eq!(sessions.apply_account_event(&changed), SessionStatus::Connected);
        assert_eq!(sessions.active_account().unwrap().as_str(), "0xd00d");

        let removed = AccountEvent::removed("adapter");
        assert_eq!(sessions.apply_account_event(&removed), SessionStatus::Disconnected);
        assert_eq!(sessions.apply_account_event(&removed), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn events_from_inactive_provider_are_ignored() {
        let sessions = manager(
            vec![
                Arc::new(ScriptedWallet::new("adapter")),
                Arc::new(ScriptedWallet::new("martian")),
            ],
            None,
        );
        sessions.connect("adapter").await.unwrap();

        sessions.apply_account_event(&AccountEvent::removed("martian"));
        assert_eq!(sessions.active_session().unwrap().provider_id, "adapter");
    }

    #[tokio::test]
    async fn account_event_while_disconnected_adopts_account() {
        let sessions = manager(vec![Arc::new(ScriptedWallet::new("martian"))], None);
        let status =
            sessions.apply_account_event(&AccountEvent::changed("martian", AccountInfo::new("0x5")));
        assert_eq!(status, SessionStatus::Connected);
        assert_eq!(sessions.active_account().unwrap().as_str(), "0x5");
    }

    #[tokio::test]
    async fn restore_adopts_authorised_account() {
        let martian = Arc::new(
            ScriptedWallet::new("martian").with_authorised(AccountInfo::new("0x77")),
        );
        let sessions = manager(vec![martian.clone()], None);

        let restored = sessions.restore("martian").await.unwrap().unwrap();
        assert_eq!(restored.address.as_str(), "0x77");
        assert_eq!(martian.connect_count(), 0);
    }

    #[tokio::test]
    async fn restore_without_authorised_account_stays_disconnected() {
        let sessions = manager(vec![Arc::new(ScriptedWallet::new("martian"))], None);
        assert!(sessions.restore("martian").await.unwrap().is_none());
        assert_eq!(sessions.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_during_restore_wins() {
        let martian = Arc::new(
            ScriptedWallet::new("martian")
                .with_authorised(AccountInfo::new("0x1"))
                .with_lookup_delay(Duration::from_millis(50)),
        );
        let sessions = Arc::new(manager(vec![martian], None));

        let pending = {
            let sessions = Arc::clone(&sessions);
            tokio::spawn(async move { sessions.restore("martian").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        sessions.disconnect().await;

        assert!(pending.await.unwrap().unwrap().is_none());
        assert_eq!(sessions.status(), SessionStatus::Disconnected);
        assert!(sessions.active_account().is_none());
    }

    #[tokio::test]
    async fn wrong_network_is_reported() {
        let wallet = Arc::new(ScriptedWallet::new("adapter").with_account(
            AccountInfo::new("0x1").with_network("mainnet"),
        ));
        let sessions = manager(vec![wallet], None);
        sessions.connect("adapter").await.unwrap();
        assert!(!sessions.is_on_expected_network());
    }

    #[tokio::test]
    async fn listener_applies_events_until_channel_closes() {
        let sessions = Arc::new(manager(vec![Arc::new(ScriptedWallet::new("adapter"))], None));
        sessions.connect("adapter").await.unwrap();

        let (tx, rx) = mpsc::channel(4);
        let handle = sessions.spawn_account_listener(rx);
        tx.send(AccountEvent::removed("adapter")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(sessions.status(), SessionStatus::Disconnected);
    }
}
