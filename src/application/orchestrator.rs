//! Business flows: deposit, withdraw, faucet mint, order placement.
//!
//! Each flow runs its steps strictly in sequence:
//! encode → setup → preflight → submit → confirm → refresh.
//!
//! Flows never return `Err`. Every failure is folded into a [`FlowResult`]
//! with `success: false` and an [`ErrorKind`], so the caller always gets a
//! record it can render.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use super::preflight::PreflightValidator;
use super::program::Programs;
use super::session::WalletSessionManager;
use super::setup::AccountSetup;
use super::snapshot::SnapshotReader;
use super::submit::{SubmissionResult, TransactionSubmitter};
use crate::domain::amount::{from_on_chain, to_on_chain};
use crate::domain::id::Address;
use crate::domain::order::{OrderBookDepth, OrderIntent, Restriction, Side};
use crate::domain::session::WalletSession;
use crate::domain::snapshot::VaultSnapshot;
use crate::error::{Error, ErrorKind, Result, SessionError};
use crate::infrastructure::config::contracts::AssetsConfig;
use crate::port::outbound::ledger::LedgerGateway;

/// Faucet amount when none is given.
pub const DEFAULT_FAUCET_AMOUNT: &str = "1000";

/// Depth levels read when none is given.
pub const DEFAULT_DEPTH_LEVELS: u32 = 10;

/// Failure carried by a [`FlowResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowError {
    pub kind: ErrorKind,
    /// Short human-readable reason.
    pub message: String,
}

impl From<&Error> for FlowError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one business flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Deposited amount, echoed in token units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
    /// Shares held before a withdraw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
    /// Faucet amount minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FlowError>,
}

impl FlowResult {
    fn submitted(result: &SubmissionResult) -> Self {
        Self {
            success: true,
            transaction_hash: Some(result.transaction_hash.to_string()),
            ..Self::default()
        }
    }

    fn failed(err: &Error) -> Self {
        Self {
            success: false,
            error: Some(FlowError::from(err)),
            ..Self::default()
        }
    }

    /// Taxonomy kind of the failure, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

struct CachedSnapshot {
    account: Address,
    snapshot: VaultSnapshot,
}

/// Drives the business flows against the connected wallet.
pub struct Orchestrator {
    sessions: Arc<WalletSessionManager>,
    submitter: Arc<TransactionSubmitter>,
    preflight: PreflightValidator,
    setup: AccountSetup,
    reader: SnapshotReader,
    programs: Programs,
    assets: AssetsConfig,
    cache: RwLock<Option<CachedSnapshot>>,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<WalletSessionManager>,
        ledger: Arc<dyn LedgerGateway>,
        programs: Programs,
        assets: AssetsConfig,
    ) -> Self {
        let submitter = Arc::new(TransactionSubmitter::new(
            Arc::clone(&sessions),
            Arc::clone(&ledger),
        ));
        Self {
            preflight: PreflightValidator::new(Arc::clone(&ledger), programs.clone(), assets),
            setup: AccountSetup::new(Arc::clone(&ledger), Arc::clone(&submitter), programs.clone()),
            reader: SnapshotReader::new(ledger, programs.clone()),
            sessions,
            submitter,
            programs,
            assets,
            cache: RwLock::new(None),
        }
    }

    pub fn sessions(&self) -> &Arc<WalletSessionManager> {
        &self.sessions
    }

    /// Connect a provider. The cached snapshot belongs to the old session
    /// and is dropped.
    ///
    /// # Errors
    ///
    /// See [`WalletSessionManager::connect`].
    pub async fn connect(&self, provider_id: &str) -> Result<WalletSession> {
        self.clear_snapshot();
        self.sessions.connect(provider_id).await
    }

    /// Disconnect and drop the cached snapshot.
    pub async fn disconnect(&self) {
        self.sessions.disconnect().await;
        self.clear_snapshot();
    }

    /// Deposit `amount` vault tokens.
    pub async fn deposit(&self, amount: &str) -> FlowResult {
        match self.run_deposit(amount).await {
            Ok((result, shares)) => {
                info!(amount = %shares, hash = %result.transaction_hash, "Deposit complete");
                FlowResult {
                    shares: Some(shares),
                    ..FlowResult::submitted(&result)
                }
            }
            Err(err) => {
                warn!(amount, error = %err, kind = %err.kind(), "Deposit failed");
                FlowResult::failed(&err)
            }
        }
    }

    async fn run_deposit(&self, amount: &str) -> Result<(SubmissionResult, String)> {
        let units = to_on_chain(amount, self.assets.token_decimals)?;
        let account = self.require_account()?;

        self.setup.ensure_token_registration(&account).await;
        self.setup.ensure_user_resource(&account).await;
        self.preflight.check_deposit(&account, units).await?;

        let result = self
            .submitter
            .submit_and_confirm(&self.programs.deposit(units))
            .await?;
        self.refresh_after_submit().await;
        Ok((result, amount.to_string()))
    }

    /// Withdraw everything; the program decides the payout.
    ///
    /// `assets` reports the shares held per the last cached snapshot, or
    /// `"0"` when none was cached.
    pub async fn withdraw(&self) -> FlowResult {
        match self.run_withdraw().await {
            Ok((result, assets)) => {
                info!(assets = %assets, hash = %result.transaction_hash, "Withdraw complete");
                FlowResult {
                    assets: Some(assets),
                    ..FlowResult::submitted(&result)
                }
            }
            Err(err) => {
                warn!(error = %err, kind = %err.kind(), "Withdraw failed");
                FlowResult::failed(&err)
            }
        }
    }

    async fn run_withdraw(&self) -> Result<(SubmissionResult, String)> {
        let account = self.require_account()?;
        let assets = self
            .cached_for(&account)
            .map_or_else(|| "0".to_string(), |s| self.human(s.user_shares.value()));

        let result = self
            .submitter
            .submit_and_confirm(&self.programs.withdraw())
            .await?;
        self.refresh_after_submit().await;
        Ok((result, assets))
    }

    /// Mint test tokens from the faucet, registering the account first if
    /// needed.
    pub async fn request_tokens(&self, amount: Option<&str>) -> FlowResult {
        let amount = amount.unwrap_or(DEFAULT_FAUCET_AMOUNT);
        match self.run_request_tokens(amount).await {
            Ok((result, minted)) => {
                info!(minted = %minted, hash = %result.transaction_hash, "Faucet mint complete");
                FlowResult {
                    minted: Some(minted),
                    ..FlowResult::submitted(&result)
                }
            }
            Err(err) => {
                warn!(amount, error = %err, kind = %err.kind(), "Faucet mint failed");
                FlowResult::failed(&err)
            }
        }
    }

    async fn run_request_tokens(&self, amount: &str) -> Result<(SubmissionResult, String)> {
        let units = to_on_chain(amount, self.assets.token_decimals)?;
        let account = self.require_account()?;

        self.setup.ensure_token_registration(&account).await;
        let result = self
            .submitter
            .submit_and_confirm(&self.programs.faucet(units))
            .await?;
        self.refresh_after_submit().await;
        Ok((result, self.human(units)))
    }

    /// Place a limit order on the configured market.
    pub async fn place_order(
        &self,
        side: Side,
        price: &str,
        size: &str,
        restriction: Restriction,
    ) -> FlowResult {
        match self.run_place_order(side, price, size, restriction).await {
            Ok(result) => FlowResult::submitted(&result),
            Err(err) => {
                warn!(%side, price, size, error = %err, kind = %err.kind(), "Order placement failed");
                FlowResult::failed(&err)
            }
        }
    }

    async fn run_place_order(
        &self,
        side: Side,
        price: &str,
        size: &str,
        restriction: Restriction,
    ) -> Result<SubmissionResult> {
        let order = OrderIntent::try_new(
            side,
            price,
            size,
            restriction,
            self.programs.market().price_decimals,
        )?;
        self.require_account()?;
        info!(
            %side,
            price_ticks = order.price_ticks(),
            size_units = order.size_units(),
            %restriction,
            "Placing limit order"
        );
        self.submitter
            .submit_and_confirm(&self.programs.place_order(&order))
            .await
    }

    /// Cancel a resting order. Price is encoded the same way as placement.
    pub async fn cancel_order(&self, order_id: u64, side: Side, price: &str) -> FlowResult {
        match self.run_cancel_order(order_id, side, price).await {
            Ok(result) => FlowResult::submitted(&result),
            Err(err) => {
                warn!(order_id, error = %err, kind = %err.kind(), "Order cancellation failed");
                FlowResult::failed(&err)
            }
        }
    }

    async fn run_cancel_order(&self, order_id: u64, side: Side, price: &str) -> Result<SubmissionResult> {
        let price_ticks = to_on_chain(price, self.programs.market().price_decimals)?;
        self.require_account()?;
        info!(order_id, %side, price_ticks, "Cancelling order");
        self.submitter
            .submit_and_confirm(&self.programs.cancel_order(order_id, side, price_ticks))
            .await
    }

    /// Read order-book depth for the configured market.
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadError` if the view fails or is malformed.
    pub async fn fetch_depth(&self, levels: Option<u32>) -> Result<OrderBookDepth> {
        self.reader
            .read_depth(levels.unwrap_or(DEFAULT_DEPTH_LEVELS))
            .await
    }

    /// Rebuild the snapshot for the connected account and cache it.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotConnected` without a session. Individual read
    /// failures are defaulted inside the snapshot, not raised.
    pub async fn refresh_snapshot(&self) -> Result<VaultSnapshot> {
        let account = self.require_account()?;
        let snapshot = self.reader.read_vault(&account).await;
        *self.cache.write() = Some(CachedSnapshot {
            account,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Last snapshot, if it belongs to the connected account.
    pub fn snapshot(&self) -> Option<VaultSnapshot> {
        let account = self.sessions.active_account()?;
        self.cached_for(&account)
    }

    fn cached_for(&self, account: &Address) -> Option<VaultSnapshot> {
        self.cache
            .read()
            .as_ref()
            .filter(|cached| &cached.account == account)
            .map(|cached| cached.snapshot.clone())
    }

    fn clear_snapshot(&self) {
        *self.cache.write() = None;
    }

    async fn refresh_after_submit(&self) {
        if let Err(err) = self.refresh_snapshot().await {
            warn!(error = %err, "Post-submit refresh skipped");
        }
    }

    fn require_account(&self) -> Result<Address> {
        self.sessions
            .active_account()
            .ok_or_else(|| SessionError::NotConnected.into())
    }

    fn human(&self, units: u64) -> String {
        from_on_chain(units, self.assets.token_decimals).unwrap_or_else(|_| units.to_string())
    }
}
