//! Scripted [`WalletProvider`] for testing.
//!
//! Submission replies are queued per entry point and popped one per call.
//! When a queue is empty the combined call answers `{"hash": "0xabc"}` and
//! the split calls answer with a generated transaction and `{"hash": "0xdef"}`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::config::ACCOUNT;
use crate::domain::{id::Address, session::AccountInfo};
use crate::error::{Result, SessionError, SubmissionError};
use crate::port::outbound::wallet::{PayloadDialect, ProviderCapabilities, WalletProvider};

/// Hash returned by the combined call when nothing is queued.
pub const DEFAULT_HASH: &str = "0xabc";

/// Hash returned by the split path when nothing is queued.
pub const SPLIT_HASH: &str = "0xdef";

#[derive(Debug, Clone)]
enum Reply {
    Respond(Value),
    Fail(String),
}

impl Reply {
    fn into_result(self) -> Result<Value> {
        match self {
            Self::Respond(value) => Ok(value),
            Self::Fail(reason) => Err(SubmissionError::Failed(reason).into()),
        }
    }
}

/// A wallet provider with scripted handshakes and submission replies.
#[derive(Debug)]
pub struct ScriptedWallet {
    id: String,
    dialect: PayloadDialect,
    capabilities: ProviderCapabilities,
    wallets: Vec<String>,
    account: AccountInfo,
    connect_error: Option<String>,
    connect_delay: Option<Duration>,
    lookup_delay: Option<Duration>,
    authorised: Mutex<Option<AccountInfo>>,
    combined: Mutex<VecDeque<Reply>>,
    generate: Mutex<VecDeque<Reply>>,
    submit_generated: Mutex<VecDeque<Reply>>,
    payloads: Mutex<Vec<Value>>,
    connected_wallets: Mutex<Vec<String>>,
    connect_count: AtomicU32,
    disconnect_count: AtomicU32,
    combined_count: AtomicU32,
    split_count: AtomicU32,
}

impl ScriptedWallet {
    /// A provider exposing one wallet named after itself, connecting
    /// [`ACCOUNT`] on testnet.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            dialect: PayloadDialect::WalletStandard,
            capabilities: ProviderCapabilities::default(),
            wallets: vec![id.to_string()],
            account: AccountInfo::new(ACCOUNT)
                .with_public_key("0xpub")
                .with_network("testnet"),
            connect_error: None,
            connect_delay: None,
            lookup_delay: None,
            authorised: Mutex::new(None),
            combined: Mutex::new(VecDeque::new()),
            generate: Mutex::new(VecDeque::new()),
            submit_generated: Mutex::new(VecDeque::new()),
            payloads: Mutex::new(Vec::new()),
            connected_wallets: Mutex::new(Vec::new()),
            connect_count: AtomicU32::new(0),
            disconnect_count: AtomicU32::new(0),
            combined_count: AtomicU32::new(0),
            split_count: AtomicU32::new(0),
        }
    }

    pub fn with_dialect(mut self, dialect: PayloadDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable the generate-then-sign path.
    pub fn with_split_submission(mut self) -> Self {
        self.capabilities.split_submission = true;
        self
    }

    pub fn with_wallets(mut self, wallets: &[&str]) -> Self {
        self.wallets = wallets.iter().map(|w| (*w).to_string()).collect();
        self
    }

    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = account;
        self
    }

    /// Make every handshake fail with the given reason.
    pub fn with_connect_error(mut self, reason: &str) -> Self {
        self.connect_error = Some(reason.to_string());
        self
    }

    /// Delay each handshake, for racing connects.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Delay each `current_account` lookup, for racing restores.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Account returned by `current_account` without a handshake.
    pub fn with_authorised(self, account: AccountInfo) -> Self {
        *self.authorised.lock() = Some(account);
        self
    }

    /// Queue a raw response for the next combined call.
    pub fn respond_combined(&self, response: Value) {
        self.combined.lock().push_back(Reply::Respond(response));
    }

    /// Queue a failure for the next combined call.
    pub fn fail_combined(&self, reason: &str) {
        self.combined.lock().push_back(Reply::Fail(reason.to_string()));
    }

    /// Queue a failure for the next generate call.
    pub fn fail_generate(&self, reason: &str) {
        self.generate.lock().push_back(Reply::Fail(reason.to_string()));
    }

    /// Queue a raw response for the next split sign-and-submit call.
    pub fn respond_split(&self, response: Value) {
        self.submit_generated
            .lock()
            .push_back(Reply::Respond(response));
    }

    /// Payloads passed to either submission path, in order.
    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().clone()
    }

    /// Wallet names passed to `connect`, in order.
    pub fn connected_wallets(&self) -> Vec<String> {
        self.connected_wallets.lock().clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> u32 {
        self.disconnect_count.load(Ordering::SeqCst)
    }

    /// Number of combined sign-and-submit calls.
    pub fn combined_count(&self) -> u32 {
        self.combined_count.load(Ordering::SeqCst)
    }

    /// Number of split-path attempts (generate calls).
    pub fn split_count(&self) -> u32 {
        self.split_count.load(Ordering::SeqCst)
    }

    /// Total submission attempts across both paths.
    pub fn submission_count(&self) -> u32 {
        self.combined_count() + self.split_count()
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    fn id(&self) -> &str {
        &self.id
    }

    fn dialect(&self) -> PayloadDialect {
        self.dialect
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn available_wallets(&self) -> Result<Vec<String>> {
        Ok(self.wallets.clone())
    }

    async fn connect(&self, wallet_name: &str) -> Result<AccountInfo> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connected_wallets.lock().push(wallet_name.to_string());
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.connect_error {
            return Err(SessionError::ConnectFailed {
                provider: self.id.clone(),
                reason: reason.clone(),
            }
            .into());
        }
        *self.authorised.lock() = Some(self.account.clone());
        Ok(self.account.clone())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        *self.authorised.lock() = None;
        Ok(())
    }

    async fn current_account(&self) -> Result<Option<AccountInfo>> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.authorised.lock().clone())
    }

    async fn sign_and_submit(&self, payload: &Value) -> Result<Value> {
        self.combined_count.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(payload.clone());
        let reply = self.combined.lock().pop_front();
        reply
            .unwrap_or_else(|| Reply::Respond(json!({ "hash": DEFAULT_HASH })))
            .into_result()
    }

    async fn generate_transaction(&self, sender: &Address, payload: &Value) -> Result<Value> {
        if !self.capabilities.split_submission {
            return Err(SubmissionError::Failed(format!(
                "{} does not support split submission",
                self.id
            ))
            .into());
        }
        self.split_count.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(payload.clone());
        let reply = self.generate.lock().pop_front();
        reply
            .unwrap_or_else(|| {
                Reply::Respond(json!({ "sender": sender.as_str(), "payload": payload }))
            })
            .into_result()
    }

    async fn sign_and_submit_generated(&self, _transaction: &Value) -> Result<Value> {
        let reply = self.submit_generated.lock().pop_front();
        reply
            .unwrap_or_else(|| Reply::Respond(json!({ "hash": SPLIT_HASH })))
            .into_result()
    }
}
