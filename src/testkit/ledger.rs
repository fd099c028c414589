//! Scripted [`LedgerGateway`] for testing.
//!
//! View results are keyed by the bare function name (the last `::`
//! segment), so tests do not repeat program addresses. Anything not
//! scripted fails with `RemoteReadError`, which makes a forgotten fixture
//! visible as a defaulted snapshot field rather than a silent zero.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::{id::Address, id::TxHash, intent::ViewCall};
use crate::error::{LedgerError, Result, SubmissionError};
use crate::port::outbound::ledger::{LedgerGateway, TransactionReceipt};

#[derive(Debug, Clone)]
enum ViewReply {
    Values(Vec<Value>),
    Fail(String),
}

/// A ledger with canned view results, a resource table and call logs.
///
/// All setters take `&self` so a test can change ledger state while the
/// gateway is shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct ScriptedLedger {
    network: String,
    views: Mutex<HashMap<String, ViewReply>>,
    resources: Mutex<HashMap<(String, String), Value>>,
    rejections: Mutex<VecDeque<String>>,
    view_log: Mutex<Vec<ViewCall>>,
    wait_log: Mutex<Vec<TxHash>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            network: "testnet".into(),
            ..Self::default()
        }
    }

    /// Script a view to return the given values.
    pub fn with_view(self, function: &str, values: Vec<Value>) -> Self {
        self.set_view(function, values);
        self
    }

    /// Script a view to fail.
    pub fn with_failing_view(self, function: &str, reason: &str) -> Self {
        self.fail_view(function, reason);
        self
    }

    /// Add an account resource.
    pub fn with_resource(self, address: &str, resource_type: &str, data: Value) -> Self {
        self.set_resource(address, resource_type, data);
        self
    }

    pub fn set_view(&self, function: &str, values: Vec<Value>) {
        self.views
            .lock()
            .insert(function.to_string(), ViewReply::Values(values));
    }

    pub fn fail_view(&self, function: &str, reason: &str) {
        self.views
            .lock()
            .insert(function.to_string(), ViewReply::Fail(reason.to_string()));
    }

    pub fn set_resource(&self, address: &str, resource_type: &str, data: Value) {
        self.resources.lock().insert(
            (Address::from(address).to_string(), resource_type.to_string()),
            data,
        );
    }

    /// Queue a rejection for the next finality wait. Unqueued waits commit.
    pub fn reject_next_wait(&self, reason: &str) {
        self.rejections.lock().push_back(reason.to_string());
    }

    /// Every view call made, in order.
    pub fn view_calls(&self) -> Vec<ViewCall> {
        self.view_log.lock().clone()
    }

    /// Number of calls to the named view function.
    pub fn view_count(&self, function: &str) -> usize {
        self.view_log
            .lock()
            .iter()
            .filter(|call| bare_name(call.function_id()) == function)
            .count()
    }

    /// Hashes passed to `wait_for_transaction`, in order.
    pub fn waited(&self) -> Vec<TxHash> {
        self.wait_log.lock().clone()
    }
}

fn bare_name(function_id: &str) -> &str {
    function_id.rsplit("::").next().unwrap_or(function_id)
}

#[async_trait]
impl LedgerGateway for ScriptedLedger {
    async fn view(&self, call: &ViewCall) -> Result<Vec<Value>> {
        self.view_log.lock().push(call.clone());
        let reply = self.views.lock().get(bare_name(call.function_id())).cloned();
        match reply {
            Some(ViewReply::Values(values)) => Ok(values),
            Some(ViewReply::Fail(reason)) => {
                Err(LedgerError::remote(call.function_id(), reason).into())
            }
            None => Err(LedgerError::remote(call.function_id(), "unscripted view").into()),
        }
    }

    async fn get_resource(&self, address: &Address, resource_type: &str) -> Result<Value> {
        self.resources
            .lock()
            .get(&(address.to_string(), resource_type.to_string()))
            .cloned()
            .ok_or_else(|| {
                LedgerError::ResourceNotFound {
                    address: address.to_string(),
                    resource_type: resource_type.to_string(),
                }
                .into()
            })
    }

    async fn wait_for_transaction(&self, hash: &TxHash) -> Result<TransactionReceipt> {
        self.wait_log.lock().push(hash.clone());
        let rejection = self.rejections.lock().pop_front();
        match rejection {
            Some(reason) => Err(SubmissionError::NotCommitted {
                hash: hash.to_string(),
                reason,
            }
            .into()),
            None => Ok(TransactionReceipt {
                hash: hash.clone(),
                version: Some(1),
                vm_status: "Executed successfully".into(),
            }),
        }
    }

    fn network_name(&self) -> &str {
        &self.network
    }
}
