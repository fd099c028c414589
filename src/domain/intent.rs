//! Provider-agnostic descriptions of entry-point and view calls.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::Address;

/// Fully qualified Move function: `<address>::<module>::<function>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionId {
    address: Address,
    module: String,
    function: String,
}

impl FunctionId {
    /// Create a function identifier from its parts.
    pub fn new(address: impl Into<Address>, module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            module: module.into(),
            function: function.into(),
        }
    }

    /// Parse a `<address>::<module>::<function>` string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split("::");
        let (address, module, function) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || address.is_empty() || module.is_empty() || function.is_empty() {
            return None;
        }
        Some(Self::new(address, module, function))
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.function)
    }
}

/// A single entry-function argument.
///
/// Integers and addresses travel as strings; booleans stay booleans so the
/// ledger's JSON decoder accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntentArg {
    Text(String),
    Flag(bool),
}

impl IntentArg {
    /// JSON form sent to providers.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Flag(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for IntentArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for IntentArg {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for IntentArg {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&Address> for IntentArg {
    fn from(a: &Address) -> Self {
        Self::Text(a.to_string())
    }
}

impl From<u64> for IntentArg {
    fn from(v: u64) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<bool> for IntentArg {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Immutable description of an entry-point call.
///
/// Built once by the orchestrator and consumed by the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    function_id: FunctionId,
    type_arguments: Vec<String>,
    arguments: Vec<IntentArg>,
}

impl TransactionIntent {
    pub fn new(function_id: FunctionId, type_arguments: Vec<String>, arguments: Vec<IntentArg>) -> Self {
        Self {
            function_id,
            type_arguments,
            arguments,
        }
    }

    #[must_use]
    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[String] {
        &self.type_arguments
    }

    #[must_use]
    pub fn arguments(&self) -> &[IntentArg] {
        &self.arguments
    }
}

/// A read-only view call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewCall {
    #[serde(rename = "function")]
    function_id: String,
    type_arguments: Vec<String>,
    arguments: Vec<String>,
}

impl ViewCall {
    pub fn new(function_id: &FunctionId, type_arguments: Vec<String>, arguments: Vec<String>) -> Self {
        Self {
            function_id: function_id.to_string(),
            type_arguments,
            arguments,
        }
    }

    #[must_use]
    pub fn function_id(&self) -> &str {
        &self.function_id
    }

    #[must_use]
    pub fn type_arguments(&self) -> &[String] {
        &self.type_arguments
    }

    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn function_id_round_trips_through_display() {
        let id = FunctionId::new("0xABC", "hyperfill_vault", "deposit_liquidity");
        assert_eq!(id.to_string(), "0xabc::hyperfill_vault::deposit_liquidity");
        assert_eq!(FunctionId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn function_id_parse_rejects_wrong_arity() {
        assert!(FunctionId::parse("0x1::coin").is_none());
        assert!(FunctionId::parse("0x1::coin::transfer::extra").is_none());
        assert!(FunctionId::parse("::coin::transfer").is_none());
    }

    #[test]
    fn intent_args_serialize_untagged() {
        let args = vec![IntentArg::from("0x1"), IntentArg::from(true), IntentArg::from(7u64)];
        assert_eq!(serde_json::to_value(&args).unwrap(), json!(["0x1", true, "7"]));
    }

    #[test]
    fn view_call_serializes_with_ledger_field_names() {
        let call = ViewCall::new(
            &FunctionId::new("0x1", "m", "f"),
            vec![],
            vec!["0x2".into()],
        );
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"function": "0x1::m::f", "type_arguments": [], "arguments": ["0x2"]})
        );
    }
}
