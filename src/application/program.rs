//! Function ids, view calls and entry intents for the on-chain programs.
//!
//! Every module address and function name the application uses is built
//! here from config, so the flows never spell out a function id.

use serde_json::Value;

use crate::domain::amount::OnChainAmount;
use crate::domain::id::Address;
use crate::domain::intent::{FunctionId, IntentArg, TransactionIntent, ViewCall};
use crate::domain::order::{OrderIntent, Side};
use crate::error::{LedgerError, Result};
use crate::infrastructure::config::contracts::{ContractsConfig, MarketConfig};
use crate::infrastructure::config::settings::Config;

/// Read-only vault functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultView {
    UserShares,
    TotalAssets,
    TotalShares,
    SharePrice,
    AvailableAssets,
    MinDeposit,
    IsPaused,
    UserProfits,
    UserTotalDeposited,
}

impl VaultView {
    #[must_use]
    pub const fn function_name(self) -> &'static str {
        match self {
            Self::UserShares => "get_user_shares",
            Self::TotalAssets => "get_total_assets",
            Self::TotalShares => "get_total_shares",
            Self::SharePrice => "get_share_price",
            Self::AvailableAssets => "get_available_assets",
            Self::MinDeposit => "get_min_deposit",
            Self::IsPaused => "is_paused",
            Self::UserProfits => "get_user_profits",
            Self::UserTotalDeposited => "get_user_total_deposited",
        }
    }

    /// Whether the view takes the account after the vault address.
    #[must_use]
    pub const fn is_per_account(self) -> bool {
        matches!(
            self,
            Self::UserShares | Self::UserProfits | Self::UserTotalDeposited
        )
    }
}

/// Builds calls against the vault, token and order-book programs.
#[derive(Debug, Clone)]
pub struct Programs {
    contracts: ContractsConfig,
    market: MarketConfig,
}

impl Programs {
    pub fn new(contracts: ContractsConfig, market: MarketConfig) -> Self {
        Self { contracts, market }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.contracts.clone(), config.market.clone())
    }

    pub fn contracts(&self) -> &ContractsConfig {
        &self.contracts
    }

    pub fn market(&self) -> &MarketConfig {
        &self.market
    }

    fn vault_fn(&self, name: &str) -> FunctionId {
        FunctionId::new(
            self.contracts.vault_address.as_str(),
            self.contracts.vault_module.as_str(),
            name,
        )
    }

    fn token_fn(&self, name: &str) -> FunctionId {
        // Validated at config load; the fallback only keeps this total.
        let (address, module) = self
            .contracts
            .token_module()
            .unwrap_or((self.contracts.vault_address.as_str(), "mock_token"));
        FunctionId::new(address, module, name)
    }

    fn orderbook_fn(&self, name: &str) -> FunctionId {
        FunctionId::new(
            self.contracts.orderbook_address.as_str(),
            self.contracts.orderbook_module.as_str(),
            name,
        )
    }

    fn market_types(&self) -> Vec<String> {
        vec![self.market.base_type.clone(), self.market.quote_type.clone()]
    }

    fn vault_address(&self) -> String {
        Address::from(self.contracts.vault_address.as_str()).to_string()
    }

    pub fn vault_view(&self, view: VaultView, account: &Address) -> ViewCall {
        let mut arguments = vec![self.vault_address()];
        if view.is_per_account() {
            arguments.push(account.to_string());
        }
        ViewCall::new(&self.vault_fn(view.function_name()), Vec::new(), arguments)
    }

    pub fn token_balance(&self, account: &Address) -> ViewCall {
        ViewCall::new(&self.token_fn("get_balance"), Vec::new(), vec![account.to_string()])
    }

    pub fn token_is_registered(&self, account: &Address) -> ViewCall {
        ViewCall::new(&self.token_fn("is_registered"), Vec::new(), vec![account.to_string()])
    }

    /// `0x1::coin::CoinStore<base>` resource type.
    pub fn base_coin_store(&self) -> String {
        format!("0x1::coin::CoinStore<{}>", self.contracts.base_asset)
    }

    pub fn user_resource_type(&self) -> String {
        self.contracts.user_resource_type()
    }

    pub fn order_book_depth(&self, levels: u32) -> ViewCall {
        ViewCall::new(
            &self.orderbook_fn("get_order_book_depth"),
            self.market_types(),
            vec![Address::from(self.market.owner.as_str()).to_string(), levels.to_string()],
        )
    }

    pub fn deposit(&self, units: u64) -> TransactionIntent {
        TransactionIntent::new(
            self.vault_fn("deposit_liquidity"),
            Vec::new(),
            vec![IntentArg::from(self.vault_address()), IntentArg::from(units)],
        )
    }

    pub fn withdraw(&self) -> TransactionIntent {
        TransactionIntent::new(
            self.vault_fn("withdraw_profits"),
            Vec::new(),
            vec![IntentArg::from(self.vault_address())],
        )
    }

    /// Entry function creating the account-scoped vault resource.
    pub fn init_user(&self) -> TransactionIntent {
        TransactionIntent::new(
            self.vault_fn(&self.contracts.init_function),
            Vec::new(),
            vec![IntentArg::from(self.vault_address())],
        )
    }

    pub fn register_token(&self) -> TransactionIntent {
        TransactionIntent::new(self.token_fn("register"), Vec::new(), Vec::new())
    }

    pub fn faucet(&self, units: u64) -> TransactionIntent {
        TransactionIntent::new(self.token_fn("faucet"), Vec::new(), vec![IntentArg::from(units)])
    }

    pub fn place_order(&self, order: &OrderIntent) -> TransactionIntent {
        TransactionIntent::new(
            self.orderbook_fn("place_limit_order_entry"),
            self.market_types(),
            vec![
                IntentArg::from(Address::from(self.market.owner.as_str()).to_string()),
                IntentArg::from(order.side().as_flag()),
                IntentArg::from(order.price_ticks()),
                IntentArg::from(order.size_units()),
                IntentArg::from(u64::from(order.restriction().code())),
            ],
        )
    }

    pub fn cancel_order(&self, order_id: u64, side: Side, price_ticks: u64) -> TransactionIntent {
        TransactionIntent::new(
            self.orderbook_fn("cancel_order_entry"),
            self.market_types(),
            vec![
                IntentArg::from(Address::from(self.market.owner.as_str()).to_string()),
                IntentArg::from(order_id),
                IntentArg::from(side.as_flag()),
                IntentArg::from(price_ticks),
            ],
        )
    }
}

/// First return value as on-chain integer units.
///
/// # Errors
///
/// Returns `RemoteReadError` if the value is missing or not an integer.
pub fn first_units(function: &str, values: &[Value]) -> Result<u64> {
    let value = values
        .first()
        .ok_or_else(|| LedgerError::remote(function, "view returned no values"))?;
    let amount = OnChainAmount::from_value(value)
        .map_err(|e| LedgerError::remote(function, e.to_string()))?;
    amount
        .units()
        .map_err(|e| LedgerError::remote(function, e.to_string()).into())
}

/// First return value as a boolean.
///
/// # Errors
///
/// Returns `RemoteReadError` if the value is missing or not a boolean.
pub fn first_flag(function: &str, values: &[Value]) -> Result<bool> {
    match values.first() {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(LedgerError::remote(function, format!("expected a boolean, got {other}")).into()),
        None => Err(LedgerError::remote(function, "view returned no values").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Restriction;
    use crate::error::ErrorKind;
    use crate::testkit::config::{config, PROGRAM};
    use serde_json::json;

    fn programs() -> Programs {
        Programs::from_config(&config())
    }

    #[test]
    fn per_account_views_append_account() {
        let account = Address::from("0xa");
        let shares = programs().vault_view(VaultView::UserShares, &account);
        assert_eq!(shares.function_id(), "0xcafe::hyperfill_vault::get_user_shares");
        assert_eq!(shares.arguments(), &[PROGRAM.to_string(), "0xa".to_string()]);

        let paused = programs().vault_view(VaultView::IsPaused, &account);
        assert_eq!(paused.arguments(), &[PROGRAM.to_string()]);
    }

    #[test]
    fn token_calls_use_token_module() {
        let call = programs().token_balance(&Address::from("0xa"));
        assert_eq!(call.function_id(), "0xcafe::mock_token::get_balance");
        let register = programs().register_token();
        assert_eq!(register.function_id().to_string(), "0xcafe::mock_token::register");
        assert!(register.arguments().is_empty());
    }

    #[test]
    fn deposit_intent_carries_vault_and_units() {
        let intent = programs().deposit(5_000_000_000);
        assert_eq!(
            intent.function_id().to_string(),
            "0xcafe::hyperfill_vault::deposit_liquidity"
        );
        assert_eq!(
            intent.arguments(),
            &[IntentArg::from("0xcafe"), IntentArg::from("5000000000")]
        );
    }

    #[test]
    fn order_intent_encodes_side_flag_and_restriction_code() {
        let order = OrderIntent::try_new(Side::Bid, "12.34", "7", Restriction::None, 2).unwrap();
        let intent = programs().place_order(&order);
        assert_eq!(intent.type_arguments().len(), 2);
        assert_eq!(
            intent.arguments(),
            &[
                IntentArg::from("0xcafe"),
                IntentArg::Flag(false),
                IntentArg::from("1234"),
                IntentArg::from("7"),
                IntentArg::from("0"),
            ]
        );
    }

    #[test]
    fn cancel_intent_orders_arguments() {
        let intent = programs().cancel_order(42, Side::Ask, 1234);
        assert_eq!(
            intent.arguments(),
            &[
                IntentArg::from("0xcafe"),
                IntentArg::from("42"),
                IntentArg::Flag(true),
                IntentArg::from("1234"),
            ]
        );
    }

    #[test]
    fn coin_store_type_wraps_base_asset() {
        assert_eq!(
            programs().base_coin_store(),
            "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>"
        );
    }

    #[test]
    fn decoders_accept_strings_and_numbers() {
        assert_eq!(first_units("f", &[json!("100")]).unwrap(), 100);
        assert_eq!(first_units("f", &[json!(100)]).unwrap(), 100);
        assert!(first_flag("f", &[json!(true)]).unwrap());
    }

    #[test]
    fn decoders_reject_unexpected_shapes() {
        assert_eq!(
            first_units("f", &[]).unwrap_err().kind(),
            ErrorKind::RemoteReadError
        );
        assert_eq!(
            first_units("f", &[json!("abc")]).unwrap_err().kind(),
            ErrorKind::RemoteReadError
        );
        assert_eq!(
            first_flag("f", &[json!("true")]).unwrap_err().kind(),
            ErrorKind::RemoteReadError
        );
    }
}
