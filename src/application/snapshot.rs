//! Aggregated ledger reads: the vault snapshot and order-book depth.
//!
//! The snapshot fans out every view and the coin-store read at once and
//! settles all of them. A failed read becomes a [`Sourced::Defaulted`]
//! field; it never fails the snapshot.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use super::program::{first_flag, first_units, Programs, VaultView};
use crate::domain::amount::{units_to_decimal, OnChainAmount};
use crate::domain::id::Address;
use crate::domain::order::{DepthLevel, OrderBookDepth};
use crate::domain::snapshot::{Sourced, VaultSnapshot};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::LedgerGateway;

/// Views in batch order. The token balance call is appended last.
const VAULT_VIEWS: [VaultView; 9] = [
    VaultView::UserShares,
    VaultView::TotalAssets,
    VaultView::TotalShares,
    VaultView::SharePrice,
    VaultView::AvailableAssets,
    VaultView::MinDeposit,
    VaultView::IsPaused,
    VaultView::UserProfits,
    VaultView::UserTotalDeposited,
];

/// Reads ledger state for one account.
pub struct SnapshotReader {
    ledger: Arc<dyn LedgerGateway>,
    programs: Programs,
}

impl SnapshotReader {
    pub fn new(ledger: Arc<dyn LedgerGateway>, programs: Programs) -> Self {
        Self { ledger, programs }
    }

    /// Read the whole vault snapshot for `account`.
    pub async fn read_vault(&self, account: &Address) -> VaultSnapshot {
        let mut calls: Vec<_> = VAULT_VIEWS
            .iter()
            .map(|view| self.programs.vault_view(*view, account))
            .collect();
        calls.push(self.programs.token_balance(account));

        let coin_store = self.programs.base_coin_store();
        let (results, coin) = tokio::join!(
            self.ledger.batch_view(&calls),
            self.ledger.get_resource(account, &coin_store),
        );

        let mut fields = calls
            .iter()
            .map(|call| call.function_id().to_string())
            .zip(results);

        let user_shares = next_units(&mut fields);
        let total_assets = next_units(&mut fields);
        let total_supply = next_units(&mut fields);
        let share_price = next_units(&mut fields);
        let available_assets = next_units(&mut fields);
        let min_deposit = next_units(&mut fields);
        let is_paused = next_flag(&mut fields);
        let user_profits = next_units(&mut fields);
        let user_total_deposited = next_units(&mut fields);
        let token_balance = next_units(&mut fields);
        let base_asset_balance = sourced(
            &coin_store,
            coin.and_then(|data| coin_value(&coin_store, &data)),
            0,
        );

        let snapshot = VaultSnapshot {
            user_shares,
            total_assets,
            total_supply,
            share_price,
            available_assets,
            min_deposit,
            is_paused,
            token_balance,
            base_asset_balance,
            user_profits,
            user_total_deposited,
            fetched_at: Utc::now(),
        };
        let defaulted = snapshot.defaulted_fields();
        if defaulted.is_empty() {
            debug!(account = %account, "Snapshot refreshed");
        } else {
            warn!(account = %account, defaulted = ?defaulted, "Snapshot refreshed with defaults");
        }
        snapshot
    }

    /// Read `levels` price levels per side of the configured market.
    ///
    /// # Errors
    ///
    /// Returns `RemoteReadError` if the view fails or its shape is wrong.
    pub async fn read_depth(&self, levels: u32) -> Result<OrderBookDepth> {
        let call = self.programs.order_book_depth(levels);
        let values = self.ledger.view(&call).await?;
        decode_depth(call.function_id(), &values, self.programs.market().price_decimals)
    }
}

type BatchItem = (String, Result<Vec<Value>>);

fn next_units(fields: &mut impl Iterator<Item = BatchItem>) -> Sourced<u64> {
    match fields.next() {
        Some((function, result)) => {
            let read = result.and_then(|values| first_units(&function, &values));
            sourced(&function, read, 0)
        }
        None => Sourced::defaulted(0, "missing batch result"),
    }
}

fn next_flag(fields: &mut impl Iterator<Item = BatchItem>) -> Sourced<bool> {
    match fields.next() {
        Some((function, result)) => {
            let read = result.and_then(|values| first_flag(&function, &values));
            sourced(&function, read, false)
        }
        None => Sourced::defaulted(false, "missing batch result"),
    }
}

fn sourced<T: Copy>(function: &str, read: Result<T>, default: T) -> Sourced<T> {
    match read {
        Ok(value) => Sourced::observed(value),
        Err(err) => {
            debug!(function, error = %err, "Read defaulted");
            Sourced::defaulted(default, err.to_string())
        }
    }
}

/// `data.coin.value` of a `CoinStore` resource.
fn coin_value(resource_type: &str, data: &Value) -> Result<u64> {
    let value = data
        .pointer("/coin/value")
        .ok_or_else(|| LedgerError::remote(resource_type, "resource has no coin.value"))?;
    OnChainAmount::from_value(value)
        .and_then(|amount| amount.units())
        .map_err(|e| LedgerError::remote(resource_type, e.to_string()).into())
}

/// Decode `[bid_prices, bid_sizes, ask_prices, ask_sizes]`.
///
/// Prices are ticks at `price_decimals`; a size missing for a price is zero.
///
/// # Errors
///
/// Returns `RemoteReadError` if the shape or any number is malformed.
pub fn decode_depth(function: &str, values: &[Value], price_decimals: u32) -> Result<OrderBookDepth> {
    if values.len() < 4 {
        return Err(LedgerError::remote(
            function,
            format!("expected 4 columns, got {}", values.len()),
        )
        .into());
    }
    let column = |index: usize| -> Result<Vec<u64>> {
        match &values[index] {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    OnChainAmount::from_value(item)
                        .and_then(|amount| amount.units())
                        .map_err(|e| LedgerError::remote(function, e.to_string()).into())
                })
                .collect(),
            other => Err(LedgerError::remote(function, format!("expected an array, got {other}")).into()),
        }
    };
    let side = |prices: Vec<u64>, sizes: Vec<u64>| -> Result<Vec<DepthLevel>> {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, ticks)| -> Result<DepthLevel> {
                let price = units_to_decimal(ticks, price_decimals)
                    .map_err(|e| LedgerError::remote(function, e.to_string()))?;
                Ok(DepthLevel {
                    price,
                    size: sizes.get(i).copied().unwrap_or(0),
                })
            })
            .collect()
    };

    Ok(OrderBookDepth {
        bids: side(column(0)?, column(1)?)?,
        asks: side(column(2)?, column(3)?)?,
    })
}
