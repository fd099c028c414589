//! Handlers for the `order` command group.

use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{DepthArgs, OrderCancelArgs, OrderPlaceArgs};
use super::context::CommandContext;
use super::vault::with_spinner;
use super::{output, report};
use crate::domain::order::{DepthLevel, OrderBookDepth};
use crate::error::Result;

#[derive(Tabled)]
struct DepthRow {
    #[tabled(rename = "Bid size")]
    bid_size: String,
    #[tabled(rename = "Bid")]
    bid: String,
    #[tabled(rename = "Ask")]
    ask: String,
    #[tabled(rename = "Ask size")]
    ask_size: String,
}

/// Execute `order place`.
pub async fn execute_place(args: &OrderPlaceArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    ctx.connect().await?;
    let message = format!("Placing {} {} @ {}", args.side, args.size, args.price);
    let result = with_spinner(
        &message,
        ctx.orchestrator()
            .place_order(args.side, &args.price, &args.size, args.restriction),
    )
    .await;
    Ok(report::flow("order place", &result, &ctx.config.network))
}

/// Execute `order cancel`.
pub async fn execute_cancel(args: &OrderCancelArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    ctx.connect().await?;
    let result = with_spinner(
        &format!("Cancelling order {}", args.id),
        ctx.orchestrator().cancel_order(args.id, args.side, &args.price),
    )
    .await;
    Ok(report::flow("order cancel", &result, &ctx.config.network))
}

/// Execute `order depth`. Reads need no wallet session.
pub async fn execute_depth(args: &DepthArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    let pb = output::spinner("Reading order book");
    let depth = match ctx.orchestrator().fetch_depth(args.levels).await {
        Ok(depth) => {
            output::spinner_success(&pb, "Read order book");
            depth
        }
        Err(err) => {
            output::spinner_fail(&pb, "Reading order book");
            return Err(err);
        }
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "order.depth",
            "base": ctx.config.market.base_type,
            "quote": ctx.config.market.quote_type,
            "bids": depth.bids,
            "asks": depth.asks,
        }));
        return Ok(true);
    }

    output::section("Order book");
    output::field("Market", &ctx.config.market.base_type);
    output::field("Quote", &ctx.config.market.quote_type);
    if depth.bids.is_empty() && depth.asks.is_empty() {
        output::note("(empty book)");
        return Ok(true);
    }
    output::lines(&Table::new(depth_rows(&depth)).to_string());
    Ok(true)
}

fn depth_rows(depth: &OrderBookDepth) -> Vec<DepthRow> {
    let rows = depth.bids.len().max(depth.asks.len());
    (0..rows)
        .map(|i| {
            let (bid, bid_size) = level_cells(depth.bids.get(i));
            let (ask, ask_size) = level_cells(depth.asks.get(i));
            DepthRow {
                bid_size,
                bid,
                ask,
                ask_size,
            }
        })
        .collect()
}

fn level_cells(level: Option<&DepthLevel>) -> (String, String) {
    match level {
        Some(level) => (price_cell(level.price), level.size.to_string()),
        None => (String::new(), String::new()),
    }
}

fn price_cell(price: Decimal) -> String {
    price.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rows_pair_sides_and_pad_the_shorter_one() {
        let depth = OrderBookDepth {
            bids: vec![
                DepthLevel {
                    price: dec!(12.34),
                    size: 7,
                },
                DepthLevel {
                    price: dec!(12.00),
                    size: 3,
                },
            ],
            asks: vec![DepthLevel {
                price: dec!(12.50),
                size: 1,
            }],
        };
        let rows = depth_rows(&depth);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bid, "12.34");
        assert_eq!(rows[0].ask, "12.5");
        assert_eq!(rows[1].bid, "12");
        assert!(rows[1].ask.is_empty());
        assert!(rows[1].ask_size.is_empty());
    }
}
