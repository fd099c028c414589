//! Handlers for `snapshot`, `deposit`, `withdraw` and `faucet`.

use serde_json::json;

use super::command::{DepositArgs, FaucetArgs, SessionArgs};
use super::context::CommandContext;
use super::{output, report};
use crate::application::orchestrator::FlowResult;
use crate::domain::amount::format_display;
use crate::domain::snapshot::{Sourced, VaultSnapshot};
use crate::error::Result;
use crate::infrastructure::config::contracts::AssetsConfig;

/// Execute `snapshot`.
pub async fn execute_snapshot(args: &SessionArgs) -> Result<bool> {
    let ctx = CommandContext::load(args)?;
    let session = ctx.connect().await?;

    let pb = output::spinner("Reading vault state");
    let snapshot = match ctx.orchestrator().refresh_snapshot().await {
        Ok(snapshot) => {
            output::spinner_success(&pb, "Read vault state");
            snapshot
        }
        Err(err) => {
            output::spinner_fail(&pb, "Reading vault state");
            return Err(err);
        }
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "snapshot",
            "account": session.address,
            "snapshot": snapshot,
            "defaulted": snapshot.defaulted_fields(),
        }));
        return Ok(true);
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Account", output::highlight(&session.address));
    render_snapshot(&snapshot, &ctx.config.assets);
    Ok(true)
}

fn render_snapshot(snapshot: &VaultSnapshot, assets: &AssetsConfig) {
    let token = |value: &Sourced<u64>| amount(value, assets.token_decimals, assets.display_decimals);

    output::section("Position");
    output::field("Shares", token(&snapshot.user_shares));
    output::field("Profits", token(&snapshot.user_profits));
    output::field("Deposited", token(&snapshot.user_total_deposited));
    output::field("Token balance", token(&snapshot.token_balance));
    output::field(
        "Base balance",
        amount(&snapshot.base_asset_balance, assets.base_decimals, assets.display_decimals),
    );

    output::section("Vault");
    output::field("Total assets", token(&snapshot.total_assets));
    output::field("Total shares", token(&snapshot.total_supply));
    output::field("Available", token(&snapshot.available_assets));
    output::field(
        "Share price",
        amount(&snapshot.share_price, assets.share_price_decimals, assets.display_decimals),
    );
    output::field("Min deposit", token(&snapshot.min_deposit));
    output::field("Paused", flag(&snapshot.is_paused));

    let defaulted = snapshot.defaulted_fields();
    if !defaulted.is_empty() {
        output::warning(&format!(
            "{} field(s) could not be read and show defaults",
            defaulted.len()
        ));
        if output::verbosity() == 0 {
            output::hint("rerun with -v for the read errors");
        }
    }
}

fn amount(value: &Sourced<u64>, scale: u32, dp: u32) -> String {
    annotate(format_display(value.value(), scale, dp), value)
}

fn flag(value: &Sourced<bool>) -> String {
    let text = if value.value() { "yes" } else { "no" };
    annotate(text.to_string(), value)
}

fn annotate<T>(text: String, value: &Sourced<T>) -> String {
    match value {
        Sourced::Observed { .. } => text,
        Sourced::Defaulted { reason, .. } if output::verbosity() > 0 => {
            format!("{text} {}", output::muted(format!("(default: {reason})")))
        }
        Sourced::Defaulted { .. } => format!("{text} {}", output::muted("(default)")),
    }
}

/// Execute `deposit <amount>`.
pub async fn execute_deposit(args: &DepositArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    ctx.connect().await?;
    let result = with_spinner(
        &format!("Depositing {}", args.amount),
        ctx.orchestrator().deposit(&args.amount),
    )
    .await;
    Ok(report::flow("deposit", &result, &ctx.config.network))
}

/// Execute `withdraw`.
pub async fn execute_withdraw(args: &SessionArgs) -> Result<bool> {
    let ctx = CommandContext::load(args)?;
    ctx.connect().await?;
    // Primes the cache so the result can report the shares held.
    ctx.orchestrator().refresh_snapshot().await?;
    let result = with_spinner("Withdrawing", ctx.orchestrator().withdraw()).await;
    Ok(report::flow("withdraw", &result, &ctx.config.network))
}

/// Execute `faucet [amount]`.
pub async fn execute_faucet(args: &FaucetArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    ctx.connect().await?;
    let result = with_spinner(
        "Requesting test tokens",
        ctx.orchestrator().request_tokens(args.amount.as_deref()),
    )
    .await;
    Ok(report::flow("faucet", &result, &ctx.config.network))
}

/// Await a flow behind a spinner that lasts until finality.
pub(super) async fn with_spinner(
    message: &str,
    flow: impl std::future::Future<Output = FlowResult>,
) -> FlowResult {
    let pb = output::spinner(&format!("{message} (awaiting finality)"));
    let result = flow.await;
    if result.success {
        output::spinner_success(&pb, message);
    } else {
        output::spinner_fail(&pb, message);
    }
    result
}
