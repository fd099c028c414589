//! Handlers for the `wallet` command group.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;

use super::command::{SessionArgs, WatchArgs};
use super::context::CommandContext;
use super::output;
use crate::domain::session::SessionStatus;
use crate::error::Result;
use crate::port::outbound::wallet::WalletProvider;

/// Execute `wallet status`.
pub async fn execute_status(args: &SessionArgs) -> Result<bool> {
    let ctx = CommandContext::load(args)?;
    let session = ctx.connect().await?;
    let sessions = ctx.orchestrator().sessions();
    let on_network = sessions.is_on_expected_network();

    if output::is_json() {
        output::json_output(json!({
            "command": "wallet.status",
            "session": session,
            "expected_network": sessions.expected_network(),
            "on_expected_network": on_network,
        }));
        return Ok(true);
    }

    output::section("Wallet Session");
    output::field("Provider", &session.provider_id);
    output::field("Wallet", &session.wallet_name);
    output::field("Address", output::highlight(&session.address));
    output::field("Public key", session.public_key.as_deref().unwrap_or("-"));
    output::field("Network", session.network.as_deref().unwrap_or("-"));
    output::field("Status", session.status);
    if on_network {
        output::success(&format!("On {}", sessions.expected_network()));
    }
    Ok(true)
}

/// Execute `wallet list`.
///
/// Unreachable bridges are reported per provider and do not fail the list.
pub async fn execute_list(args: &SessionArgs) -> Result<bool> {
    let ctx = CommandContext::load(args)?;
    let mut entries = Vec::new();
    for bridge in &ctx.runtime.bridges {
        let wallets = bridge.available_wallets().await;
        entries.push((bridge.id().to_string(), bridge.dialect(), bridge.capabilities(), wallets));
    }

    if output::is_json() {
        let providers: Vec<_> = entries
            .iter()
            .map(|(id, dialect, capabilities, wallets)| match wallets {
                Ok(wallets) => json!({
                    "id": id,
                    "dialect": dialect.to_string(),
                    "split_submission": capabilities.split_submission,
                    "wallets": wallets,
                }),
                Err(err) => json!({
                    "id": id,
                    "dialect": dialect.to_string(),
                    "split_submission": capabilities.split_submission,
                    "error": err.to_string(),
                }),
            })
            .collect();
        output::json_output(json!({
            "command": "wallet.list",
            "selected": ctx.provider_id(),
            "providers": providers,
        }));
        return Ok(true);
    }

    output::section("Wallet Providers");
    for (id, dialect, capabilities, wallets) in &entries {
        let marker = if id == ctx.provider_id() { " (selected)" } else { "" };
        output::field(&format!("{id}{marker}"), output::muted(dialect));
        if capabilities.split_submission {
            output::note("supports split submission");
        }
        match wallets {
            Ok(wallets) if wallets.is_empty() => output::warning("no wallets exposed"),
            Ok(wallets) => {
                for wallet in wallets {
                    output::note(&format!("- {wallet}"));
                }
            }
            Err(err) => output::warning(&format!("unreachable: {err}")),
        }
    }
    Ok(true)
}

/// Execute `wallet watch`: connect, then print account changes until
/// Ctrl-C or until the provider removes the account.
pub async fn execute_watch(args: &WatchArgs) -> Result<bool> {
    let ctx = CommandContext::load(&args.session)?;
    let session = ctx.connect().await?;
    let sessions = ctx.orchestrator().sessions();

    let Some(bridge) = ctx
        .runtime
        .bridges
        .iter()
        .find(|bridge| bridge.id().eq_ignore_ascii_case(&session.provider_id))
    else {
        output::warning("provider does not support account watching");
        return Ok(false);
    };

    let (tx, mut rx) = mpsc::channel(16);
    let poller = bridge.watch_accounts(Duration::from_millis(args.interval_ms), tx);

    output::section("Watching account");
    output::field("Address", output::highlight(&session.address));
    output::note("press Ctrl-C to stop");

    let removed = loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break false };
                let now = Utc::now().format("%H:%M:%S").to_string();
                match &event.account {
                    Some(account) => output::event(&now, "changed", &account.address.to_string()),
                    None => output::event(&now, "removed", &event.provider_id),
                }
                if sessions.apply_account_event(&event) == SessionStatus::Disconnected {
                    break true;
                }
            }
            _ = tokio::signal::ctrl_c() => break false,
        }
    };

    poller.abort();
    if removed {
        output::warning("account removed by the wallet; session closed");
    }
    Ok(true)
}
