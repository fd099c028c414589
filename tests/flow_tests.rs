mod support;

use hyperfill::domain::{Restriction, Side};
use hyperfill::error::ErrorKind;
use hyperfill::testkit::wallet::ScriptedWallet;
use serde_json::json;
use support::{open_vault, Rig, ONE};

#[tokio::test]
async fn deposit_fifty_commits_and_echoes_amount() {
    let rig = Rig::connected().await;

    let result = rig.orchestrator.deposit("50").await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.transaction_hash.as_deref(), Some("0xabc"));
    assert_eq!(result.shares.as_deref(), Some("50"));
    assert_eq!(rig.ledger.waited().len(), 1);
    assert_eq!(
        rig.wallet.payloads()[0]["data"]["function"],
        "0xcafe::hyperfill_vault::deposit_liquidity"
    );
}

#[tokio::test]
async fn deposit_below_minimum_never_submits() {
    let rig = Rig::connected().await;

    let result = rig.orchestrator.deposit("0.5").await;

    assert!(!result.success);
    assert_eq!(result.error_kind(), Some(ErrorKind::BelowMinimum));
    assert_eq!(rig.wallet.submission_count(), 0);
}

#[tokio::test]
async fn deposit_equal_to_minimum_is_accepted() {
    let rig = Rig::connected().await;
    let result = rig.orchestrator.deposit("1").await;
    assert!(result.success, "{result:?}");
}

#[tokio::test]
async fn deposit_one_unit_below_minimum_is_rejected() {
    let rig = Rig::connected().await;
    let result = rig.orchestrator.deposit("0.99999999").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::BelowMinimum));
}

#[tokio::test]
async fn paused_vault_blocks_deposit_before_any_submission() {
    let rig = Rig::connected().await;
    rig.ledger.set_view("is_paused", vec![json!(true)]);

    let result = rig.orchestrator.deposit("50").await;

    assert_eq!(result.error_kind(), Some(ErrorKind::OperationPaused));
    assert_eq!(rig.wallet.submission_count(), 0);
}

#[tokio::test]
async fn deposit_above_balance_is_rejected() {
    let rig = Rig::connected().await;
    let result = rig.orchestrator.deposit("101").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::InsufficientBalance));
    assert_eq!(rig.wallet.submission_count(), 0);
}

#[tokio::test]
async fn empty_provider_response_is_malformed_and_not_retried() {
    let rig = Rig::new(
        open_vault(),
        ScriptedWallet::new("adapter").with_split_submission(),
    );
    rig.orchestrator.connect("adapter").await.unwrap();
    rig.wallet.respond_combined(json!({}));

    let result = rig.orchestrator.deposit("50").await;

    assert_eq!(result.error_kind(), Some(ErrorKind::MalformedResponse));
    assert_eq!(rig.wallet.split_count(), 0);
    assert!(rig.ledger.waited().is_empty());
}

#[tokio::test]
async fn rejected_combined_call_falls_back_to_split_path() {
    let rig = Rig::new(
        open_vault(),
        ScriptedWallet::new("adapter").with_split_submission(),
    );
    rig.orchestrator.connect("adapter").await.unwrap();
    rig.wallet.fail_combined("user rejected");

    let result = rig.orchestrator.deposit("50").await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.transaction_hash.as_deref(), Some("0xdef"));
    assert_eq!(rig.wallet.split_count(), 1);
}

#[tokio::test]
async fn ledger_rejection_after_submit_fails_the_flow() {
    let rig = Rig::connected().await;
    rig.ledger.reject_next_wait("Move abort: EINSUFFICIENT_LIQUIDITY");

    let result = rig.orchestrator.deposit("50").await;

    assert!(!result.success);
    assert_eq!(result.error_kind(), Some(ErrorKind::SubmissionFailed));
    assert!(result.transaction_hash.is_none());
}

#[tokio::test]
async fn flows_without_session_report_not_connected() {
    let rig = Rig::new(open_vault(), ScriptedWallet::new("adapter"));

    for result in [
        rig.orchestrator.deposit("50").await,
        rig.orchestrator.withdraw().await,
        rig.orchestrator.request_tokens(None).await,
    ] {
        assert_eq!(result.error_kind(), Some(ErrorKind::SessionNotConnected));
    }
    assert_eq!(rig.wallet.submission_count(), 0);
}

#[tokio::test]
async fn bid_encodes_side_flag_ticks_and_restriction() {
    let rig = Rig::connected().await;

    let result = rig
        .orchestrator
        .place_order(Side::Bid, "12.34", "7", Restriction::None)
        .await;

    assert!(result.success, "{result:?}");
    let payload = &rig.wallet.payloads()[0];
    assert_eq!(
        payload["data"]["function"],
        "0xcafe::orderbook::place_limit_order_entry"
    );
    assert_eq!(
        payload["data"]["functionArguments"],
        json!(["0xcafe", false, "1234", "7", "0"])
    );
}

#[tokio::test]
async fn order_with_zero_size_is_rejected_locally() {
    let rig = Rig::connected().await;
    let result = rig
        .orchestrator
        .place_order(Side::Ask, "12.34", "0.4", Restriction::PostOnly)
        .await;
    assert!(!result.success);
    assert_eq!(rig.wallet.submission_count(), 0);
}

#[tokio::test]
async fn faucet_mints_default_amount() {
    let rig = Rig::connected().await;

    let result = rig.orchestrator.request_tokens(None).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.minted.as_deref(), Some("1000"));
    assert_eq!(
        rig.wallet.payloads()[0]["data"]["functionArguments"],
        json!([(1_000 * ONE).to_string()])
    );
}

#[tokio::test]
async fn withdraw_reports_cached_shares() {
    let rig = Rig::connected().await;
    rig.ledger
        .set_view("get_user_shares", vec![json!((25 * ONE).to_string())]);
    rig.orchestrator.refresh_snapshot().await.unwrap();

    let result = rig.orchestrator.withdraw().await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.assets.as_deref(), Some("25"));
}

#[tokio::test]
async fn successful_flow_refreshes_the_snapshot() {
    let rig = Rig::connected().await;
    assert!(rig.orchestrator.snapshot().is_none());

    rig.orchestrator.deposit("50").await;

    assert!(rig.orchestrator.snapshot().is_some());
}

#[tokio::test]
async fn disconnect_clears_the_snapshot() {
    let rig = Rig::connected().await;
    rig.orchestrator.refresh_snapshot().await.unwrap();

    rig.orchestrator.disconnect().await;

    assert!(rig.orchestrator.snapshot().is_none());
}
