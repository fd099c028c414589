//! Pre-submission invariant checks.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. vault paused
//! 2. amount below the minimum deposit
//! 3. amount above the account's token balance
//!
//! Each check does its own read. A failed read degrades to a permissive
//! value: not paused, a zero minimum, and no balance check at all.

use std::sync::Arc;

use tracing::{debug, warn};

use super::program::{first_flag, first_units, Programs, VaultView};
use crate::domain::amount::from_on_chain;
use crate::domain::id::Address;
use crate::domain::snapshot::Sourced;
use crate::error::{PreflightError, Result};
use crate::infrastructure::config::contracts::AssetsConfig;
use crate::port::outbound::ledger::LedgerGateway;

/// Values the checks were evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub paused: Sourced<bool>,
    pub min_deposit: Sourced<u64>,
    /// `None` when the balance read failed and the check was skipped.
    pub balance: Option<u64>,
}

/// Validates state-mutating operations before they reach a wallet.
pub struct PreflightValidator {
    ledger: Arc<dyn LedgerGateway>,
    programs: Programs,
    assets: AssetsConfig,
}

impl PreflightValidator {
    pub fn new(ledger: Arc<dyn LedgerGateway>, programs: Programs, assets: AssetsConfig) -> Self {
        Self {
            ledger,
            programs,
            assets,
        }
    }

    /// Run the deposit checks for `amount` on-chain units.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`PreflightError`].
    pub async fn check_deposit(&self, account: &Address, amount: u64) -> Result<PreflightReport> {
        let paused = self.read_paused(account).await;
        if paused.value() {
            return Err(PreflightError::OperationPaused.into());
        }

        let min_deposit = self.read_min_deposit(account).await;
        if amount < min_deposit.value() {
            return Err(PreflightError::BelowMinimum {
                minimum: self.human(min_deposit.value()),
                requested: amount,
            }
            .into());
        }

        let balance = self.read_balance(account).await;
        if let Some(available) = balance {
            if amount > available {
                return Err(PreflightError::InsufficientBalance {
                    requested: self.human(amount),
                    available: self.human(available),
                }
                .into());
            }
        }

        debug!(
            account = %account,
            amount,
            min_deposit = min_deposit.value(),
            balance = ?balance,
            "Preflight passed"
        );
        Ok(PreflightReport {
            paused,
            min_deposit,
            balance,
        })
    }

    async fn read_paused(&self, account: &Address) -> Sourced<bool> {
        let call = self.programs.vault_view(VaultView::IsPaused, account);
        let read = match self.ledger.view(&call).await {
            Ok(values) => first_flag(call.function_id(), &values),
            Err(err) => Err(err),
        };
        match read {
            Ok(paused) => Sourced::observed(paused),
            Err(err) => {
                warn!(error = %err, "Paused flag unreadable, assuming not paused");
                Sourced::defaulted(false, err.to_string())
            }
        }
    }

    async fn read_min_deposit(&self, account: &Address) -> Sourced<u64> {
        let call = self.programs.vault_view(VaultView::MinDeposit, account);
        let read = match self.ledger.view(&call).await {
            Ok(values) => first_units(call.function_id(), &values),
            Err(err) => Err(err),
        };
        match read {
            Ok(min) => Sourced::observed(min),
            Err(err) => {
                warn!(error = %err, "Minimum deposit unreadable, assuming zero");
                Sourced::defaulted(0, err.to_string())
            }
        }
    }

    async fn read_balance(&self, account: &Address) -> Option<u64> {
        let call = self.programs.token_balance(account);
        let read = match self.ledger.view(&call).await {
            Ok(values) => first_units(call.function_id(), &values),
            Err(err) => Err(err),
        };
        match read {
            Ok(balance) => Some(balance),
            Err(err) => {
                warn!(error = %err, "Token balance unreadable, skipping balance check");
                None
            }
        }
    }

    fn human(&self, units: u64) -> String {
        from_on_chain(units, self.assets.token_decimals).unwrap_or_else(|_| units.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testkit::config::config;
    use crate::testkit::ledger::ScriptedLedger;
    use serde_json::json;

    const ONE: u64 = 100_000_000;

    fn validator(ledger: ScriptedLedger) -> (PreflightValidator, Arc<ScriptedLedger>) {
        let ledger = Arc::new(ledger);
        let config = config();
        (
            PreflightValidator::new(ledger.clone(), Programs::from_config(&config), config.assets),
            ledger,
        )
    }

    fn open_vault() -> ScriptedLedger {
        ScriptedLedger::new()
            .with_view("is_paused", vec![json!(false)])
            .with_view("get_min_deposit", vec![json!(ONE.to_string())])
            .with_view("get_balance", vec![json!((100 * ONE).to_string())])
    }

    fn account() -> Address {
        Address::from("0xa11ce")
    }

    #[tokio::test]
    async fn paused_vault_short_circuits() {
        let (validator, ledger) = validator(open_vault().with_view("is_paused", vec![json!(true)]));

        let err = validator.check_deposit(&account(), 50 * ONE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationPaused);
        assert_eq!(ledger.view_count("get_min_deposit"), 0);
        assert_eq!(ledger.view_count("get_balance"), 0);
    }

    #[tokio::test]
    async fn amount_equal_to_minimum_passes() {
        let (validator, _) = validator(open_vault());
        let report = validator.check_deposit(&account(), ONE).await.unwrap();
        assert_eq!(report.min_deposit, Sourced::observed(ONE));
    }

    #[tokio::test]
    async fn one_unit_below_minimum_fails_with_human_minimum() {
        let (validator, ledger) = validator(open_vault());

        let err = validator.check_deposit(&account(), ONE - 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BelowMinimum);
        assert!(err.to_string().contains("minimum deposit of 1"));
        assert_eq!(ledger.view_count("get_balance"), 0);
    }

    #[tokio::test]
    async fn amount_above_balance_fails() {
        let (validator, _) = validator(open_vault());
        let err = validator.check_deposit(&account(), 101 * ONE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert!(err.to_string().contains("available 100"));
    }

    #[tokio::test]
    async fn unreadable_paused_flag_assumes_not_paused() {
        let (validator, _) =
            validator(open_vault().with_failing_view("is_paused", "node unavailable"));
        let report = validator.check_deposit(&account(), 50 * ONE).await.unwrap();
        assert!(report.paused.is_defaulted());
        assert!(!report.paused.value());
    }

    #[tokio::test]
    async fn unreadable_minimum_defaults_to_zero() {
        let (validator, _) =
            validator(open_vault().with_failing_view("get_min_deposit", "node unavailable"));
        let report = validator.check_deposit(&account(), 1).await.unwrap();
        assert_eq!(report.min_deposit.value(), 0);
        assert!(report.min_deposit.is_defaulted());
    }

    #[tokio::test]
    async fn unreadable_balance_skips_check() {
        let (validator, _) =
            validator(open_vault().with_failing_view("get_balance", "node unavailable"));
        let report = validator.check_deposit(&account(), 1_000 * ONE).await.unwrap();
        assert_eq!(report.balance, None);
    }
}
