//! One-time account setup, modelled as idempotent preconditions.
//!
//! Each step checks first and only submits when the check says the setup
//! is missing. A failed step never aborts the caller: the setup may already
//! be satisfied by an earlier run, and the primary call will fail on its own
//! if it is not.

use std::sync::Arc;

use tracing::{info, warn};

use super::program::{first_flag, Programs};
use super::submit::TransactionSubmitter;
use crate::domain::id::{Address, TxHash};
use crate::domain::intent::TransactionIntent;
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::ledger::LedgerGateway;

/// Outcome of one setup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Setup transaction was submitted and confirmed.
    Performed {
        /// Hash of the setup transaction.
        tx_hash: TxHash,
    },

    /// Nothing to do.
    AlreadySatisfied,

    /// Check or setup transaction failed; logged and ignored.
    Failed {
        /// Human-readable error description.
        reason: String,
    },
}

impl SetupOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Runs setup steps for the connected account.
pub struct AccountSetup {
    ledger: Arc<dyn LedgerGateway>,
    submitter: Arc<TransactionSubmitter>,
    programs: Programs,
}

impl AccountSetup {
    pub const USER_RESOURCE: &'static str = "user_resource";
    pub const TOKEN_REGISTRATION: &'static str = "token_registration";

    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        submitter: Arc<TransactionSubmitter>,
        programs: Programs,
    ) -> Self {
        Self {
            ledger,
            submitter,
            programs,
        }
    }

    /// Create the account-scoped vault resource if it does not exist.
    pub async fn ensure_user_resource(&self, account: &Address) -> SetupOutcome {
        let resource_type = self.programs.user_resource_type();
        let needed = match self.ledger.get_resource(account, &resource_type).await {
            Ok(_) => Ok(false),
            Err(Error::Ledger(LedgerError::ResourceNotFound { .. })) => Ok(true),
            Err(err) => Err(err),
        };
        self.run(Self::USER_RESOURCE, account, needed, self.programs.init_user())
            .await
    }

    /// Register the account for the vault token if it is not registered.
    pub async fn ensure_token_registration(&self, account: &Address) -> SetupOutcome {
        let call = self.programs.token_is_registered(account);
        let needed = match self.ledger.view(&call).await {
            Ok(values) => first_flag(call.function_id(), &values).map(|registered| !registered),
            Err(err) => Err(err),
        };
        self.run(Self::TOKEN_REGISTRATION, account, needed, self.programs.register_token())
            .await
    }

    async fn run(
        &self,
        step: &'static str,
        account: &Address,
        needed: Result<bool>,
        intent: TransactionIntent,
    ) -> SetupOutcome {
        let outcome = match needed {
            Ok(false) => return SetupOutcome::AlreadySatisfied,
            Ok(true) => {
                info!(step, account = %account, "Setup required, submitting");
                self.submitter.submit_and_confirm(&intent).await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(result) => {
                info!(step, hash = %result.transaction_hash, "Setup complete");
                SetupOutcome::Performed {
                    tx_hash: result.transaction_hash,
                }
            }
            Err(err) => {
                let err = Error::SetupStepFailed {
                    step,
                    reason: err.to_string(),
                };
                warn!(error = %err, "Setup step failed, continuing");
                SetupOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::WalletSessionManager;
    use crate::port::outbound::wallet::WalletProvider;
    use crate::testkit::config::{config, ACCOUNT};
    use crate::testkit::ledger::ScriptedLedger;
    use crate::testkit::wallet::{ScriptedWallet, DEFAULT_HASH};
    use serde_json::json;

    async fn setup(ledger: ScriptedLedger) -> (AccountSetup, Arc<ScriptedWallet>) {
        let config = config();
        let wallet = Arc::new(ScriptedWallet::new("adapter"));
        let sessions = Arc::new(WalletSessionManager::new(
            vec![wallet.clone() as Arc<dyn WalletProvider>],
            None,
            config.network.clone(),
        ));
        sessions.connect("adapter").await.unwrap();
        let ledger: Arc<dyn LedgerGateway> = Arc::new(ledger);
        let submitter = Arc::new(TransactionSubmitter::new(sessions, ledger.clone()));
        (
            AccountSetup::new(ledger, submitter, Programs::from_config(&config)),
            wallet,
        )
    }

    fn account() -> Address {
        Address::from(ACCOUNT)
    }

    #[tokio::test]
    async fn existing_resource_is_already_satisfied() {
        let config = config();
        let ledger = ScriptedLedger::new().with_resource(
            ACCOUNT,
            &config.contracts.user_resource_type(),
            json!({"shares": "0"}),
        );
        let (setup, wallet) = setup(ledger).await;

        assert_eq!(
            setup.ensure_user_resource(&account()).await,
            SetupOutcome::AlreadySatisfied
        );
        assert_eq!(wallet.submission_count(), 0);
    }

    #[tokio::test]
    async fn missing_resource_submits_init() {
        let (setup, wallet) = setup(ScriptedLedger::new()).await;

        let outcome = setup.ensure_user_resource(&account()).await;
        assert_eq!(
            outcome,
            SetupOutcome::Performed {
                tx_hash: TxHash::from(DEFAULT_HASH)
            }
        );
        let payload = &wallet.payloads()[0];
        assert_eq!(payload["data"]["function"], "0xcafe::hyperfill_vault::init_user");
    }

    #[tokio::test]
    async fn registered_account_is_already_satisfied() {
        let ledger = ScriptedLedger::new().with_view("is_registered", vec![json!(true)]);
        let (setup, wallet) = setup(ledger).await;

        assert_eq!(
            setup.ensure_token_registration(&account()).await,
            SetupOutcome::AlreadySatisfied
        );
        assert_eq!(wallet.submission_count(), 0);
    }

    #[tokio::test]
    async fn unregistered_account_submits_register() {
        let ledger = ScriptedLedger::new().with_view("is_registered", vec![json!(false)]);
        let (setup, wallet) = setup(ledger).await;

        let outcome = setup.ensure_token_registration(&account()).await;
        assert!(matches!(outcome, SetupOutcome::Performed { .. }));
        assert_eq!(
            wallet.payloads()[0]["data"]["function"],
            "0xcafe::mock_token::register"
        );
    }

    #[tokio::test]
    async fn failed_setup_submission_is_reported_not_raised() {
        let ledger = ScriptedLedger::new().with_view("is_registered", vec![json!(false)]);
        let (setup, wallet) = setup(ledger).await;
        wallet.fail_combined("already registered");

        let outcome = setup.ensure_token_registration(&account()).await;
        match outcome {
            SetupOutcome::Failed { reason } => {
                assert!(reason.contains("token_registration"));
                assert!(reason.contains("already registered"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_check_fails_without_submitting() {
        let (setup, wallet) = setup(ScriptedLedger::new()).await;

        let outcome = setup.ensure_token_registration(&account()).await;
        assert!(outcome.is_failed());
        assert_eq!(wallet.submission_count(), 0);
    }
}
