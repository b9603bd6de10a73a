//! # Batch Scheduler
//!
//! Waits for the configured start time, then runs one trade task per
//! account concurrently and collects the outcomes in configuration order.
//!
//! Accounts never wait on each other. Under the strict policy a failed
//! account only changes the batch verdict; trades already in flight
//! still run to completion and are reported.

use crate::application::error::TradeError;
use crate::application::outcome::{AccountReport, BatchReport, TradeOutcome};
use crate::application::services::trade_executor::TradeExecutor;
use crate::domain::entities::account::Account;
use crate::domain::entities::trade::TradeStage;
use crate::domain::value_objects::enums::BatchPolicy;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors that end a batch as a whole.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Strict policy and at least one account did not confirm.
    #[error("{failed} of {total} accounts failed")]
    AccountsFailed {
        /// Failed accounts.
        failed: usize,
        /// Accounts in the batch.
        total: usize,
        /// Full ledger, including the successes.
        report: BatchReport,
    },
}

impl SchedulerError {
    /// Returns the batch ledger carried by the error.
    #[must_use]
    pub fn report(&self) -> &BatchReport {
        match self {
            Self::AccountsFailed { report, .. } => report,
        }
    }
}

/// Runs a batch of trades.
#[derive(Debug, Clone)]
pub struct Scheduler {
    executor: Arc<TradeExecutor>,
    policy: BatchPolicy,
    start_time: Option<DateTime<Utc>>,
}

impl Scheduler {
    /// Creates a scheduler that starts immediately.
    #[must_use]
    pub fn new(executor: Arc<TradeExecutor>, policy: BatchPolicy) -> Self {
        Self {
            executor,
            policy,
            start_time: None,
        }
    }

    /// Delays the batch until `start_time`.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Returns the failure policy.
    #[must_use]
    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Sleeps until the start time. Returns immediately if it has passed.
    pub async fn wait_for_start(&self) {
        let Some(start) = self.start_time else {
            return;
        };
        let Ok(delay) = (start - Utc::now()).to_std() else {
            info!(start = %start, "start time already passed");
            return;
        };

        info!(
            start = %start,
            wait_secs = delay.as_secs(),
            "waiting for start time"
        );
        tokio::time::sleep(delay).await;
    }

    /// Runs every account's trade and returns the ledger.
    ///
    /// # Errors
    ///
    /// Under [`BatchPolicy::Strict`], returns
    /// `SchedulerError::AccountsFailed` if any account did not confirm. The
    /// error carries the full ledger.
    pub async fn run(&self, accounts: Vec<Account>) -> Result<BatchReport, SchedulerError> {
        self.wait_for_start().await;

        let total = accounts.len();
        info!(accounts = total, policy = %self.policy, "starting batch");

        let mut labels = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);
        for account in accounts {
            labels.push((account.index(), account.label()));
            let executor = Arc::clone(&self.executor);
            handles.push(tokio::spawn(async move {
                executor.execute(&account).await
            }));
        }

        let results = join_all(handles).await;
        let mut report = BatchReport {
            accounts: Vec::with_capacity(total),
        };
        for ((index, account), result) in labels.into_iter().zip(results) {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(account = %account, error = %e, "trade task panicked");
                    TradeOutcome::Failed {
                        stage: TradeStage::Start,
                        tx_hash: None,
                        error: TradeError::internal(format!("task panicked: {}", e)),
                    }
                }
            };
            report.accounts.push(AccountReport {
                account,
                index,
                outcome,
            });
        }

        let failed = report.failed();
        info!(
            succeeded = report.succeeded(),
            failed,
            total,
            "batch finished"
        );

        if failed > 0 && self.policy.is_strict() {
            warn!(failed, total, "strict policy, batch failed");
            return Err(SchedulerError::AccountsFailed {
                failed,
                total,
                report,
            });
        }
        Ok(report)
    }
}
