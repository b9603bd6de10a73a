//! # Trade Outcomes
//!
//! The terminal result of one account's pipeline and the batch ledger the
//! scheduler builds from them.

use crate::application::error::TradeError;
use crate::domain::entities::trade::TradeStage;
use crate::infrastructure::blockchain::TxReceipt;
use ethers::types::H256;
use std::fmt;

/// How a single account's trade ended.
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    /// Mined with success status.
    Confirmed {
        /// Transaction hash.
        tx_hash: H256,
        /// Receipt.
        receipt: TxReceipt,
    },
    /// Mined with failure status.
    Reverted {
        /// Transaction hash.
        tx_hash: H256,
        /// Receipt.
        receipt: TxReceipt,
    },
    /// Broadcast, but no receipt was observed in time. May still be mined.
    Unconfirmed {
        /// Transaction hash.
        tx_hash: H256,
        /// Why waiting stopped.
        error: TradeError,
    },
    /// Failed before or during broadcast, or while looking up the receipt.
    Failed {
        /// Stage reached before the failure.
        stage: TradeStage,
        /// Hash, if the transaction had been signed.
        tx_hash: Option<H256>,
        /// The failure.
        error: TradeError,
    },
}

impl TradeOutcome {
    /// Returns true only for a confirmed trade.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Returns the transaction hash if one was produced.
    #[must_use]
    pub fn tx_hash(&self) -> Option<H256> {
        match self {
            Self::Confirmed { tx_hash, .. }
            | Self::Reverted { tx_hash, .. }
            | Self::Unconfirmed { tx_hash, .. } => Some(*tx_hash),
            Self::Failed { tx_hash, .. } => *tx_hash,
        }
    }

    /// Returns the failure, with reversion expressed as
    /// [`TradeError::Reverted`].
    #[must_use]
    pub fn error(&self) -> Option<TradeError> {
        match self {
            Self::Confirmed { .. } => None,
            Self::Reverted { tx_hash, .. } => Some(TradeError::Reverted(*tx_hash)),
            Self::Unconfirmed { error, .. } | Self::Failed { error, .. } => Some(error.clone()),
        }
    }

    /// Returns a short label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "confirmed",
            Self::Reverted { .. } => "reverted",
            Self::Unconfirmed { .. } => "unconfirmed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Converts into the receipt or the failure.
    ///
    /// # Errors
    ///
    /// Returns the [`TradeError`] for every outcome but `Confirmed`.
    pub fn into_result(self) -> Result<TxReceipt, TradeError> {
        match self {
            Self::Confirmed { receipt, .. } => Ok(receipt),
            Self::Reverted { tx_hash, .. } => Err(TradeError::Reverted(tx_hash)),
            Self::Unconfirmed { error, .. } | Self::Failed { error, .. } => Err(error),
        }
    }
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { tx_hash, receipt } => write!(
                f,
                "confirmed {:?} in block {}",
                tx_hash, receipt.block_number
            ),
            Self::Reverted { tx_hash, receipt } => write!(
                f,
                "reverted {:?} in block {}",
                tx_hash, receipt.block_number
            ),
            Self::Unconfirmed { tx_hash, error } => write!(f, "unconfirmed {:?}: {}", tx_hash, error),
            Self::Failed { stage, error, .. } => write!(f, "failed after {}: {}", stage, error),
        }
    }
}

/// One line of the batch ledger.
#[derive(Debug, Clone)]
pub struct AccountReport {
    /// Account label.
    pub account: String,
    /// Position in the configured list.
    pub index: usize,
    /// How the trade ended.
    pub outcome: TradeOutcome,
}

/// Per-account results of a batch, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per configured account.
    pub accounts: Vec<AccountReport>,
}

impl BatchReport {
    /// Number of confirmed trades.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.accounts.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Number of trades that did not confirm.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.accounts.len() - self.succeeded()
    }

    /// Returns true if every trade confirmed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Iterates over the failed entries.
    pub fn failures(&self) -> impl Iterator<Item = &AccountReport> {
        self.accounts.iter().filter(|r| !r.outcome.is_success())
    }
}
