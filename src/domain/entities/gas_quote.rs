//! # Gas Quote
//!
//! A fee-market price suggestion from the fee oracle.

use crate::domain::value_objects::fees::{FeeCaps, FeeResult};
use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suggested dynamic-fee prices, in gwei.
///
/// Gas price is chain-global, so one quote serves every account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasQuote {
    /// Suggested maximum fee per gas in gwei.
    pub max_fee_per_gas_gwei: f64,
    /// Suggested priority fee per gas in gwei.
    pub priority_fee_per_gas_gwei: f64,
    /// When the quote was fetched from the oracle.
    pub fetched_at: DateTime<Utc>,
}

impl GasQuote {
    /// Creates a quote stamped with the current time.
    #[must_use]
    pub fn new(max_fee_per_gas_gwei: f64, priority_fee_per_gas_gwei: f64) -> Self {
        Self {
            max_fee_per_gas_gwei,
            priority_fee_per_gas_gwei,
            fetched_at: Utc::now(),
        }
    }

    /// Computes per-gas fee caps for a transaction.
    ///
    /// See [`FeeCaps::compute`].
    ///
    /// # Errors
    ///
    /// Returns an error for invalid gwei values or a zero gas limit with a
    /// fee budget.
    pub fn fee_caps(
        &self,
        gas_limit: u64,
        max_gas_fee: Option<U256>,
        tip_multiplier: f64,
    ) -> FeeResult<FeeCaps> {
        FeeCaps::compute(
            self.max_fee_per_gas_gwei,
            self.priority_fee_per_gas_gwei,
            gas_limit,
            max_gas_fee,
            tip_multiplier,
        )
    }
}

impl fmt::Display for GasQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_fee={} gwei, priority_fee={} gwei",
            self.max_fee_per_gas_gwei, self.priority_fee_per_gas_gwei
        )
    }
}
