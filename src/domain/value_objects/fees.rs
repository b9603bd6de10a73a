//! # Fee Math
//!
//! Gwei/wei conversion and dynamic-fee cap computation.
//!
//! Fee oracles quote in fractional gwei; transactions carry integer wei.
//! Conversion goes through a fixed nine-decimal rendering so the result
//! never depends on float formatting quirks.

use ethers::types::U256;
use ethers::utils::parse_units;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places between gwei and wei.
pub const GWEI_DECIMALS: u32 = 9;

/// Error type for fee computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeeError {
    /// Gwei value is negative, NaN or infinite.
    #[error("invalid gwei amount: {0}")]
    InvalidGwei(f64),

    /// Gwei value could not be converted to wei.
    #[error("gwei conversion failed: {0}")]
    Conversion(String),

    /// Fee budget division by a zero gas limit.
    #[error("gas limit is zero")]
    ZeroGasLimit,
}

/// Result type for fee computation.
pub type FeeResult<T> = Result<T, FeeError>;

/// Converts a gwei amount to wei, rounding to the nearest wei.
///
/// # Errors
///
/// Returns `FeeError::InvalidGwei` for negative or non-finite input.
///
/// # Examples
///
/// ```
/// use ethers::types::U256;
/// use swap_executor::domain::value_objects::fees::gwei_to_wei;
///
/// assert_eq!(gwei_to_wei(1.5).unwrap(), U256::from(1_500_000_000u64));
/// assert!(gwei_to_wei(-1.0).is_err());
/// ```
pub fn gwei_to_wei(gwei: f64) -> FeeResult<U256> {
    if !gwei.is_finite() || gwei < 0.0 {
        return Err(FeeError::InvalidGwei(gwei));
    }

    let rendered = format!("{:.*}", GWEI_DECIMALS as usize, gwei);
    parse_units(rendered, "gwei")
        .map(Into::into)
        .map_err(|e| FeeError::Conversion(e.to_string()))
}

/// Per-gas fee caps for a dynamic-fee transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCaps {
    /// Maximum total fee per gas in wei.
    pub max_fee_per_gas: U256,
    /// Maximum priority fee (tip) per gas in wei.
    pub max_priority_fee_per_gas: U256,
}

impl FeeCaps {
    /// Computes fee caps from a market quote.
    ///
    /// The fee cap is the quoted max fee, unless the account sets an
    /// absolute budget for the whole transaction; then it is
    /// `budget / gas_limit` (floor) and the market price is ignored. The
    /// tip is the quoted tip scaled by `tip_multiplier`.
    ///
    /// # Errors
    ///
    /// Returns `FeeError::ZeroGasLimit` if a budget is set and the gas limit
    /// is zero, or a conversion error for invalid gwei inputs.
    pub fn compute(
        max_fee_gwei: f64,
        tip_gwei: f64,
        gas_limit: u64,
        max_gas_fee: Option<U256>,
        tip_multiplier: f64,
    ) -> FeeResult<Self> {
        let max_fee_per_gas = match max_gas_fee {
            Some(budget) => budget_fee_cap(budget, gas_limit)?,
            None => gwei_to_wei(max_fee_gwei)?,
        };
        let max_priority_fee_per_gas = gwei_to_wei(tip_gwei * tip_multiplier)?;

        Ok(Self {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    /// Returns true if the tip exceeds the fee cap.
    ///
    /// Nodes reject such transactions; the pipeline logs it but leaves the
    /// rejection to the node.
    #[must_use]
    pub fn tip_exceeds_cap(&self) -> bool {
        self.max_priority_fee_per_gas > self.max_fee_per_gas
    }

    /// Upper bound of the transaction fee in wei.
    #[must_use]
    pub fn max_cost(&self, gas_limit: u64) -> U256 {
        self.max_fee_per_gas.saturating_mul(U256::from(gas_limit))
    }
}

/// Returns `budget / gas_limit` with floor division.
///
/// # Errors
///
/// Returns `FeeError::ZeroGasLimit` when `gas_limit` is zero.
pub fn budget_fee_cap(budget: U256, gas_limit: u64) -> FeeResult<U256> {
    if gas_limit == 0 {
        return Err(FeeError::ZeroGasLimit);
    }
    Ok(budget / U256::from(gas_limit))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn gwei_to_wei_whole_and_fractional() {
        assert_eq!(gwei_to_wei(0.0).unwrap(), U256::zero());
        assert_eq!(gwei_to_wei(30.0).unwrap(), U256::from(30_000_000_000u64));
        assert_eq!(gwei_to_wei(0.000000001).unwrap(), U256::one());
        assert_eq!(gwei_to_wei(12.345678901).unwrap(), U256::from(12_345_678_901u64));
    }

    #[test]
    fn gwei_to_wei_rejects_bad_input() {
        assert_eq!(gwei_to_wei(-0.5), Err(FeeError::InvalidGwei(-0.5)));
        assert!(gwei_to_wei(f64::NAN).is_err());
        assert!(gwei_to_wei(f64::INFINITY).is_err());
    }

    #[test]
    fn market_fee_cap_when_no_budget() {
        let caps = FeeCaps::compute(40.0, 2.0, 200_000, None, 1.5).unwrap();
        assert_eq!(caps.max_fee_per_gas, U256::from(40_000_000_000u64));
        assert_eq!(caps.max_priority_fee_per_gas, U256::from(3_000_000_000u64));
        assert!(!caps.tip_exceeds_cap());
    }

    #[test]
    fn budget_overrides_market_price() {
        let budget = U256::from(1_000_000_000_000_000u64); // 0.001 native
        let caps = FeeCaps::compute(500.0, 2.0, 300_000, Some(budget), 1.0).unwrap();
        assert_eq!(caps.max_fee_per_gas, U256::from(3_333_333_333u64));
        assert_eq!(caps.max_cost(300_000), U256::from(999_999_999_900_000u64));
    }

    #[test]
    fn budget_with_zero_gas_limit_fails() {
        let result = FeeCaps::compute(1.0, 1.0, 0, Some(U256::one()), 1.0);
        assert_eq!(result, Err(FeeError::ZeroGasLimit));
    }

    #[test]
    fn tip_above_cap_is_flagged() {
        let caps = FeeCaps::compute(1.0, 2.0, 21_000, None, 1.0).unwrap();
        assert!(caps.tip_exceeds_cap());
    }

    proptest! {
        #[test]
        fn budget_cap_is_floor_division(budget in any::<u128>(), gas_limit in 1u64..=20_000_000) {
            let cap = budget_fee_cap(U256::from(budget), gas_limit).unwrap();
            prop_assert_eq!(cap, U256::from(budget / u128::from(gas_limit)));
            prop_assert!(cap * U256::from(gas_limit) <= U256::from(budget));
        }

        #[test]
        fn whole_gwei_converts_exactly(gwei in 0u32..1_000_000) {
            let wei = gwei_to_wei(f64::from(gwei)).unwrap();
            prop_assert_eq!(wei, U256::from(u64::from(gwei) * 1_000_000_000));
        }
    }
}
