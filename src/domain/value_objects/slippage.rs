//! # Slippage Protection
//!
//! Minimum-output computation for quoted swaps.
//!
//! All math is on arbitrary-precision unsigned integers with truncating
//! division, so the computed floor never exceeds the quote.
//!
//! # Examples
//!
//! ```
//! use ethers::types::U256;
//! use swap_executor::domain::value_objects::slippage::{apply_slippage, effective_min_return};
//!
//! let quoted = U256::from(1_000_000u64);
//! let floor = apply_slippage(quoted, 50); // 0.5%
//! assert_eq!(floor, U256::from(995_000u64));
//!
//! // An explicit account floor only ever tightens the bound.
//! assert_eq!(effective_min_return(floor, Some(U256::from(999_000u64))), U256::from(999_000u64));
//! assert_eq!(effective_min_return(floor, Some(U256::from(1u64))), floor);
//! ```

use ethers::types::U256;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Returns `quoted * (10000 - bps) / 10000` with truncating division.
///
/// Tolerances above 10000 bps clamp the result to zero.
#[must_use]
pub fn apply_slippage(quoted: U256, bps: u32) -> U256 {
    if bps > BPS_DENOMINATOR {
        return U256::zero();
    }

    let keep = U256::from(BPS_DENOMINATOR - bps);
    let denominator = U256::from(BPS_DENOMINATOR);

    // Split the quote so `quoted * keep` cannot overflow near U256::MAX.
    let whole = quoted / denominator;
    let rest = quoted % denominator;
    whole * keep + rest * keep / denominator
}

/// Combines the slippage floor with an explicit minimum-return override.
///
/// The larger of the two wins.
#[inline]
#[must_use]
pub fn effective_min_return(slippage_floor: U256, floor_override: Option<U256>) -> U256 {
    match floor_override {
        Some(explicit) => slippage_floor.max(explicit),
        None => slippage_floor,
    }
}
