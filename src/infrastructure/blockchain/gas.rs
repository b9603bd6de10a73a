//! # Gas Limits
//!
//! Gas limit selection for swap transactions: a configured override
//! clamped to a hard ceiling, or a buffered simulation estimate.

use crate::domain::entities::trade::MAX_GAS_LIMIT;

/// Gas estimator with configurable buffer.
///
/// Applies a percentage buffer to gas estimates to absorb estimation
/// variance between simulation and inclusion.
#[derive(Debug, Clone)]
pub struct GasEstimator {
    /// Buffer percentage to add to gas estimates (e.g., 20 for 20%).
    buffer_percent: u64,
    /// Ceiling applied to configured overrides.
    ceiling: u64,
}

impl GasEstimator {
    /// Default gas buffer percentage (1.2x).
    pub const DEFAULT_BUFFER_PERCENT: u64 = 20;

    /// Creates a new gas estimator with the specified buffer.
    #[must_use]
    pub const fn new(buffer_percent: u64) -> Self {
        Self {
            buffer_percent,
            ceiling: MAX_GAS_LIMIT,
        }
    }

    /// Creates a gas estimator with the default buffer.
    #[must_use]
    pub const fn with_default_buffer() -> Self {
        Self::new(Self::DEFAULT_BUFFER_PERCENT)
    }

    /// Returns the buffer percentage.
    #[must_use]
    pub const fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Returns the override ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Applies the buffer to a gas estimate.
    #[must_use]
    pub const fn apply_buffer(&self, estimate: u64) -> u64 {
        estimate.saturating_add(estimate.saturating_mul(self.buffer_percent) / 100)
    }

    /// Returns the configured override clamped to the ceiling, or `None`
    /// when the override is zero and the limit must be estimated.
    #[must_use]
    pub fn override_limit(&self, configured: u64) -> Option<u64> {
        (configured > 0).then(|| configured.min(self.ceiling))
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::with_default_buffer()
    }
}
