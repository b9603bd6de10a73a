//! # Domain Enums
//!
//! Enumeration types for execution policy choices.
//!
//! - [`NonceMode`] - Which account nonce the pipeline builds on
//! - [`BatchPolicy`] - How per-account failures affect the batch
//! - [`RouterVersion`] - Which router ABI the direct encoder targets
//!
//! All enums implement `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The value does not name a known variant.
    #[error("invalid {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Source of the account nonce.
///
/// `Latest` reads the last confirmed nonce. `Pending` also counts
/// transactions still sitting in the mempool, which is required when one
/// account issues several trades in a single run, but builds on top of any
/// stuck pending transaction.
///
/// # Examples
///
/// ```
/// use swap_executor::domain::value_objects::enums::NonceMode;
///
/// assert_eq!(NonceMode::default(), NonceMode::Latest);
/// assert_eq!("pending".parse::<NonceMode>().unwrap(), NonceMode::Pending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceMode {
    /// Nonce at the latest confirmed block.
    #[default]
    Latest,
    /// Nonce including pending mempool transactions.
    Pending,
}

impl fmt::Display for NonceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for NonceMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" | "confirmed" => Ok(Self::Latest),
            "pending" => Ok(Self::Pending),
            _ => Err(ParseEnumError::InvalidValue("NonceMode", s.to_string())),
        }
    }
}

/// Batch failure policy for the scheduler.
///
/// Every account always runs to completion. The policy only decides
/// whether a failed account fails the batch as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// The batch fails if any account fails.
    #[default]
    Strict,
    /// The batch reports each account's outcome and never fails as a whole.
    BestEffort,
}

impl BatchPolicy {
    /// Returns true if a single failed account fails the batch.
    #[inline]
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::BestEffort => write!(f, "best_effort"),
        }
    }
}

impl FromStr for BatchPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(Self::Strict),
            "best_effort" | "besteffort" => Ok(Self::BestEffort),
            _ => Err(ParseEnumError::InvalidValue("BatchPolicy", s.to_string())),
        }
    }
}

/// Router ABI generation for direct-router swaps.
///
/// `V1` is the original swap router whose `exactInputSingle` parameters
/// include a deadline; `V2` (router 02) dropped the deadline field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterVersion {
    /// Swap router with a `deadline` parameter.
    V1,
    /// Swap router 02, no `deadline` parameter.
    #[default]
    V2,
}

impl RouterVersion {
    /// Returns true if this router's swap parameters carry a deadline.
    #[inline]
    #[must_use]
    pub const fn requires_deadline(self) -> bool {
        matches!(self, Self::V1)
    }
}

impl fmt::Display for RouterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for RouterVersion {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" | "02" => Ok(Self::V2),
            _ => Err(ParseEnumError::InvalidValue("RouterVersion", s.to_string())),
        }
    }
}
