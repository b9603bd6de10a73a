//! # Gas Pricer Trait
//!
//! Source of chain-global fee-market price suggestions.

use crate::domain::entities::gas_quote::GasQuote;
use crate::infrastructure::http::HttpError;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for gas price acquisition.
#[derive(Debug, Clone, Error)]
pub enum GasPriceError {
    /// The fee oracle request failed.
    #[error("fee oracle request failed: {0}")]
    Http(#[from] HttpError),

    /// The fee oracle returned a value that is not a usable gwei amount.
    #[error("invalid fee oracle value for {field}: {value:?}")]
    InvalidValue {
        /// Field name in the oracle response.
        field: &'static str,
        /// Raw value received.
        value: String,
    },

    /// A cache refresh failed; the previous quote was kept.
    #[error("gas price refresh failed: {0}")]
    Refresh(Box<GasPriceError>),
}

impl GasPriceError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }

    /// Wraps a backend failure seen during a cache refresh.
    #[must_use]
    pub fn refresh(source: Self) -> Self {
        Self::Refresh(Box::new(source))
    }
}

/// Result type for gas price operations.
pub type GasPriceResult<T> = Result<T, GasPriceError>;

/// A source of gas price suggestions.
#[async_trait]
pub trait GasPricer: Send + Sync + fmt::Debug {
    /// Returns the current suggested fee caps.
    ///
    /// # Errors
    ///
    /// Returns an error if no suggestion can be obtained.
    async fn gas_price(&self) -> GasPriceResult<GasQuote>;
}
