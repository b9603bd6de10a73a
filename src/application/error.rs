//! # Application Errors
//!
//! The per-trade failure taxonomy.
//!
//! Every error a trade pipeline can end with maps to exactly one
//! [`TradeError`] variant, so callers can tell apart failures that never
//! left this process, broadcasts that were not confirmed in time, and
//! transactions that were mined but reverted.
//!
//! # Error Hierarchy
//!
//! ```text
//! TradeError
//! ├── Key / Signing          - key material and signature failures
//! ├── NoRoute / Quote        - aggregator had no route or failed
//! ├── Encoding               - router call encoding rejected
//! ├── Rpc / Estimation       - chain node failures
//! ├── GasPrice               - fee oracle failures
//! ├── Submission             - broadcast rejected
//! ├── PreSubmissionTimeout   - deadline hit before broadcast
//! ├── ConfirmationTimeout    - broadcast, no receipt in time
//! ├── Reverted               - mined with failure status
//! └── Internal               - task failures
//! ```

use crate::domain::value_objects::fees::FeeError;
use crate::infrastructure::aggregator::AggregatorError;
use crate::infrastructure::blockchain::{BlockchainError, SignerError};
use crate::infrastructure::encoding::EncodingError;
use crate::infrastructure::gas_pricing::GasPriceError;
use ethers::types::H256;
use std::time::Duration;
use thiserror::Error;

/// Error type for a single account's trade.
#[derive(Debug, Clone, Error)]
pub enum TradeError {
    /// Invalid raw key or undecryptable keystore entry.
    #[error("key error: {0}")]
    Key(String),

    /// Aggregator returned no candidate route.
    #[error("no route: {0}")]
    NoRoute(String),

    /// Aggregator request failed.
    #[error("quote error: {0}")]
    Quote(String),

    /// Swap call encoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Chain node call failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Gas estimation failed.
    #[error("gas estimation error: {0}")]
    Estimation(String),

    /// Gas price could not be obtained or converted.
    #[error("gas price error: {0}")]
    GasPrice(String),

    /// Signing failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// The node rejected the broadcast.
    #[error("submission error: {0}")]
    Submission(String),

    /// The pre-submission deadline passed.
    #[error("pre-submission deadline of {0:?} exceeded")]
    PreSubmissionTimeout(Duration),

    /// No receipt within the confirmation deadline. The transaction may
    /// still be mined later.
    #[error("transaction {tx_hash:?} not confirmed within {waited:?}")]
    ConfirmationTimeout {
        /// Broadcast transaction.
        tx_hash: H256,
        /// Time spent waiting.
        waited: Duration,
    },

    /// Mined with failure status.
    #[error("transaction {0:?} reverted")]
    Reverted(H256),

    /// Internal failure such as a crashed task.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TradeError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns a stable snake_case label for logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::NoRoute(_) => "no_route",
            Self::Quote(_) => "quote",
            Self::Encoding(_) => "encoding",
            Self::Rpc(_) => "rpc",
            Self::Estimation(_) => "estimation",
            Self::GasPrice(_) => "gas_price",
            Self::Signing(_) => "signing",
            Self::Submission(_) => "submission",
            Self::PreSubmissionTimeout(_) => "pre_submission_timeout",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Reverted(_) => "reverted",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<BlockchainError> for TradeError {
    fn from(error: BlockchainError) -> Self {
        match error {
            BlockchainError::GasEstimation(msg) => Self::Estimation(msg),
            BlockchainError::Submission(msg) => Self::Submission(msg),
            other => Self::Rpc(other.to_string()),
        }
    }
}

impl From<SignerError> for TradeError {
    fn from(error: SignerError) -> Self {
        match error {
            SignerError::Key(msg) => Self::Key(msg),
            SignerError::Signing(msg) => Self::Signing(msg),
        }
    }
}

impl From<AggregatorError> for TradeError {
    fn from(error: AggregatorError) -> Self {
        match &error {
            AggregatorError::NoRoute { .. } => Self::NoRoute(error.to_string()),
            _ => Self::Quote(error.to_string()),
        }
    }
}

impl From<GasPriceError> for TradeError {
    fn from(error: GasPriceError) -> Self {
        Self::GasPrice(error.to_string())
    }
}

impl From<FeeError> for TradeError {
    fn from(error: FeeError) -> Self {
        Self::GasPrice(error.to_string())
    }
}

/// Result type for trade execution.
pub type TradeResult<T> = Result<T, TradeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::HttpError;
    use ethers::types::Address;

    #[test]
    fn blockchain_errors_map_by_stage() {
        assert_eq!(
            TradeError::from(BlockchainError::gas_estimation("revert")).kind(),
            "estimation"
        );
        assert_eq!(
            TradeError::from(BlockchainError::submission("nonce too low")).kind(),
            "submission"
        );
        assert_eq!(TradeError::from(BlockchainError::nonce("eof")).kind(), "rpc");
    }

    #[test]
    fn signer_errors_split_key_and_signing() {
        assert_eq!(TradeError::from(SignerError::key("bad")).kind(), "key");
        assert_eq!(TradeError::from(SignerError::signing("bad")).kind(), "signing");
    }

    #[test]
    fn aggregator_no_route_is_distinct() {
        let no_route = AggregatorError::NoRoute {
            token_in: Address::zero(),
            token_out: Address::repeat_byte(1),
        };
        assert_eq!(TradeError::from(no_route).kind(), "no_route");

        let http = AggregatorError::Http(HttpError::status(500, "oops"));
        assert_eq!(TradeError::from(http).kind(), "quote");
    }
}
