//! # Chain Client Trait
//!
//! Port definition for the chain RPC capabilities the trade pipeline
//! consumes: nonces, gas estimation, raw broadcast and receipt lookup.

use crate::domain::entities::transaction::{SignedTransaction, UnsignedCall};
use crate::domain::value_objects::enums::NonceMode;
use async_trait::async_trait;
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transaction receipt with confirmation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: H256,
    /// Block number where the transaction was included.
    pub block_number: u64,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Effective gas price paid, in wei.
    pub effective_gas_price: u128,
    /// Whether execution succeeded.
    pub success: bool,
}

/// Error type for chain operations.
#[derive(Debug, Clone, Error)]
pub enum BlockchainError {
    /// RPC transport or node error.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Gas estimation (simulation) failed.
    #[error("gas estimation error: {0}")]
    GasEstimation(String),

    /// Node rejected the broadcast.
    #[error("submission error: {0}")]
    Submission(String),

    /// Nonce lookup failed.
    #[error("nonce error: {0}")]
    Nonce(String),

    /// Receipt lookup failed for a reason other than "not found".
    #[error("receipt error: {0}")]
    Receipt(String),

    /// Node reports a different chain than configured.
    #[error("chain mismatch: expected {expected}, got {actual}")]
    ChainMismatch {
        /// Configured chain id.
        expected: u64,
        /// Chain id reported by the node.
        actual: u64,
    },

    /// Caller supplied something the node cannot use.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl BlockchainError {
    /// Creates an RPC error.
    #[must_use]
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Creates a gas estimation error.
    #[must_use]
    pub fn gas_estimation(msg: impl Into<String>) -> Self {
        Self::GasEstimation(msg.into())
    }

    /// Creates a submission error.
    #[must_use]
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Creates a nonce error.
    #[must_use]
    pub fn nonce(msg: impl Into<String>) -> Self {
        Self::Nonce(msg.into())
    }

    /// Creates a receipt error.
    #[must_use]
    pub fn receipt(msg: impl Into<String>) -> Self {
        Self::Receipt(msg.into())
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type for chain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Chain RPC capabilities used by the trade pipeline.
///
/// Implementations must be safe to share between concurrent account
/// pipelines.
#[async_trait]
pub trait ChainClient: Send + Sync + fmt::Debug {
    /// Returns the account nonce.
    ///
    /// # Errors
    ///
    /// Returns `BlockchainError::Nonce` if the RPC call fails.
    async fn get_nonce(&self, address: Address, mode: NonceMode) -> BlockchainResult<u64>;

    /// Simulates a call and returns the gas it consumed, unbuffered.
    ///
    /// # Errors
    ///
    /// Returns `BlockchainError::GasEstimation` if simulation fails.
    async fn estimate_gas(&self, call: &UnsignedCall) -> BlockchainResult<u64>;

    /// Broadcasts a signed transaction and returns the node's hash.
    ///
    /// # Errors
    ///
    /// Returns `BlockchainError::Submission` if the node rejects it.
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<H256>;

    /// Looks up a receipt. `Ok(None)` means not mined yet.
    ///
    /// # Errors
    ///
    /// Returns `BlockchainError::Receipt` if the lookup itself fails.
    async fn get_transaction_receipt(&self, tx_hash: H256) -> BlockchainResult<Option<TxReceipt>>;

    /// Checks the node is reachable and on the expected chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or on another chain.
    async fn health_check(&self, expected_chain_id: u64) -> BlockchainResult<()>;
}
