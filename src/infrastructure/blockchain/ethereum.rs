//! # Ethereum Client
//!
//! [`ChainClient`] implementation over JSON-RPC using ethers-rs.
//!
//! Works against any EVM chain that accepts dynamic-fee transactions.

use super::client::{BlockchainError, BlockchainResult, ChainClient, TxReceipt};
use crate::domain::entities::transaction::{SignedTransaction, UnsignedCall};
use crate::domain::value_objects::enums::NonceMode;
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ethereum client implementation using ethers-rs.
#[derive(Debug, Clone)]
pub struct EthereumClient {
    /// RPC endpoint, kept for diagnostics.
    rpc_url: String,
    /// JSON-RPC provider.
    provider: Arc<Provider<Http>>,
}

impl EthereumClient {
    /// Creates a new client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns `BlockchainError::InvalidInput` if the URL cannot be parsed.
    pub fn new(rpc_url: &str) -> BlockchainResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| BlockchainError::invalid_input(format!("rpc url {rpc_url}: {e}")))?;

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            provider: Arc::new(provider),
        })
    }

    /// Returns the RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

fn block_for(mode: NonceMode) -> BlockId {
    match mode {
        NonceMode::Latest => BlockId::Number(BlockNumber::Latest),
        NonceMode::Pending => BlockId::Number(BlockNumber::Pending),
    }
}

fn fits_u64(value: U256, what: &str) -> Result<u64, String> {
    if value > U256::from(u64::MAX) {
        return Err(format!("{what} out of range: {value}"));
    }
    Ok(value.as_u64())
}

fn to_receipt(receipt: TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()).unwrap_or_default(),
        gas_used: receipt.gas_used.map(|g| g.low_u64()).unwrap_or_default(),
        effective_gas_price: receipt
            .effective_gas_price
            .map(|p| p.low_u128())
            .unwrap_or_default(),
        success: receipt.status.map(|s| s.as_u64() == 1).unwrap_or(false),
    }
}

#[async_trait]
impl ChainClient for EthereumClient {
    async fn get_nonce(&self, address: Address, mode: NonceMode) -> BlockchainResult<u64> {
        let count = self
            .provider
            .get_transaction_count(address, Some(block_for(mode)))
            .await
            .map_err(|e| BlockchainError::nonce(e.to_string()))?;

        fits_u64(count, "nonce").map_err(BlockchainError::nonce)
    }

    async fn estimate_gas(&self, call: &UnsignedCall) -> BlockchainResult<u64> {
        let tx = Eip1559TransactionRequest::new()
            .from(call.from)
            .to(call.to)
            .value(call.value)
            .data(call.data.clone());

        let estimate = self
            .provider
            .estimate_gas(&TypedTransaction::Eip1559(tx), None)
            .await
            .map_err(|e| BlockchainError::gas_estimation(e.to_string()))?;

        fits_u64(estimate, "gas estimate").map_err(BlockchainError::gas_estimation)
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> BlockchainResult<H256> {
        let pending = self
            .provider
            .send_raw_transaction(tx.raw().clone())
            .await
            .map_err(|e| BlockchainError::submission(e.to_string()))?;

        let node_hash = pending.tx_hash();
        if node_hash != tx.hash() {
            warn!(
                local = ?tx.hash(),
                node = ?node_hash,
                "node returned a different transaction hash"
            );
        }
        Ok(node_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: H256) -> BlockchainResult<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| BlockchainError::receipt(e.to_string()))?;

        if receipt.is_none() {
            debug!(tx_hash = ?tx_hash, "receipt not available yet");
        }
        Ok(receipt.map(to_receipt))
    }

    async fn health_check(&self, expected_chain_id: u64) -> BlockchainResult<()> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| BlockchainError::rpc(e.to_string()))?;

        let actual = fits_u64(chain_id, "chain id").map_err(BlockchainError::rpc)?;
        if actual != expected_chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: expected_chain_id,
                actual,
            });
        }

        Ok(())
    }
}
