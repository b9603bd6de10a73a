//! # Receipt Waiter
//!
//! Polls the chain for a transaction receipt until it is mined or the
//! confirmation deadline passes.

use super::client::{BlockchainError, ChainClient, TxReceipt};
use crate::infrastructure::retry::{PollError, PollPolicy};
use ethers::types::H256;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Waits for receipts on a shared chain client.
#[derive(Debug, Clone)]
pub struct ReceiptWaiter {
    chain: Arc<dyn ChainClient>,
    interval: Duration,
}

impl ReceiptWaiter {
    /// Creates a waiter polling at `interval`.
    #[must_use]
    pub fn new(chain: Arc<dyn ChainClient>, interval: Duration) -> Self {
        Self { chain, interval }
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the receipt of `tx_hash`.
    ///
    /// "Not found" keeps polling; a lookup error aborts immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::DeadlineExceeded`] if nothing is mined within
    /// `max_wait`, or [`PollError::Aborted`] with the lookup error.
    pub async fn wait(
        &self,
        tx_hash: H256,
        max_wait: Duration,
    ) -> Result<TxReceipt, PollError<BlockchainError>> {
        debug!(tx_hash = ?tx_hash, max_wait = ?max_wait, "waiting for receipt");

        let policy = PollPolicy::new(self.interval, max_wait);
        let receipt = policy
            .poll_until(
                || {
                    let chain = Arc::clone(&self.chain);
                    async move { chain.get_transaction_receipt(tx_hash).await }
                },
                |_| false,
            )
            .await?;

        info!(
            tx_hash = ?tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            success = receipt.success,
            "receipt observed"
        );
        Ok(receipt)
    }
}
