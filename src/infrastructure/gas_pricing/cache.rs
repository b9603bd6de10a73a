//! # Caching Gas Pricer
//!
//! Single-slot, time-bounded cache in front of a [`GasPricer`].
//!
//! Gas price is chain-global, so the cache is keyed only by expiry. The
//! expiry check and any refresh happen under one async lock: concurrent
//! callers during a miss wait for the single in-flight refresh instead of
//! each hitting the oracle.

use super::traits::{GasPriceError, GasPriceResult, GasPricer};
use crate::domain::entities::gas_quote::GasQuote;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A cached quote and the instant it stops being served.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    quote: GasQuote,
    expires_at: Instant,
}

/// Gas pricer that serves a cached quote until its TTL elapses.
#[derive(Debug)]
pub struct CachingGasPricer {
    backend: Arc<dyn GasPricer>,
    ttl: Duration,
    slot: Mutex<Option<CacheEntry>>,
}

impl CachingGasPricer {
    /// Default time a quote is served before refreshing.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(1);

    /// Wraps `backend` with a cache of the given TTL.
    #[must_use]
    pub fn new(backend: Arc<dyn GasPricer>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Returns the TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl GasPricer for CachingGasPricer {
    async fn gas_price(&self) -> GasPriceResult<GasQuote> {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.filter(|entry| Instant::now() < entry.expires_at) {
            return Ok(entry.quote);
        }

        // Refresh while holding the lock. On failure the stale entry stays
        // in place and is not served; the next call refreshes again.
        match self.backend.gas_price().await {
            Ok(quote) => {
                *slot = Some(CacheEntry {
                    quote,
                    expires_at: Instant::now() + self.ttl,
                });
                debug!(%quote, ttl = ?self.ttl, "gas price cache refreshed");
                Ok(quote)
            }
            Err(e) => {
                warn!(error = %e, "gas price refresh failed");
                Err(GasPriceError::refresh(e))
            }
        }
    }
}
