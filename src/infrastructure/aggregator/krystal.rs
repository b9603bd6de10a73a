//! # Krystal Aggregator Client
//!
//! [`SwapQuoter`] implementation for the Krystal swap API.
//!
//! Two round trips per trade: `swap/allRates` to pick a route, then
//! `swap/buildTx` to materialize the call for a known nonce. Both are
//! query-string GETs with JSON responses; a non-2xx status surfaces the
//! raw body.

use super::api_types::{AllRatesQuery, BuildTxQuery, BuildTxResponse, Rate, RatesResponse};
use crate::domain::entities::transaction::UnsignedCall;
use crate::domain::value_objects::tokens::hex_address;
use crate::infrastructure::http::{HttpClient, HttpError, join_url};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for aggregator operations.
#[derive(Debug, Clone, Error)]
pub enum AggregatorError {
    /// Transport or status failure.
    #[error("aggregator request failed: {0}")]
    Http(#[from] HttpError),

    /// No candidate route for the pair and amount.
    #[error("no route from {token_in:?} to {token_out:?}")]
    NoRoute {
        /// Input token.
        token_in: Address,
        /// Output token.
        token_out: Address,
    },

    /// A quoted amount could not be parsed.
    #[error("invalid quoted amount: {0:?}")]
    InvalidAmount(String),
}

/// Result type for aggregator operations.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Inputs to a rate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    /// Input token (native sentinel allowed).
    pub token_in: Address,
    /// Output token (native sentinel allowed).
    pub token_out: Address,
    /// Exact input amount.
    pub amount_in: U256,
    /// Integrator fee wallet.
    pub platform_wallet: Address,
    /// Account that will send the swap.
    pub user: Address,
}

/// Inputs to a build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTxRequest {
    /// Input token (native sentinel allowed).
    pub token_in: Address,
    /// Output token (native sentinel allowed).
    pub token_out: Address,
    /// Exact input amount.
    pub amount_in: U256,
    /// Minimum acceptable output.
    pub min_amount_out: U256,
    /// Integrator fee wallet.
    pub platform_wallet: Address,
    /// Account that will send the swap.
    pub user: Address,
    /// Routing hint of the chosen rate.
    pub hint: String,
    /// Nonce the transaction will use.
    pub nonce: u64,
    /// Ask the aggregator not to check balances.
    pub skip_balance_check: bool,
}

/// A swap aggregator.
#[async_trait]
pub trait SwapQuoter: Send + Sync + fmt::Debug {
    /// Returns candidate routes, best first. Never returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns `AggregatorError::NoRoute` if there are no candidates, or
    /// `AggregatorError::Http` if the request fails.
    async fn get_rates(&self, request: &RateRequest) -> AggregatorResult<Vec<Rate>>;

    /// Materializes the call for a chosen route.
    ///
    /// # Errors
    ///
    /// Returns `AggregatorError::Http` if the request fails.
    async fn build_tx(&self, request: &BuildTxRequest) -> AggregatorResult<UnsignedCall>;
}

/// Krystal API client.
#[derive(Debug, Clone)]
pub struct KrystalClient {
    base_url: String,
    http: HttpClient,
}

impl KrystalClient {
    /// Creates a client for the API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        join_url(&self.base_url, &format!("swap/{name}"))
    }
}

#[async_trait]
impl SwapQuoter for KrystalClient {
    async fn get_rates(&self, request: &RateRequest) -> AggregatorResult<Vec<Rate>> {
        let query = AllRatesQuery {
            src: hex_address(&request.token_in),
            dest: hex_address(&request.token_out),
            src_amount: request.amount_in.to_string(),
            platform_wallet: hex_address(&request.platform_wallet),
            user_address: hex_address(&request.user),
        };

        let response: RatesResponse = self
            .http
            .get_with_params(&self.endpoint("allRates"), &query)
            .await?;

        if response.rates.is_empty() {
            warn!(src = %query.src, dest = %query.dest, "aggregator returned no rates");
            return Err(AggregatorError::NoRoute {
                token_in: request.token_in,
                token_out: request.token_out,
            });
        }

        debug!(
            count = response.rates.len(),
            best_platform = %response.rates.first().map(|r| r.platform.as_str()).unwrap_or_default(),
            "fetched aggregator rates"
        );
        Ok(response.rates)
    }

    async fn build_tx(&self, request: &BuildTxRequest) -> AggregatorResult<UnsignedCall> {
        let query = BuildTxQuery {
            src: hex_address(&request.token_in),
            dest: hex_address(&request.token_out),
            src_amount: request.amount_in.to_string(),
            min_dest_amount: request.min_amount_out.to_string(),
            platform_wallet: hex_address(&request.platform_wallet),
            user_address: hex_address(&request.user),
            hint: request.hint.clone(),
            gas_price: String::new(),
            nonce: request.nonce,
            skip_balance_check: request.skip_balance_check.then_some(true),
        };

        let response: BuildTxResponse = self
            .http
            .get_with_params(&self.endpoint("buildTx"), &query)
            .await?;

        let tx = response.tx_object;
        if tx.from != request.user {
            warn!(
                expected = ?request.user,
                returned = ?tx.from,
                "aggregator built the call for another sender"
            );
        }
        debug!(
            to = ?tx.to,
            value = %tx.value,
            used_default_gas = response.used_default_gas,
            "aggregator built swap call"
        );

        Ok(UnsignedCall {
            from: request.user,
            to: tx.to,
            value: tx.value,
            data: tx.data,
        })
    }
}

/// Picks the best rate and parses its quoted output.
///
/// # Errors
///
/// Returns `AggregatorError::InvalidAmount` if the amount is not a decimal
/// integer.
pub fn best_rate(rates: &[Rate]) -> AggregatorResult<(&Rate, U256)> {
    let best = rates.first().ok_or_else(|| AggregatorError::InvalidAmount(String::new()))?;
    let amount = best
        .quoted_amount()
        .ok_or_else(|| AggregatorError::InvalidAmount(best.amount.clone()))?;
    Ok((best, amount))
}
