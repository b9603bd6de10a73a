//! # Fee Oracle Client
//!
//! [`GasPricer`] backed by the MetaMask-style `suggestedGasFees` endpoint.
//!
//! The oracle returns `low`/`medium`/`high` tiers with decimal-string gwei
//! values; the `high` tier is used so swaps land quickly.

use super::traits::{GasPriceError, GasPriceResult, GasPricer};
use crate::domain::entities::gas_quote::GasQuote;
use crate::infrastructure::http::{HttpClient, join_url};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Path of the suggestion endpoint below the configured base URL.
const SUGGESTED_FEES_PATH: &str = "suggestedGasFees";

/// One fee tier of the oracle response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTier {
    /// Suggested max fee per gas in gwei, as a decimal string.
    pub suggested_max_fee_per_gas: String,
    /// Suggested priority fee per gas in gwei, as a decimal string.
    pub suggested_max_priority_fee_per_gas: String,
    /// Lower bound of the expected wait, in milliseconds.
    #[serde(default)]
    pub min_wait_time_estimate: Option<u64>,
    /// Upper bound of the expected wait, in milliseconds.
    #[serde(default)]
    pub max_wait_time_estimate: Option<u64>,
}

/// Oracle response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedGasFees {
    /// Cheapest tier.
    pub low: FeeTier,
    /// Default tier.
    pub medium: FeeTier,
    /// Fastest tier.
    pub high: FeeTier,
    /// Estimated base fee in gwei.
    #[serde(default)]
    pub estimated_base_fee: Option<String>,
    /// Network congestion in `[0, 1]`.
    #[serde(default)]
    pub network_congestion: Option<f64>,
}

fn parse_gwei(field: &'static str, raw: &str) -> GasPriceResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(GasPriceError::invalid_value(field, raw)),
    }
}

impl SuggestedGasFees {
    /// Converts the `high` tier to a quote.
    ///
    /// # Errors
    ///
    /// Returns `GasPriceError::InvalidValue` if a value is not a
    /// non-negative decimal.
    pub fn to_quote(&self) -> GasPriceResult<GasQuote> {
        let max_fee = parse_gwei("suggestedMaxFeePerGas", &self.high.suggested_max_fee_per_gas)?;
        let tip = parse_gwei(
            "suggestedMaxPriorityFeePerGas",
            &self.high.suggested_max_priority_fee_per_gas,
        )?;
        Ok(GasQuote::new(max_fee, tip))
    }
}

/// Fee oracle client.
#[derive(Debug, Clone)]
pub struct MetamaskGasPricer {
    url: String,
    http: HttpClient,
}

impl MetamaskGasPricer {
    /// Creates a client for the oracle rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            url: join_url(base_url, SUGGESTED_FEES_PATH),
            http,
        }
    }

    /// Returns the full suggestion URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GasPricer for MetamaskGasPricer {
    async fn gas_price(&self) -> GasPriceResult<GasQuote> {
        let fees: SuggestedGasFees = self.http.get(&self.url).await?;
        let quote = fees.to_quote()?;
        debug!(
            max_fee_gwei = quote.max_fee_per_gas_gwei,
            tip_gwei = quote.priority_fee_per_gas_gwei,
            base_fee = ?fees.estimated_base_fee,
            "fetched gas price suggestion"
        );
        Ok(quote)
    }
}
