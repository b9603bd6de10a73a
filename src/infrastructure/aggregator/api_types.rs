//! # Aggregator API Types
//!
//! Request and response types for the Krystal swap API.

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Token price entry returned alongside rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    /// Token address.
    pub address: Address,
    /// Price in USD.
    #[serde(default)]
    pub usd_price: f64,
}

/// A ready-to-sign call as returned by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TxObject {
    /// Sender the call was built for.
    pub from: Address,
    /// Aggregator router contract.
    pub to: Address,
    /// Native value, `0x` hex.
    #[serde(default)]
    pub value: U256,
    /// Call data, `0x` hex.
    #[serde(default)]
    pub data: Bytes,
}

/// One candidate route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    /// Quoted output amount, decimal string in token base units.
    pub amount: String,
    /// Exchange rate, decimal string.
    #[serde(default)]
    pub rate: String,
    /// Price impact in basis points.
    #[serde(default)]
    pub price_impact: i64,
    /// Liquidity platform name.
    #[serde(default)]
    pub platform: String,
    /// Opaque routing hint to pass back to `buildTx`.
    #[serde(default)]
    pub hint: String,
    /// Gas the aggregator expects the swap to use.
    #[serde(default)]
    pub estimated_gas: u64,
    /// Pre-built call for this route.
    #[serde(default)]
    pub tx_object: TxObject,
}

impl Rate {
    /// Parses the quoted output amount.
    ///
    /// Returns `None` if the amount is not a decimal integer.
    #[must_use]
    pub fn quoted_amount(&self) -> Option<U256> {
        U256::from_dec_str(self.amount.trim()).ok()
    }
}

/// Response of `swap/allRates`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatesResponse {
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: i64,
    /// Token prices.
    #[serde(default)]
    pub prices: Vec<TokenPrice>,
    /// Candidate routes, best first.
    #[serde(default)]
    pub rates: Vec<Rate>,
}

/// Response of `swap/buildTx`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTxResponse {
    /// Server timestamp.
    #[serde(default)]
    pub timestamp: i64,
    /// The built call.
    pub tx_object: TxObject,
    /// Whether the aggregator fell back to a default gas figure.
    #[serde(default)]
    pub used_default_gas: bool,
}

/// Query string of `swap/allRates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRatesQuery {
    /// Input token, lowercase `0x` hex.
    pub src: String,
    /// Output token, lowercase `0x` hex.
    pub dest: String,
    /// Input amount, decimal.
    pub src_amount: String,
    /// Integrator fee wallet.
    pub platform_wallet: String,
    /// Account that will send the swap.
    pub user_address: String,
}

/// Query string of `swap/buildTx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTxQuery {
    /// Input token, lowercase `0x` hex.
    pub src: String,
    /// Output token, lowercase `0x` hex.
    pub dest: String,
    /// Input amount, decimal.
    pub src_amount: String,
    /// Minimum acceptable output, decimal.
    pub min_dest_amount: String,
    /// Integrator fee wallet.
    pub platform_wallet: String,
    /// Account that will send the swap.
    pub user_address: String,
    /// Routing hint from the chosen rate.
    pub hint: String,
    /// Gas price in wei, empty to let the caller price gas.
    pub gas_price: String,
    /// Nonce the transaction will use.
    pub nonce: u64,
    /// Only sent when the balance check should be skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_balance_check: Option<bool>,
}
