//! # Swap Aggregator
//!
//! Route quoting and call building through an external aggregator.

pub mod api_types;
pub mod krystal;

pub use api_types::{BuildTxResponse, Rate, RatesResponse, TxObject};
pub use krystal::{
    AggregatorError, AggregatorResult, BuildTxRequest, KrystalClient, RateRequest, SwapQuoter,
    best_rate,
};
