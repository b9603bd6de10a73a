//! # Gas Pricing
//!
//! Fee-market price suggestions for swap transactions.
//!
//! - [`GasPricer`]: source of suggestions
//! - [`MetamaskGasPricer`]: HTTP fee oracle backend
//! - [`CachingGasPricer`]: TTL cache shared by all account pipelines

pub mod cache;
pub mod metamask;
pub mod traits;

pub use cache::CachingGasPricer;
pub use metamask::{MetamaskGasPricer, SuggestedGasFees};
pub use traits::{GasPriceError, GasPriceResult, GasPricer};
