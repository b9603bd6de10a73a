//! # Domain Entities
//!
//! - [`Account`]: a trading account and its [`SigningMethod`]
//! - [`TradeRequest`]: run-wide swap parameters and [`TradeStage`]s
//! - [`GasQuote`]: fee oracle suggestion
//! - [`UnsignedCall`] / [`SignedTransaction`]: per-attempt transactions

pub mod account;
pub mod gas_quote;
pub mod trade;
pub mod transaction;

pub use account::{Account, SigningMethod};
pub use gas_quote::GasQuote;
pub use trade::{MAX_GAS_LIMIT, TradeRequest, TradeStage};
pub use transaction::{SignedTransaction, UnsignedCall};
