//! # Application Services
//!
//! - [`TradeExecutor`]: one account's swap, from route to receipt
//! - [`Scheduler`]: concurrent batch over all accounts

pub mod scheduler;
pub mod trade_executor;

pub use scheduler::{Scheduler, SchedulerError};
pub use trade_executor::{SwapRoute, TradeExecutor};
