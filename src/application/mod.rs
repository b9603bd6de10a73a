//! # Application
//!
//! Orchestration of the trade pipeline over the domain and
//! infrastructure layers.

pub mod bootstrap;
pub mod error;
pub mod outcome;
pub mod services;

pub use bootstrap::{App, BootstrapError, build};
pub use error::{TradeError, TradeResult};
pub use outcome::{AccountReport, BatchReport, TradeOutcome};
pub use services::{Scheduler, SchedulerError, SwapRoute, TradeExecutor};
