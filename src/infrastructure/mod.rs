//! # Infrastructure
//!
//! Adapters to the outside world: chain RPC, signing, the fee oracle, the
//! swap aggregator and shared HTTP plumbing.

pub mod aggregator;
pub mod blockchain;
pub mod encoding;
pub mod gas_pricing;
pub mod http;
pub mod retry;
