//! # Swap Executor
//!
//! Scheduled, multi-account token swaps on EVM chains.
//!
//! For every configured account the pipeline resolves a route (a direct
//! Uniswap V3 router call or an aggregator quote), fetches the nonce,
//! prices gas with per-account fee caps, signs with a raw key or an
//! encrypted keystore entry, broadcasts and waits for the receipt.
//! Accounts run concurrently and fail independently.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  application   Scheduler → TradeExecutor         │
//! ├──────────────────────────────────────────────────┤
//! │  domain        Account, TradeRequest, FeeCaps,   │
//! │                slippage, SignedTransaction       │
//! ├──────────────────────────────────────────────────┤
//! │  infrastructure  chain RPC, signers, fee oracle, │
//! │                  router encoding, aggregator     │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod serialization;

#[cfg(test)]
mod test_support;
