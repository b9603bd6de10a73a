//! # HTTP
//!
//! Shared HTTP plumbing for the external fee oracle and swap aggregator.

pub mod client;
pub mod error;

pub use client::{HttpClient, join_url};
pub use error::{HttpError, HttpResult};
