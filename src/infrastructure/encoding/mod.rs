//! # Call Encoding
//!
//! Pure ABI encoding of swap calls for direct router execution.

pub mod uniswap_v3;

pub use uniswap_v3::{
    DirectRouter, EncodingError, EncodingResult, ExactInputSingle, MAX_FEE_TIER, SwapEncoder,
};
