//! # Value Objects
//!
//! Immutable values and pure computations used by the trade pipeline.
//!
//! - [`enums`]: nonce source, batch policy and router version choices
//! - [`fees`]: gwei/wei conversion and dynamic-fee caps
//! - [`slippage`]: minimum-output computation
//! - [`tokens`]: native-asset sentinel handling

pub mod enums;
pub mod fees;
pub mod slippage;
pub mod tokens;

pub use enums::{BatchPolicy, NonceMode, ParseEnumError, RouterVersion};
pub use fees::{FeeCaps, FeeError, FeeResult, gwei_to_wei};
pub use slippage::{BPS_DENOMINATOR, apply_slippage, effective_min_return};
pub use tokens::{NATIVE_TOKEN, hex_address, is_native, router_token};
