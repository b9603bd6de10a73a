//! # Token Identifiers
//!
//! Native-asset handling for swap encoding.
//!
//! Aggregators and configuration use the sentinel address
//! `0xeeee…eeee` for the chain's native asset. Routers only understand
//! ERC-20s, so the wrapped-native address is substituted when encoding.

use ethers::types::{Address, H160};

/// Sentinel address standing for the chain's native asset.
pub const NATIVE_TOKEN: Address = H160([0xee; 20]);

/// Returns true if `token` is the native-asset sentinel.
#[inline]
#[must_use]
pub fn is_native(token: &Address) -> bool {
    *token == NATIVE_TOKEN
}

/// Maps a token to the address a router ABI expects.
///
/// The native sentinel becomes `wrapped_native`; any other token passes
/// through unchanged.
///
/// # Examples
///
/// ```
/// use ethers::types::Address;
/// use swap_executor::domain::value_objects::tokens::{NATIVE_TOKEN, router_token};
///
/// let weth: Address = "0x4200000000000000000000000000000000000006".parse().unwrap();
/// assert_eq!(router_token(&NATIVE_TOKEN, &weth), weth);
/// ```
#[inline]
#[must_use]
pub fn router_token(token: &Address, wrapped_native: &Address) -> Address {
    if is_native(token) {
        *wrapped_native
    } else {
        *token
    }
}

/// Formats an address as full lowercase `0x` hex.
///
/// `Display` on fixed hashes abbreviates the middle, which is useless in
/// query strings and log lines.
#[must_use]
pub fn hex_address(address: &Address) -> String {
    format!("{:?}", address)
}
