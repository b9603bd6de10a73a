//! # Serialization Helpers
//!
//! Serde helpers for arbitrary-precision token amounts.
//!
//! Amounts in configuration files routinely exceed `u64`, so they are
//! accepted as plain integers, decimal strings or `0x` hex strings.
//!
//! ```text
//! amount: 3000000000000000          # integer
//! amount: "3000000000000000000000"  # decimal string
//! amount: "0xaa87bee538000"         # hex string
//! ```

use ethers::types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Parses a decimal or `0x` hex amount.
///
/// # Errors
///
/// Returns a message describing the rejected input.
pub fn parse_u256(input: &str) -> Result<U256, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty amount".to_string());
    }

    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(trimmed).ok(),
    };
    parsed.ok_or_else(|| format!("invalid amount: {}", input))
}

struct U256Visitor;

impl Visitor<'_> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, decimal string or 0x hex string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<U256, E> {
        Ok(U256::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<U256, E> {
        Ok(U256::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<U256, E> {
        u64::try_from(value)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative amount: {}", value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<U256, E> {
        parse_u256(value).map_err(E::custom)
    }
}

/// Deserializes a required amount.
///
/// Use with `#[serde(deserialize_with = "u256_dec::deserialize")]`.
pub mod u256_dec {
    use super::*;

    /// Deserializes a [`U256`] from an integer or string.
    ///
    /// # Errors
    ///
    /// Fails for negative numbers or malformed strings.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(U256Visitor)
    }

    /// Deserializes an optional amount.
    pub mod option {
        use super::*;

        /// Deserializes an `Option<U256>`. Missing, null and empty string
        /// all map to `None`.
        ///
        /// # Errors
        ///
        /// Fails for negative numbers or malformed strings.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Number(u64),
                Text(String),
            }

            match Option::<Raw>::deserialize(deserializer)? {
                None => Ok(None),
                Some(Raw::Number(n)) => Ok(Some(U256::from(n))),
                Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
                Some(Raw::Text(s)) => parse_u256(&s).map(Some).map_err(de::Error::custom),
            }
        }
    }
}
