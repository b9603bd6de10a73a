//! # Configuration
//!
//! Run configuration loaded once at startup.
//!
//! Values come from a YAML, TOML or JSON file, overridden by environment
//! variables prefixed `SWAP_EXECUTOR__` with `__` as the nesting
//! separator (`SWAP_EXECUTOR__NODE_RPC`, `SWAP_EXECUTOR__ROUTE__FEE_TIER`).
//!
//! Every problem found here is fatal: no trade starts with an invalid
//! configuration.
//!
//! ```yaml
//! chain_id: 8453
//! node_rpc: "https://mainnet.base.org"
//! gas_price_endpoint: "https://gas.api.infura.io/networks/8453"
//! keystore_dir: "./keystore"
//! input_token: "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
//! output_token: "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
//! slippage_bps: 50
//! route:
//!   type: router
//!   address: "0x2626664c2603336e57b271c5c0b26f421741e481"
//!   wrapped_native: "0x4200000000000000000000000000000000000006"
//!   fee_tier: 500
//! accounts:
//!   - priv_key: "..."
//!     amount: "3000000000000000"
//! ```
//!
//! Addresses must be quoted so YAML does not read them as hex integers.

use crate::domain::entities::account::{Account, SigningMethod};
use crate::domain::entities::trade::TradeRequest;
use crate::domain::value_objects::enums::{BatchPolicy, NonceMode, RouterVersion};
use crate::domain::value_objects::slippage::BPS_DENOMINATOR;
use crate::infrastructure::encoding::MAX_FEE_TIER;
use crate::serialization::u256_dec;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SWAP_EXECUTOR";
/// Nesting separator of environment overrides.
pub const ENV_SEPARATOR: &str = "__";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file or environment could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates a validation error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// How swap calls are produced.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteConfig {
    /// Direct calls to a Uniswap V3 router.
    Router {
        /// Router contract.
        address: Address,
        /// Wrapped-native token substituted for the native sentinel.
        wrapped_native: Address,
        /// Pool fee tier in hundredths of a bip.
        #[serde(default = "default_fee_tier")]
        fee_tier: u32,
        /// Router ABI generation.
        #[serde(default)]
        version: RouterVersion,
        /// Seconds added to now for the v1 deadline.
        #[serde(default = "default_deadline_secs")]
        deadline_secs: u64,
    },
    /// Quotes and calls from the Krystal aggregator.
    Aggregator {
        /// API base URL.
        endpoint: String,
        /// Integrator fee wallet.
        platform_wallet: Address,
        /// Ask the aggregator to skip its balance check.
        #[serde(default)]
        skip_balance_check: bool,
    },
}

/// One configured account.
#[derive(Clone, PartialEq, Deserialize)]
pub struct AccountConfig {
    /// Keystore address. Ignored when `priv_key` is set.
    #[serde(default)]
    pub address: Option<Address>,
    /// Keystore passphrase.
    #[serde(default)]
    pub passphrase: Option<String>,
    /// Input amount.
    #[serde(deserialize_with = "u256_dec::deserialize")]
    pub amount: U256,
    /// Output recipient, defaults to the sender.
    #[serde(default)]
    pub recipient: Option<Address>,
    /// Absolute fee budget in wei.
    #[serde(default, deserialize_with = "u256_dec::option::deserialize")]
    pub max_gas_fee: Option<U256>,
    /// Account-specific minimum output.
    #[serde(default, deserialize_with = "u256_dec::option::deserialize")]
    pub min_return_amount: Option<U256>,
    /// Hex private key.
    #[serde(default)]
    pub priv_key: Option<String>,
}

impl AccountConfig {
    fn raw_key(&self) -> Option<&str> {
        self.priv_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn signing_method(&self, index: usize) -> Result<SigningMethod, ConfigError> {
        if let Some(key) = self.raw_key() {
            if self.address.is_some() {
                warn!(account = index, "address ignored, raw key determines the sender");
            }
            return Ok(SigningMethod::RawKey(key.to_string()));
        }

        match (self.address, self.passphrase.as_ref()) {
            (Some(address), Some(passphrase)) => Ok(SigningMethod::Keystore {
                address,
                passphrase: passphrase.clone(),
            }),
            _ => Err(ConfigError::invalid(format!(
                "account {}: needs priv_key, or address and passphrase",
                index
            ))),
        }
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("address", &self.address)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("amount", &self.amount)
            .field("recipient", &self.recipient)
            .field("max_gas_fee", &self.max_gas_fee)
            .field("min_return_amount", &self.min_return_amount)
            .field("priv_key", &self.priv_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Chain transactions are signed for.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub node_rpc: String,
    /// Fee oracle base URL.
    pub gas_price_endpoint: String,
    /// Directory of encrypted keystore files.
    #[serde(default = "default_keystore_dir")]
    pub keystore_dir: PathBuf,
    /// Input token, `0xeeee…eeee` for the native asset.
    pub input_token: Address,
    /// Output token.
    pub output_token: Address,
    /// Slippage tolerance in basis points.
    #[serde(default)]
    pub slippage_bps: u32,
    /// Multiplier for the quoted priority fee.
    #[serde(default = "default_tip_multiplier")]
    pub gas_tip_multiplier: f64,
    /// Gas limit override, `0` means estimate.
    #[serde(default)]
    pub gas_limit: u64,
    /// Default minimum output.
    #[serde(default, deserialize_with = "u256_dec::option::deserialize")]
    pub min_return_amount: Option<U256>,
    /// When to start the batch.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Nonce source.
    #[serde(default)]
    pub nonce_mode: NonceMode,
    /// Batch failure policy.
    #[serde(default)]
    pub batch_policy: BatchPolicy,
    /// Gas price cache lifetime.
    #[serde(default = "default_gas_price_ttl_ms")]
    pub gas_price_ttl_ms: u64,
    /// Deadline for everything up to broadcast.
    #[serde(default = "default_pre_submission_timeout_secs")]
    pub pre_submission_timeout_secs: u64,
    /// Deadline for the receipt after broadcast.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Receipt polling interval.
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// Timeout of fee oracle and aggregator requests.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    /// Route settings.
    pub route: RouteConfig,
    /// Accounts, in execution order.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

fn default_keystore_dir() -> PathBuf {
    PathBuf::from("keystore")
}

const fn default_tip_multiplier() -> f64 {
    1.0
}

const fn default_fee_tier() -> u32 {
    500
}

const fn default_deadline_secs() -> u64 {
    60
}

const fn default_gas_price_ttl_ms() -> u64 {
    1_000
}

const fn default_pre_submission_timeout_secs() -> u64 {
    30
}

const fn default_confirmation_timeout_secs() -> u64 {
    24
}

const fn default_receipt_poll_interval_ms() -> u64 {
    1_000
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

/// `SWAP_EXECUTOR__`-prefixed variables. Values are parsed as numbers and
/// booleans where possible so nested keys such as `route.fee_tier`
/// deserialize like their file counterparts.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

impl AppConfig {
    /// Loads and validates configuration from `path` and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the sources cannot be read or
    /// deserialized, `ConfigError::Invalid` if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path.as_ref(), environment())
    }

    fn load_with_env(path: &Path, env: config::Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges and cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::invalid("chain_id must be non-zero"));
        }
        if self.node_rpc.trim().is_empty() {
            return Err(ConfigError::invalid("node_rpc is required"));
        }
        if self.gas_price_endpoint.trim().is_empty() {
            return Err(ConfigError::invalid("gas_price_endpoint is required"));
        }
        if self.slippage_bps > BPS_DENOMINATOR {
            return Err(ConfigError::invalid(format!(
                "slippage_bps must be at most {}, got {}",
                BPS_DENOMINATOR, self.slippage_bps
            )));
        }
        if !self.gas_tip_multiplier.is_finite() || self.gas_tip_multiplier < 0.0 {
            return Err(ConfigError::invalid(format!(
                "gas_tip_multiplier must be a non-negative number, got {}",
                self.gas_tip_multiplier
            )));
        }
        if self.input_token == self.output_token {
            return Err(ConfigError::invalid("input_token and output_token are equal"));
        }
        if self.pre_submission_timeout_secs == 0 || self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::invalid("timeouts must be non-zero"));
        }
        if self.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::invalid("receipt_poll_interval_ms must be non-zero"));
        }

        match &self.route {
            RouteConfig::Router { fee_tier, .. } if *fee_tier > MAX_FEE_TIER => {
                return Err(ConfigError::invalid(format!(
                    "route.fee_tier {} does not fit in uint24",
                    fee_tier
                )));
            }
            RouteConfig::Aggregator { endpoint, .. } if endpoint.trim().is_empty() => {
                return Err(ConfigError::invalid("route.endpoint is required"));
            }
            _ => {}
        }

        if self.accounts.is_empty() {
            return Err(ConfigError::invalid("at least one account is required"));
        }
        for (index, account) in self.accounts.iter().enumerate() {
            if account.amount.is_zero() {
                return Err(ConfigError::invalid(format!(
                    "account {}: amount must be positive",
                    index
                )));
            }
            account.signing_method(index)?;
        }

        Ok(())
    }

    /// Builds the run-wide trade parameters.
    #[must_use]
    pub fn to_trade_request(&self) -> TradeRequest {
        let request = TradeRequest::new(self.chain_id, self.input_token, self.output_token)
            .with_slippage_bps(self.slippage_bps)
            .with_gas_tip_multiplier(self.gas_tip_multiplier)
            .with_gas_limit_override(self.gas_limit)
            .with_nonce_mode(self.nonce_mode)
            .with_timeouts(
                Duration::from_secs(self.pre_submission_timeout_secs),
                Duration::from_secs(self.confirmation_timeout_secs),
            );
        match self.min_return_amount {
            Some(amount) => request.with_min_return_amount(amount),
            None => request,
        }
    }

    /// Builds the accounts in configuration order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if an account has no usable signing
    /// method.
    pub fn to_accounts(&self) -> Result<Vec<Account>, ConfigError> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let mut account =
                    Account::new(index, config.signing_method(index)?, config.amount);
                if let Some(recipient) = config.recipient {
                    account = account.with_recipient(recipient);
                }
                if let Some(budget) = config.max_gas_fee {
                    account = account.with_max_gas_fee(budget);
                }
                if let Some(floor) = config.min_return_amount {
                    account = account.with_min_return_amount(floor);
                }
                Ok(account)
            })
            .collect()
    }

    /// Returns the gas price cache lifetime.
    #[must_use]
    pub fn gas_price_ttl(&self) -> Duration {
        Duration::from_millis(self.gas_price_ttl_ms)
    }

    /// Returns the receipt polling interval.
    #[must_use]
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}
