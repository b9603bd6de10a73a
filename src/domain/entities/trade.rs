//! # Trade Request
//!
//! Run-wide swap parameters shared by every account, and the stages a
//! single trade moves through.

use crate::domain::entities::account::Account;
use crate::domain::value_objects::enums::NonceMode;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Hard ceiling for any gas limit the pipeline will sign.
pub const MAX_GAS_LIMIT: u64 = 20_000_000;

/// Immutable per-run trade parameters.
///
/// The input amount lives on each [`Account`]; everything else is shared.
/// Route-specific settings (router, fee tier, aggregator identity) belong
/// to the executor's route.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    /// Chain the transactions are signed for.
    pub chain_id: u64,
    /// Input token (or the native sentinel).
    pub token_in: Address,
    /// Output token (or the native sentinel).
    pub token_out: Address,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u32,
    /// Multiplier applied to the quoted priority fee.
    pub gas_tip_multiplier: f64,
    /// Gas limit override, `0` means estimate.
    pub gas_limit_override: u64,
    /// Default minimum output when the account sets none.
    pub min_return_amount: Option<U256>,
    /// Nonce source.
    pub nonce_mode: NonceMode,
    /// Budget for everything up to and including broadcast.
    pub pre_submission_timeout: Duration,
    /// Budget for observing the receipt after broadcast.
    pub confirmation_timeout: Duration,
}

impl TradeRequest {
    /// Default pre-submission budget.
    pub const DEFAULT_PRE_SUBMISSION_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default confirmation budget.
    pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(24);

    /// Creates a request with default tuning.
    #[must_use]
    pub fn new(chain_id: u64, token_in: Address, token_out: Address) -> Self {
        Self {
            chain_id,
            token_in,
            token_out,
            slippage_bps: 0,
            gas_tip_multiplier: 1.0,
            gas_limit_override: 0,
            min_return_amount: None,
            nonce_mode: NonceMode::default(),
            pre_submission_timeout: Self::DEFAULT_PRE_SUBMISSION_TIMEOUT,
            confirmation_timeout: Self::DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    /// Sets the slippage tolerance.
    #[must_use]
    pub fn with_slippage_bps(mut self, bps: u32) -> Self {
        self.slippage_bps = bps;
        self
    }

    /// Sets the priority fee multiplier.
    #[must_use]
    pub fn with_gas_tip_multiplier(mut self, multiplier: f64) -> Self {
        self.gas_tip_multiplier = multiplier;
        self
    }

    /// Sets the gas limit override, clamped to [`MAX_GAS_LIMIT`].
    #[must_use]
    pub fn with_gas_limit_override(mut self, gas_limit: u64) -> Self {
        self.gas_limit_override = gas_limit.min(MAX_GAS_LIMIT);
        self
    }

    /// Sets the default minimum output.
    #[must_use]
    pub fn with_min_return_amount(mut self, amount: U256) -> Self {
        self.min_return_amount = Some(amount);
        self
    }

    /// Sets the nonce source.
    #[must_use]
    pub fn with_nonce_mode(mut self, mode: NonceMode) -> Self {
        self.nonce_mode = mode;
        self
    }

    /// Sets both deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, pre_submission: Duration, confirmation: Duration) -> Self {
        self.pre_submission_timeout = pre_submission;
        self.confirmation_timeout = confirmation;
        self
    }

    /// Returns the explicit minimum-output floor for an account.
    ///
    /// The account's own floor takes precedence over the run default.
    #[must_use]
    pub fn min_return_floor(&self, account: &Account) -> Option<U256> {
        account.min_return_amount().or(self.min_return_amount)
    }
}

/// Stages of the trade state machine, in order.
///
/// Stages only move forward; any failure ends the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStage {
    /// Nothing done yet.
    Start,
    /// Recipient, minimum output and route are known.
    RouteResolved,
    /// Account nonce fetched.
    NonceFetched,
    /// Unsigned call built.
    Encoded,
    /// Gas limit and fee caps set.
    GasPriced,
    /// Transaction signed, hash known.
    Signed,
    /// Transaction broadcast.
    Submitted,
    /// Mined with success status.
    Confirmed,
    /// Mined with failure status.
    Reverted,
}

impl fmt::Display for TradeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::RouteResolved => "route_resolved",
            Self::NonceFetched => "nonce_fetched",
            Self::Encoded => "encoded",
            Self::GasPriced => "gas_priced",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Reverted => "reverted",
        };
        f.write_str(name)
    }
}
