//! # Uniswap V3 Router Encoding
//!
//! ABI encoding of single-hop `exactInputSingle` swaps for the two router
//! generations:
//!
//! - `v1` (SwapRouter): parameter tuple carries a `deadline`
//! - `v2` (SwapRouter02): no deadline in the tuple
//!
//! The ABI function is built once when the encoder is created and owned
//! by it; encoding itself is pure.

use crate::domain::entities::transaction::UnsignedCall;
use crate::domain::value_objects::enums::RouterVersion;
use crate::domain::value_objects::tokens::{is_native, router_token};
use ethers::abi::{Function, Param, ParamType, StateMutability, Token};
use ethers::types::{Address, Bytes, U256};
use thiserror::Error;

/// Largest value a `uint24` fee tier can hold.
pub const MAX_FEE_TIER: u32 = 0x00FF_FFFF;

/// Error type for swap call encoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// Fee tier does not fit in `uint24`.
    #[error("fee tier {0} exceeds uint24")]
    FeeTierOutOfRange(u32),

    /// The router version requires a deadline and none was given.
    #[error("router {0} requires a deadline")]
    MissingDeadline(RouterVersion),

    /// The ABI rejected the parameter tuple.
    #[error("abi encoding failed: {0}")]
    Abi(String),
}

/// Result type for encoding.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Parameters of one `exactInputSingle` call, already in router terms
/// (no native sentinel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingle {
    /// Token sold.
    pub token_in: Address,
    /// Token bought.
    pub token_out: Address,
    /// Pool fee tier in hundredths of a basis point.
    pub fee: u32,
    /// Receiver of the output.
    pub recipient: Address,
    /// Exact input amount.
    pub amount_in: U256,
    /// Minimum acceptable output.
    pub amount_out_minimum: U256,
    /// Unix deadline, only encoded for v1 routers.
    pub deadline: Option<u64>,
}

/// Encoder for one router version.
#[derive(Debug, Clone)]
pub struct SwapEncoder {
    version: RouterVersion,
    function: Function,
}

impl SwapEncoder {
    /// Creates the encoder for `version`.
    #[must_use]
    pub fn new(version: RouterVersion) -> Self {
        Self {
            version,
            function: exact_input_single(version),
        }
    }

    /// Returns the router version.
    #[must_use]
    pub fn version(&self) -> RouterVersion {
        self.version
    }

    /// Returns the 4-byte function selector.
    #[must_use]
    pub fn selector(&self) -> [u8; 4] {
        self.function.short_signature()
    }

    /// Encodes the call data.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee tier overflows `uint24`, a v1 deadline
    /// is missing, or the ABI rejects the tuple.
    pub fn encode(&self, params: &ExactInputSingle) -> EncodingResult<Bytes> {
        if params.fee > MAX_FEE_TIER {
            return Err(EncodingError::FeeTierOutOfRange(params.fee));
        }

        let mut fields = vec![
            Token::Address(params.token_in),
            Token::Address(params.token_out),
            Token::Uint(U256::from(params.fee)),
            Token::Address(params.recipient),
        ];
        if self.version.requires_deadline() {
            let deadline = params
                .deadline
                .ok_or(EncodingError::MissingDeadline(self.version))?;
            fields.push(Token::Uint(U256::from(deadline)));
        }
        fields.extend([
            Token::Uint(params.amount_in),
            Token::Uint(params.amount_out_minimum),
            // no price limit
            Token::Uint(U256::zero()),
        ]);

        self.function
            .encode_input(&[Token::Tuple(fields)])
            .map(Bytes::from)
            .map_err(|e| EncodingError::Abi(e.to_string()))
    }
}

fn param(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

/// `exactInputSingle(ExactInputSingleParams)`; v1 routers carry a
/// `deadline` word between recipient and amount.
#[allow(deprecated)]
fn exact_input_single(version: RouterVersion) -> Function {
    let mut tuple = vec![
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(24),
        ParamType::Address,
    ];
    if version.requires_deadline() {
        tuple.push(ParamType::Uint(256));
    }
    tuple.extend([
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(160),
    ]);

    Function {
        name: "exactInputSingle".to_string(),
        inputs: vec![param("params", ParamType::Tuple(tuple))],
        outputs: vec![param("amountOut", ParamType::Uint(256))],
        constant: None,
        state_mutability: StateMutability::Payable,
    }
}

/// Direct swaps against a single Uniswap V3 router.
#[derive(Debug, Clone)]
pub struct DirectRouter {
    router: Address,
    wrapped_native: Address,
    fee_tier: u32,
    deadline_secs: u64,
    encoder: SwapEncoder,
}

impl DirectRouter {
    /// Creates a direct route.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError::FeeTierOutOfRange` for an oversized fee tier.
    pub fn new(
        router: Address,
        wrapped_native: Address,
        fee_tier: u32,
        version: RouterVersion,
        deadline_secs: u64,
    ) -> EncodingResult<Self> {
        if fee_tier > MAX_FEE_TIER {
            return Err(EncodingError::FeeTierOutOfRange(fee_tier));
        }
        Ok(Self {
            router,
            wrapped_native,
            fee_tier,
            deadline_secs,
            encoder: SwapEncoder::new(version),
        })
    }

    /// Returns the router address.
    #[must_use]
    pub fn router(&self) -> Address {
        self.router
    }

    /// Returns the encoder.
    #[must_use]
    pub fn encoder(&self) -> &SwapEncoder {
        &self.encoder
    }

    /// Builds the unsigned router call.
    ///
    /// The native sentinel is replaced by the wrapped-native token in the
    /// encoded tuple. Only a native input attaches `amount_in` as value.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if encoding fails.
    #[allow(clippy::too_many_arguments)]
    pub fn build_call(
        &self,
        from: Address,
        token_in: Address,
        token_out: Address,
        recipient: Address,
        amount_in: U256,
        amount_out_minimum: U256,
        now_unix: u64,
    ) -> EncodingResult<UnsignedCall> {
        let params = ExactInputSingle {
            token_in: router_token(&token_in, &self.wrapped_native),
            token_out: router_token(&token_out, &self.wrapped_native),
            fee: self.fee_tier,
            recipient,
            amount_in,
            amount_out_minimum,
            deadline: Some(now_unix.saturating_add(self.deadline_secs)),
        };
        let data = self.encoder.encode(&params)?;
        let value = if is_native(&token_in) {
            amount_in
        } else {
            U256::zero()
        };

        Ok(UnsignedCall {
            from,
            to: self.router,
            value,
            data,
        })
    }
}
