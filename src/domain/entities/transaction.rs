//! # Transactions
//!
//! The unsigned swap call and the signed fee-market transaction built
//! from it. Both are created fresh for every trade attempt.

use crate::domain::value_objects::fees::FeeCaps;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, H256, Signature, SignatureError, U256,
};
use ethers::utils::keccak256;

/// A contract call to be wrapped in a transaction.
///
/// Produced by direct ABI encoding or by the aggregator's build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCall {
    /// Sending account.
    pub from: Address,
    /// Destination contract.
    pub to: Address,
    /// Native value attached to the call, in wei.
    pub value: U256,
    /// ABI-encoded call data.
    pub data: Bytes,
}

impl UnsignedCall {
    /// Assembles a dynamic-fee transaction around this call.
    #[must_use]
    pub fn to_fee_market_tx(
        &self,
        chain_id: u64,
        nonce: u64,
        gas_limit: u64,
        fees: &FeeCaps,
    ) -> Eip1559TransactionRequest {
        Eip1559TransactionRequest::new()
            .from(self.from)
            .to(self.to)
            .value(self.value)
            .data(self.data.clone())
            .chain_id(chain_id)
            .nonce(nonce)
            .gas(gas_limit)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
    }
}

/// A signed dynamic-fee transaction ready for broadcast.
///
/// The hash is derived from the signed RLP encoding and is the handle used
/// to track the transaction on chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    /// The signed transaction body.
    tx: Eip1559TransactionRequest,
    /// Signature over the chain-scoped signing hash.
    signature: Signature,
    /// Signed RLP encoding, as broadcast.
    raw: Bytes,
    /// Transaction hash.
    hash: H256,
}

impl SignedTransaction {
    /// Binds a transaction body and its signature.
    #[must_use]
    pub fn new(tx: Eip1559TransactionRequest, signature: Signature) -> Self {
        let typed = TypedTransaction::Eip1559(tx.clone());
        let raw = typed.rlp_signed(&signature);
        let hash = H256::from(keccak256(&raw));

        Self {
            tx,
            signature,
            raw,
            hash,
        }
    }

    /// Returns the transaction hash.
    #[inline]
    #[must_use]
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Returns the signed RLP encoding.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the signed transaction body.
    #[inline]
    #[must_use]
    pub fn request(&self) -> &Eip1559TransactionRequest {
        &self.tx
    }

    /// Returns the chain id the signature is bound to.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.tx.chain_id.map(|id| id.as_u64()).unwrap_or_default()
    }

    /// Returns the nonce.
    #[must_use]
    pub fn nonce(&self) -> U256 {
        self.tx.nonce.unwrap_or_default()
    }

    /// Returns the gas limit.
    #[must_use]
    pub fn gas_limit(&self) -> U256 {
        self.tx.gas.unwrap_or_default()
    }

    /// Returns the fee caps.
    #[must_use]
    pub fn fee_caps(&self) -> FeeCaps {
        FeeCaps {
            max_fee_per_gas: self.tx.max_fee_per_gas.unwrap_or_default(),
            max_priority_fee_per_gas: self.tx.max_priority_fee_per_gas.unwrap_or_default(),
        }
    }

    /// Returns the destination address.
    #[must_use]
    pub fn to(&self) -> Option<Address> {
        self.tx.to.as_ref().and_then(|to| to.as_address().copied())
    }

    /// Returns the attached native value.
    #[must_use]
    pub fn value(&self) -> U256 {
        self.tx.value.unwrap_or_default()
    }

    /// Returns the call data.
    #[must_use]
    pub fn data(&self) -> Bytes {
        self.tx.data.clone().unwrap_or_default()
    }

    /// Recovers the signing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not recover to a valid key.
    pub fn sender(&self) -> Result<Address, SignatureError> {
        let typed = TypedTransaction::Eip1559(self.tx.clone());
        self.signature.recover(typed.sighash())
    }
}
