//! # Account
//!
//! A trading account and how it signs.
//!
//! Signing mode is a tagged variant: a raw private key, or a
//! passphrase-protected keystore entry. A raw key always determines the
//! sending address; any configured address is ignored in that mode.

use ethers::types::{Address, U256};
use std::fmt;

/// How an account signs transactions.
///
/// `Debug` never prints key material or passphrases.
#[derive(Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// Hex-encoded secp256k1 private key. Parsed when the signer is built,
    /// so a malformed key fails only this account.
    RawKey(String),
    /// Encrypted keystore entry unlocked with a passphrase.
    Keystore {
        /// Address of the keystore entry.
        address: Address,
        /// Passphrase protecting the entry.
        passphrase: String,
    },
}

impl SigningMethod {
    /// Returns the configured address for keystore accounts.
    ///
    /// Raw-key accounts derive their address from the key instead.
    #[must_use]
    pub fn keystore_address(&self) -> Option<Address> {
        match self {
            Self::RawKey(_) => None,
            Self::Keystore { address, .. } => Some(*address),
        }
    }

    /// Returns a short name for the signing mode.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RawKey(_) => "raw_key",
            Self::Keystore { .. } => "keystore",
        }
    }
}

impl fmt::Debug for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RawKey(_) => f.write_str("RawKey(<redacted>)"),
            Self::Keystore { address, .. } => f
                .debug_struct("Keystore")
                .field("address", address)
                .field("passphrase", &"<redacted>")
                .finish(),
        }
    }
}

/// A configured trading account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Position in the configured account list.
    index: usize,
    /// Signing mode and key material.
    signing: SigningMethod,
    /// Amount of the input token to swap.
    input_amount: U256,
    /// Recipient of the swap output, defaults to the sender.
    recipient: Option<Address>,
    /// Absolute budget for the whole transaction fee in wei.
    max_gas_fee: Option<U256>,
    /// Account-specific minimum acceptable output.
    min_return_amount: Option<U256>,
}

impl Account {
    /// Creates an account.
    #[must_use]
    pub fn new(index: usize, signing: SigningMethod, input_amount: U256) -> Self {
        Self {
            index,
            signing,
            input_amount,
            recipient: None,
            max_gas_fee: None,
            min_return_amount: None,
        }
    }

    /// Sets the recipient override.
    #[must_use]
    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Sets the absolute fee budget in wei.
    #[must_use]
    pub fn with_max_gas_fee(mut self, max_gas_fee: U256) -> Self {
        self.max_gas_fee = Some(max_gas_fee);
        self
    }

    /// Sets the account-specific minimum output.
    #[must_use]
    pub fn with_min_return_amount(mut self, min_return_amount: U256) -> Self {
        self.min_return_amount = Some(min_return_amount);
        self
    }

    /// Returns the position in the configured account list.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the signing method.
    #[inline]
    #[must_use]
    pub fn signing(&self) -> &SigningMethod {
        &self.signing
    }

    /// Returns the input amount.
    #[inline]
    #[must_use]
    pub fn input_amount(&self) -> U256 {
        self.input_amount
    }

    /// Returns the recipient override, if any.
    #[inline]
    #[must_use]
    pub fn recipient(&self) -> Option<Address> {
        self.recipient
    }

    /// Returns the absolute fee budget, if any.
    #[inline]
    #[must_use]
    pub fn max_gas_fee(&self) -> Option<U256> {
        self.max_gas_fee
    }

    /// Returns the account-specific minimum output, if any.
    #[inline]
    #[must_use]
    pub fn min_return_amount(&self) -> Option<U256> {
        self.min_return_amount
    }

    /// Returns the swap recipient for a given sender.
    #[must_use]
    pub fn effective_recipient(&self, sender: Address) -> Address {
        self.recipient.unwrap_or(sender)
    }

    /// Returns a log label for the account.
    ///
    /// Keystore accounts are labelled by address; raw-key accounts by
    /// position, since their address is only known once the key is parsed.
    #[must_use]
    pub fn label(&self) -> String {
        match self.signing.keystore_address() {
            Some(address) => format!("{:?}", address),
            None => format!("account-{}", self.index),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keystore_account() -> Account {
        let address: Address = "0x719911dCe2e792b93D74370c188f0E4AEc0860ec".parse().unwrap();
        Account::new(
            0,
            SigningMethod::Keystore {
                address,
                passphrase: "hunter2".to_string(),
            },
            U256::from(3_000_000_000_000_000u64),
        )
    }

    #[test]
    fn debug_redacts_secrets() {
        let raw = SigningMethod::RawKey("deadbeef".to_string());
        assert_eq!(format!("{:?}", raw), "RawKey(<redacted>)");

        let account = keystore_account();
        let debug = format!("{:?}", account);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn recipient_defaults_to_sender() {
        let account = keystore_account();
        let sender = account.signing().keystore_address().unwrap();
        assert_eq!(account.effective_recipient(sender), sender);

        let other: Address = "0x0000000000000000000111111111111111111111".parse().unwrap();
        let account = account.with_recipient(other);
        assert_eq!(account.effective_recipient(sender), other);
    }

    #[test]
    fn label_uses_address_or_index() {
        assert_eq!(
            keystore_account().label(),
            "0x719911dce2e792b93d74370c188f0e4aec0860ec"
        );
        let raw = Account::new(3, SigningMethod::RawKey("01".into()), U256::one());
        assert_eq!(raw.label(), "account-3");
        assert_eq!(raw.signing().kind(), "raw_key");
    }
}
