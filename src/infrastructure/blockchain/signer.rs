//! # Transaction Signers
//!
//! Signs dynamic-fee transactions with either a raw private key or an
//! encrypted keystore entry.
//!
//! Both variants produce identical [`SignedTransaction`]s; only the way
//! the key is obtained differs.

use super::keystore::KeystoreDir;
use crate::domain::entities::account::SigningMethod;
use crate::domain::entities::transaction::SignedTransaction;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error type for key handling and signing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// Key material could not be parsed, located or decrypted.
    #[error("key error: {0}")]
    Key(String),

    /// The signing operation itself failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl SignerError {
    /// Creates a key error.
    #[must_use]
    pub fn key(msg: impl Into<String>) -> Self {
        Self::Key(msg.into())
    }

    /// Creates a signing error.
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }
}

/// Result type for signer operations.
pub type SignerResult<T> = Result<T, SignerError>;

/// Signs transactions for one account.
#[async_trait]
pub trait TxSigner: Send + Sync + fmt::Debug {
    /// Returns the sending address.
    fn address(&self) -> Address;

    /// Signs a dynamic-fee transaction for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::Key` if the key cannot be obtained, or
    /// `SignerError::Signing` if signing fails.
    async fn sign(
        &self,
        tx: Eip1559TransactionRequest,
        chain_id: u64,
    ) -> SignerResult<SignedTransaction>;
}

fn sign_with(
    wallet: &LocalWallet,
    tx: Eip1559TransactionRequest,
    chain_id: u64,
) -> SignerResult<SignedTransaction> {
    if let Some(from) = tx.from.filter(|from| *from != wallet.address()) {
        return Err(SignerError::signing(format!(
            "transaction sender {:?} does not match key {:?}",
            from,
            wallet.address()
        )));
    }

    let tx = tx.chain_id(chain_id);
    let wallet = wallet.clone().with_chain_id(chain_id);
    let signature = wallet
        .sign_transaction_sync(&TypedTransaction::Eip1559(tx.clone()))
        .map_err(|e| SignerError::signing(e.to_string()))?;

    Ok(SignedTransaction::new(tx, signature))
}

/// Signer holding a decoded private key.
#[derive(Clone)]
pub struct RawKeySigner {
    wallet: LocalWallet,
}

impl RawKeySigner {
    /// Parses a hex private key, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::Key` if the key is not a valid secp256k1 scalar.
    pub fn from_hex(key: &str) -> SignerResult<Self> {
        let trimmed = key.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let wallet = hex
            .parse::<LocalWallet>()
            .map_err(|_| SignerError::key("invalid private key"))?;
        Ok(Self { wallet })
    }
}

impl fmt::Debug for RawKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawKeySigner")
            .field("address", &self.wallet.address())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TxSigner for RawKeySigner {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    async fn sign(
        &self,
        tx: Eip1559TransactionRequest,
        chain_id: u64,
    ) -> SignerResult<SignedTransaction> {
        sign_with(&self.wallet, tx, chain_id)
    }
}

/// Signer that unlocks a keystore entry for each signature.
///
/// The decrypted key lives only for the duration of one `sign` call.
pub struct KeystoreSigner {
    address: Address,
    passphrase: String,
    keystore: Arc<KeystoreDir>,
}

impl KeystoreSigner {
    /// Creates a signer for the keystore entry of `address`.
    #[must_use]
    pub fn new(address: Address, passphrase: String, keystore: Arc<KeystoreDir>) -> Self {
        Self {
            address,
            passphrase,
            keystore,
        }
    }
}

impl fmt::Debug for KeystoreSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreSigner")
            .field("address", &self.address)
            .field("keystore", &self.keystore.dir())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TxSigner for KeystoreSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(
        &self,
        tx: Eip1559TransactionRequest,
        chain_id: u64,
    ) -> SignerResult<SignedTransaction> {
        let wallet = self
            .keystore
            .unlock(self.address, self.passphrase.clone())
            .await?;
        sign_with(&wallet, tx, chain_id)
    }
}

/// Builds the signer for an account's signing method.
///
/// # Errors
///
/// Returns `SignerError::Key` if a raw key is malformed. Keystore entries
/// are only located and decrypted when signing.
pub fn signer_for(
    method: &SigningMethod,
    keystore: &Arc<KeystoreDir>,
) -> SignerResult<Arc<dyn TxSigner>> {
    match method {
        SigningMethod::RawKey(key) => Ok(Arc::new(RawKeySigner::from_hex(key)?)),
        SigningMethod::Keystore {
            address,
            passphrase,
        } => Ok(Arc::new(KeystoreSigner::new(
            *address,
            passphrase.clone(),
            Arc::clone(keystore),
        ))),
    }
}
