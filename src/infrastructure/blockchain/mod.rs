//! # Blockchain Clients
//!
//! Chain access, gas limits, signing and receipt tracking for EVM chains.
//!
//! ## Available Components
//!
//! - [`ChainClient`]: Trait for the chain RPC calls the pipeline makes
//! - [`EthereumClient`]: JSON-RPC implementation using ethers-rs
//! - [`GasEstimator`]: Gas limit selection with buffer and ceiling
//! - [`TxSigner`]: Raw-key and keystore transaction signing
//! - [`KeystoreDir`]: Encrypted keystore lookup and decryption
//! - [`ReceiptWaiter`]: Receipt polling under a deadline

pub mod client;
pub mod ethereum;
pub mod gas;
pub mod keystore;
pub mod receipt;
pub mod signer;

pub use client::{BlockchainError, BlockchainResult, ChainClient, TxReceipt};
pub use ethereum::EthereumClient;
pub use gas::GasEstimator;
pub use keystore::KeystoreDir;
pub use receipt::ReceiptWaiter;
pub use signer::{KeystoreSigner, RawKeySigner, SignerError, SignerResult, TxSigner, signer_for};
