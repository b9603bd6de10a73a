//! # Keystore Directory
//!
//! Locates and decrypts Web3 Secret Storage files in a directory.
//!
//! Entries are matched to an address either by the `address` field in the
//! JSON body or by a geth-style `UTC--<timestamp>--<address>` file name.
//! Decryption runs scrypt and is moved off the async runtime.

use super::signer::{SignerError, SignerResult};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// The part of a keystore file needed to identify its owner.
#[derive(Debug, Deserialize)]
struct KeystoreHeader {
    #[serde(default)]
    address: Option<String>,
}

/// A directory of encrypted keystore files.
#[derive(Debug)]
pub struct KeystoreDir {
    dir: PathBuf,
    /// Address to file, filled by directory scans.
    index: Mutex<HashMap<Address, PathBuf>>,
}

impl KeystoreDir {
    /// Creates a handle for `dir`. The directory is read lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Finds the keystore file for `address`, rescanning on a miss.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::Key` if the directory cannot be read or holds
    /// no entry for the address.
    pub fn locate(&self, address: Address) -> SignerResult<PathBuf> {
        if let Some(path) = self.index.lock().get(&address) {
            return Ok(path.clone());
        }

        let found = self.scan()?;
        let mut index = self.index.lock();
        index.extend(found);
        index
            .get(&address)
            .cloned()
            .ok_or_else(|| SignerError::key(format!("no keystore entry for {:?}", address)))
    }

    /// Decrypts the entry for `address`.
    ///
    /// Blocking: runs scrypt. Use [`KeystoreDir::unlock`] from async code.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::Key` if the entry is missing, the passphrase
    /// is wrong, or the decrypted key belongs to another address.
    pub fn decrypt(&self, address: Address, passphrase: &str) -> SignerResult<LocalWallet> {
        let path = self.locate(address)?;
        let wallet = LocalWallet::decrypt_keystore(&path, passphrase)
            .map_err(|e| SignerError::key(format!("cannot decrypt {}: {e}", path.display())))?;

        if wallet.address() != address {
            return Err(SignerError::key(format!(
                "keystore {} holds {:?}, not {:?}",
                path.display(),
                wallet.address(),
                address
            )));
        }
        Ok(wallet)
    }

    /// Decrypts the entry for `address` on the blocking pool.
    ///
    /// # Errors
    ///
    /// Same as [`KeystoreDir::decrypt`], plus `SignerError::Key` if the
    /// blocking task is cancelled.
    pub async fn unlock(
        self: &Arc<Self>,
        address: Address,
        passphrase: String,
    ) -> SignerResult<LocalWallet> {
        let keystore = Arc::clone(self);
        tokio::task::spawn_blocking(move || keystore.decrypt(address, &passphrase))
            .await
            .map_err(|e| SignerError::key(format!("keystore task failed: {e}")))?
    }

    fn scan(&self) -> SignerResult<Vec<(Address, PathBuf)>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            SignerError::key(format!("cannot read keystore dir {}: {e}", self.dir.display()))
        })?;

        let mut found = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match identify(&path) {
                Some(address) => found.push((address, path)),
                None => debug!(path = %path.display(), "skipping unrecognised keystore file"),
            }
        }
        debug!(dir = %self.dir.display(), entries = found.len(), "scanned keystore");
        Ok(found)
    }
}

/// Works out which address a keystore file belongs to.
fn identify(path: &Path) -> Option<Address> {
    if let Some(address) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(address_from_file_name)
    {
        return Some(address);
    }

    let body = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<KeystoreHeader>(&body) {
        Ok(header) => header.address.as_deref().and_then(parse_hex_address),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "keystore file is not valid JSON");
            None
        }
    }
}

/// Parses the trailing address of a `UTC--<timestamp>--<address>` name.
fn address_from_file_name(name: &str) -> Option<Address> {
    let (prefix, tail) = name.rsplit_once("--")?;
    if !prefix.starts_with("UTC--") {
        return None;
    }
    parse_hex_address(tail)
}

fn parse_hex_address(raw: &str) -> Option<Address> {
    let hex = raw.trim().trim_start_matches("0x");
    if hex.len() != 40 {
        return None;
    }
    format!("0x{hex}").parse().ok()
}
