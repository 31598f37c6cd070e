//! Encrypted key-value store (§4.7).
//!
//! Values are sealed at rest with AES-256-GCM, keyed by SHA-256 of a
//! user-supplied passphrase. Each entry is encrypted independently
//! with a fresh nonce, laid out as `nonce(12B) || AEAD_seal`. Store
//! keys are not encrypted — callers impose their own namespacing
//! (`"<name>/<address>/conf-ecdsa"` and similar), the store itself
//! treats them as opaque strings.
//!
//! Adapted from the teacher's `sigil-mother::auth::encrypted_storage`
//! atomic-write / 0600-permission file pattern, swapping
//! ChaCha20-Poly1305 for AES-256-GCM per the storage contract.

pub mod error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub use error::{Error, Result};

const NONCE_SIZE: usize = 12;

/// A single-file, passphrase-encrypted key-value store.
///
/// The backing file holds a bincode-serialized `HashMap<String,
/// Vec<u8>>` of sealed entries, loaded wholesale into memory on
/// `open` and rewritten wholesale on every mutation — sized for a
/// single-operator wallet store, not a general database.
pub struct EncryptedStore {
    path: PathBuf,
    cipher: Aes256Gcm,
    entries: HashMap<String, Vec<u8>>,
}

impl EncryptedStore {
    /// Open (or create) the store at `path`, deriving the AEAD key as
    /// `SHA-256(passphrase)`.
    pub fn open(path: impl AsRef<Path>, passphrase: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let key = Sha256::digest(passphrase.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key).expect("sha256 output is a valid aes-256 key");

        let entries = if path.exists() {
            let raw = std::fs::read(&path)?;
            if raw.is_empty() {
                HashMap::new()
            } else {
                bincode::deserialize(&raw)
                    .map_err(|e| Error::Corrupt(e.to_string()))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cipher,
            entries,
        })
    }

    /// Store `value` under `key`, encrypting it with a fresh nonce.
    pub fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, value)
            .expect("aes-gcm encryption over a fresh nonce cannot fail");

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        self.entries.insert(key.to_string(), sealed);
        self.flush()
    }

    /// Fetch and decrypt the value stored under `key`, if present.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(sealed) = self.entries.get(key) else {
            return Ok(None);
        };
        if sealed.len() < NONCE_SIZE {
            return Err(Error::RecordTooShort);
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| Error::DecryptionFailed)?;
        Ok(Some(plaintext))
    }

    /// Remove `key`, if present.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.flush()
    }

    /// Atomically rewrite the backing file via temp-file-then-rename,
    /// restricted to owner read/write on Unix.
    fn flush(&self) -> Result<()> {
        let raw = bincode::serialize(&self.entries).expect("in-memory map always serializes");
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &raw)?;
        std::fs::rename(&tmp_path, &self.path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_a_value_through_encryption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = EncryptedStore::open(&path, "correct horse battery staple").unwrap();
        store.put("exID", b"hello world").unwrap();

        let reopened = EncryptedStore::open(&path, "correct horse battery staple").unwrap();
        assert_eq!(reopened.get("exID").unwrap(), Some(b"hello world".to_vec()));
    }

    #[test]
    fn wrong_passphrase_fails_to_decrypt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = EncryptedStore::open(&path, "right").unwrap();
        store.put("k", b"secret").unwrap();

        let wrong = EncryptedStore::open(&path, "wrong").unwrap();
        assert!(matches!(wrong.get("k"), Err(Error::DecryptionFailed)));
    }

    #[test]
    fn absent_key_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");
        let store = EncryptedStore::open(&path, "pw").unwrap();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn delete_removes_a_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.bin");
        let mut store = EncryptedStore::open(&path, "pw").unwrap();
        store.put("k", b"v").unwrap();
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
