use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decryption failed: wrong passphrase or corrupted entry")]
    DecryptionFailed,

    #[error("stored record too short to contain a nonce")]
    RecordTooShort,

    #[error("corrupted store file: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, Error>;
