//! CMP threshold-ECDSA error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] sigil_transport::Error),

    #[error("core error: {0}")]
    Core(#[from] sigil_core::Error),

    #[error("presignature failed internal validation")]
    InvalidPreSignature,

    #[error("zero-knowledge proof verification failed: {0}")]
    ProofFailed(&'static str),

    #[error("signature failed to verify against the configured public key")]
    SignatureInvalid,

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("bad wire message: {0}")]
    BadMessage(&'static str),

    #[error("paillier decryption failed: ciphertext out of range")]
    PaillierDecrypt,
}

pub type Result<T> = std::result::Result<T, Error>;
