//! Error types shared by the exchange core.

use thiserror::Error;

/// Result type alias using the core `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while working with the core data model.
#[derive(Debug, Error)]
pub enum Error {
    /// A `PartyId` was constructed from the wrong number of bytes.
    #[error("invalid party id: expected {expected} bytes, got {actual}")]
    InvalidPartyId { expected: usize, actual: usize },

    /// Both parties independently derived the identical `id_part`; the
    /// exchange must abort rather than proceed with an empty `ExchangeId`.
    #[error("exchange id is degenerate: both parties supplied identical id parts")]
    DegenerateExchangeId,

    /// An `alg` wire value did not match a known tag.
    #[error("unknown algorithm tag: {0}")]
    UnknownAlgorithm(String),

    /// A signature or public key was the wrong length for its algorithm.
    #[error("invalid byte length for {what}: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Cryptographic operation (point decode, scalar reduction, etc.) failed.
    #[error("cryptographic error: {0}")]
    Crypto(String),

    /// Signature verification failed.
    #[error("signature verification failed")]
    VerificationFailed,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
