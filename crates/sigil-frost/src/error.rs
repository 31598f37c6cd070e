//! FROST taproot error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] sigil_transport::Error),

    #[error("core error: {0}")]
    Core(#[from] sigil_core::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("frost protocol error: {0}")]
    Protocol(String),

    #[error("signature failed to verify against the group verifying key")]
    SignatureInvalid,

    #[error("bad wire message: {0}")]
    BadMessage(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
