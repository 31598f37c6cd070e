//! Coordinator error type and the stage-tagged failure it produces.

use thiserror::Error;

use crate::stage::Stage;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cmp error: {0}")]
    Cmp(#[from] sigil_cmp::Error),

    #[error("frost error: {0}")]
    Frost(#[from] sigil_frost::Error),

    #[error("transport error: {0}")]
    Transport(#[from] sigil_transport::Error),

    #[error("core error: {0}")]
    Core(#[from] sigil_core::Error),

    #[error("escrow HTTP error: {0}")]
    EscrowHttp(#[from] reqwest::Error),

    #[error("escrow rejected the request: {0}")]
    EscrowRejected(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("counterparty handshake failed: {0}")]
    Handshake(&'static str),

    #[error("both parties independently derived the same id_part; abort per §6")]
    DegenerateExchangeId,

    #[error("chain oracle error: {0}")]
    Chain(String),
}

impl From<crate::chain::ChainError> for Error {
    fn from(e: crate::chain::ChainError) -> Self {
        Error::Chain(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// An exchange's terminal failure: the stage it failed in, plus the
/// root cause. The coordinator never swallows an error into a bare
/// `FAILED` — callers always get both (§7, §9 error-channel note).
#[derive(Debug, Error)]
#[error("exchange failed at stage {stage}: {source}")]
pub struct Failure {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl Failure {
    pub fn new(stage: Stage, source: impl Into<Error>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
