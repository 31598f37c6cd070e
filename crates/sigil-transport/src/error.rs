//! Transport error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport channel closed")]
    Closed,

    #[error("peer disconnected: {0}")]
    Disconnected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
