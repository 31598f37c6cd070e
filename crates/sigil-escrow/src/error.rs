use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("core error: {0}")]
    Core(#[from] sigil_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
