//! Core data model for the signature-escrow fair-exchange core.
//!
//! Defines party identity, the mutually-computed exchange identifier,
//! the algorithm tag shared by the escrow box and the threshold-signing
//! crates, and the canonical signature byte encodings.

pub mod algorithm;
pub mod crypto;
pub mod error;
pub mod party;
pub mod signature;

pub use algorithm::Algorithm;
pub use error::{Error, Result};
pub use party::{ExchangeId, PartyId};
pub use signature::{EthereumSignature, TaprootSignature};
