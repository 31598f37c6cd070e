//! CGG21/CMP-style 2-of-2 threshold ECDSA over secp256k1 (§4.3).
//!
//! Keygen, presignature precomputation, and online signing are built
//! directly on `k256` curve arithmetic plus a hand-rolled Paillier
//! cryptosystem backing the MtA share-conversion step, rather than on
//! an external threshold-ECDSA crate.

pub mod error;
pub mod keygen;
pub mod mta;
pub mod paillier;
pub mod presign;
pub mod sign;
mod wire;

pub use error::{Error, Result};
pub use keygen::{keygen, refresh, EcdsaConfig};
pub use presign::{presign, PreSignature};
pub use sign::{presign_online, presign_online_cosign, presign_online_incomplete};
