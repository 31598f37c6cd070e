//! # Sigil FROST
//!
//! FROST (Flexible Round-Optimized Schnorr Threshold) signatures over
//! secp256k1 taproot (BIP-340) for a fixed two-party group.
//!
//! Key generation is dealerless DKG (`keygen_taproot`, via
//! `frost-secp256k1-tr`'s `part1`/`part2`/`part3`). Signing has three
//! entry points: `sign_taproot` runs both rounds live and returns the
//! finished signature; `sign_taproot_incomplete` withholds the round-2
//! share instead of sending it, letting an escrow arbitrate release;
//! `sign_taproot_cosign` resumes from a withheld share to finish the
//! signature once the counterparty's share arrives out of band.

pub mod error;
pub mod keygen;
pub mod sign;
mod wire;

pub use error::{Error, Result};
pub use keygen::{keygen_taproot, FrostTaprootConfig};
pub use sign::{sign_taproot, sign_taproot_cosign, sign_taproot_incomplete, IncompleteTaprootShare};
