//! Algorithm tag shared by the escrow box and the threshold-signing crates.
//!
//! Resolves Open Question 1: the canonical wire value for the FROST/
//! Schnorr side of an exchange is `"schnorr"`, matching the escrow's own
//! validation dispatch (§4.6) and the `alg` field of the escrow envelope
//! (§6) — never `"frost"` or `"BTC"`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which threshold-signing scheme a `Flower` or coordinator side uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// CGG21/CMP-style ECDSA over secp256k1.
    Ecdsa,
    /// FROST/Schnorr over secp256k1 (BIP-340 / taproot).
    Schnorr,
}

impl Algorithm {
    /// The exact wire string used in the escrow envelope's `alg` field.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Algorithm::Ecdsa => "ecdsa",
            Algorithm::Schnorr => "schnorr",
        }
    }

    pub fn from_wire_str(s: &str) -> Result<Self> {
        match s {
            "ecdsa" => Ok(Algorithm::Ecdsa),
            "schnorr" => Ok(Algorithm::Schnorr),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}
