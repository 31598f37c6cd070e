//! Canonical signature byte encodings (§4.3, §4.4, §6).

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature as K256Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, Scalar};

use crate::error::{Error, Result};

/// A CMP/ECDSA signature in the 65-byte Ethereum-compatible `r || s || v`
/// form, with low-S normalization already applied.
///
/// `r, s` are 32-byte big-endian; `v ∈ {0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthereumSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl EthereumSignature {
    /// Build the canonical encoding from a CMP signature's native form:
    /// the nonce point `r_point` and scalar `s`.
    ///
    /// Per §4.3: `r` is `r_point.x mod n`; low-S normalization replaces
    /// `s` with `n - s` (flipping `v`) whenever `s > n/2`; `v` is derived
    /// from the parity of `r_point`'s y-coordinate, with the low-S flip
    /// taken into account.
    pub fn from_r_point_and_s(r_point: &AffinePoint, s: Scalar) -> Self {
        let encoded = r_point.to_encoded_point(false);
        let x = encoded.x().expect("uncompressed point has x coordinate");
        let y_is_odd: bool = encoded.y().expect("uncompressed point has y coordinate")[31] & 1 == 1;

        let mut v = if y_is_odd { 1u8 } else { 0u8 };
        let mut s = s;
        if bool::from(s.is_high()) {
            s = -s;
            v ^= 1;
        }

        let mut r = [0u8; 32];
        r.copy_from_slice(x.as_slice());

        Self {
            r,
            s: s.to_repr().into(),
            v,
        }
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(Error::InvalidLength {
                what: "ethereum signature",
                expected: 65,
                actual: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// `s <= n/2`, i.e. this signature is already in low-S form.
    pub fn is_low_s(&self) -> bool {
        let s: Option<Scalar> = Scalar::from_repr(self.s.into()).into();
        match s {
            Some(s) => !bool::from(s.is_high()),
            None => false,
        }
    }

    /// Verify against a 33-byte compressed secp256k1 public key and a
    /// 32-byte message digest. `v` is ignored for verification (it only
    /// matters for address recovery, out of this core's scope).
    pub fn verify(&self, compressed_pubkey: &[u8], digest: &[u8; 32]) -> Result<()> {
        let verifying_key = VerifyingKey::from_sec1_bytes(compressed_pubkey)
            .map_err(|e| Error::Crypto(format!("invalid public key: {e}")))?;
        let mut raw = [0u8; 64];
        raw[..32].copy_from_slice(&self.r);
        raw[32..].copy_from_slice(&self.s);
        let sig = K256Signature::from_slice(&raw)
            .map_err(|e| Error::Crypto(format!("invalid signature encoding: {e}")))?;
        verifying_key
            .verify_prehash(digest, &sig)
            .map_err(|_| Error::VerificationFailed)
    }
}

/// A FROST/BIP-340 taproot signature: 64 raw bytes, no recovery byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaprootSignature(pub [u8; 64]);

impl TaprootSignature {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(Error::InvalidLength {
                what: "taproot signature",
                expected: 64,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; 64];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}
