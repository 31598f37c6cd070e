//! Small cryptographic helpers shared across the exchange core.

use k256::{elliptic_curve::sec1::ToEncodedPoint, AffinePoint, ProjectivePoint};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Hash data using SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple pieces of data using SHA-256, as if concatenated.
pub fn sha256_multi(data: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for d in data {
        hasher.update(d);
    }
    hasher.finalize().into()
}

/// Decode a 33-byte compressed secp256k1 point.
pub fn decode_point(bytes: &[u8]) -> Result<AffinePoint> {
    let point = k256::PublicKey::from_sec1_bytes(bytes)
        .map_err(|e| Error::Crypto(format!("invalid public key: {e}")))?;
    Ok(*point.as_affine())
}

/// Encode a point as a 33-byte compressed secp256k1 public key.
pub fn encode_point(point: &AffinePoint) -> [u8; 33] {
    let encoded = point.to_encoded_point(true);
    encoded.as_bytes().try_into().expect("compressed point is 33 bytes")
}

/// Combine two compressed public keys by adding the underlying curve
/// points; used to compute an aggregate ECDSA public key from two
/// additive key shares' public components.
pub fn point_add(pk1: &[u8], pk2: &[u8]) -> Result<[u8; 33]> {
    let p1 = decode_point(pk1)?;
    let p2 = decode_point(pk2)?;
    let sum = ProjectivePoint::from(p1) + ProjectivePoint::from(p2);
    Ok(encode_point(&sum.to_affine()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::elliptic_curve::Field;
    use k256::{ProjectivePoint, Scalar};
    use rand::rngs::OsRng;

    #[test]
    fn point_add_matches_scalar_sum() {
        let x1 = Scalar::random(&mut OsRng);
        let x2 = Scalar::random(&mut OsRng);
        let p1 = (ProjectivePoint::GENERATOR * x1).to_affine();
        let p2 = (ProjectivePoint::GENERATOR * x2).to_affine();
        let combined = point_add(&encode_point(&p1), &encode_point(&p2)).unwrap();

        let expected = (ProjectivePoint::GENERATOR * (x1 + x2)).to_affine();
        assert_eq!(combined, encode_point(&expected));
    }
}
