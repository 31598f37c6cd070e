//! Multiplicative-to-additive (MtA) share conversion, the Paillier-
//! based primitive CGG21/CMP's presignature round uses to turn each
//! party's local product terms (`k_i * gamma_j`, `k_i * x_j`) into
//! additively-shared summands without revealing either factor.
//!
//! Protocol (Gennaro–Goldfeder/CGG21 style, sender `A` holds `a` under
//! her own Paillier key, responder `B` holds `b`):
//!
//! 1. `A` sends `C_a = Enc_A(a)` (already done once at keygen time —
//!    `mta_initiate` regenerates it per call for simplicity here).
//! 2. `B` computes `C_b = C_a^b (*) Enc_A(beta')` for a fresh random
//!    `beta'`, sets her own additive share `beta = -beta' mod q`, and
//!    returns `C_b` to `A`.
//! 3. `A` decrypts `C_b` to recover `alpha' = a*b + beta'` (an exact
//!    integer, not reduced mod the Paillier modulus, since `beta'` is
//!    chosen far smaller than it) and reduces it mod the curve order
//!    `q` to get her additive share `alpha`.
//!
//! `alpha + beta ≡ a*b (mod q)` by construction.

use k256::elliptic_curve::PrimeField;
use k256::Scalar;
use num_bigint::{BigUint, RandBigInt};
use rand::RngCore;

use crate::paillier::{Ciphertext, PublicKey, SecretKey};

/// Curve order `q` as a `BigUint`, for reducing Paillier plaintexts
/// back into scalar range.
fn curve_order() -> BigUint {
    // secp256k1 order n, big-endian.
    BigUint::from_bytes_be(&[
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
        0x41, 0x41,
    ])
}

pub fn scalar_to_biguint(s: &Scalar) -> BigUint {
    BigUint::from_bytes_be(s.to_repr().as_slice())
}

pub fn biguint_to_scalar_mod_q(v: &BigUint) -> Scalar {
    let reduced = v % curve_order();
    let mut bytes = reduced.to_bytes_be();
    let mut padded = [0u8; 32];
    let start = 32 - bytes.len().min(32);
    // defensive: a value reduced mod a 256-bit order never exceeds 32
    // bytes, but never trust external arithmetic blindly.
    if bytes.len() > 32 {
        bytes = bytes[bytes.len() - 32..].to_vec();
    }
    padded[start..].copy_from_slice(&bytes);
    Scalar::from_repr(padded.into()).expect("value reduced mod curve order fits a scalar")
}

/// Margin (in bits) below the Paillier modulus size that bounds
/// `beta'`, keeping `a*b + beta'` comfortably inside plaintext range
/// for 256-bit curve scalars and 1024-bit Paillier primes.
const BLINDING_MARGIN_BITS: u64 = 256;

/// `A`'s first message: encrypt her factor `a` under her own Paillier
/// key.
pub fn mta_initiate<R: RngCore>(sk_a: &SecretKey, a: &Scalar, rng: &mut R) -> Ciphertext {
    sk_a.public.encrypt(rng, &scalar_to_biguint(a))
}

/// `B`'s response: fold in her factor `b` and a blinding `beta'`,
/// returning the ciphertext to send back to `A` and her own additive
/// share `beta`.
pub fn mta_respond<R: RngCore>(
    pk_a: &PublicKey,
    c_a: &Ciphertext,
    b: &Scalar,
    rng: &mut R,
) -> (Ciphertext, Scalar) {
    let b_big = scalar_to_biguint(b);
    let term = pk_a.scalar_mul(c_a, &b_big);

    let bound_bits = pk_a.n.bits().saturating_sub(BLINDING_MARGIN_BITS).max(1);
    let beta_prime = rng.gen_biguint(bound_bits);

    let blinded = pk_a.encrypt(rng, &beta_prime);
    let c_b = pk_a.add(&term, &blinded);

    let beta = biguint_to_scalar_mod_q(&(curve_order() - (&beta_prime % curve_order())));
    (c_b, beta)
}

/// `A`'s final step: decrypt `B`'s response and reduce to her additive
/// share `alpha`, with `alpha + beta ≡ a*b (mod q)`.
pub fn mta_finalize(sk_a: &SecretKey, c_b: &Ciphertext) -> crate::error::Result<Scalar> {
    let plaintext = sk_a
        .decrypt(c_b)
        .map_err(|_| crate::error::Error::PaillierDecrypt)?;
    Ok(biguint_to_scalar_mod_q(&plaintext))
}
