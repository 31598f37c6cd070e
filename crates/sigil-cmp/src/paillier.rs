//! A minimal Paillier cryptosystem, used only to back the MtA
//! (multiplicative-to-additive) share conversion CGG21/CMP's
//! presignature step requires. This is deliberately not a general-
//! purpose Paillier implementation: it supports exactly encrypt,
//! decrypt, homomorphic addition, and homomorphic scalar multiplication.
//!
//! Uses the `g = n + 1` simplification, which avoids having to pick and
//! transmit a generator: `E(m) = (1 + m*n mod n^2) * r^n mod n^2`.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bit length of each of the two safe-ish primes `p`, `q`; `n = p*q` is
/// twice this.
pub const PRIME_BITS: u64 = 1024;

#[derive(Clone, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "biguint_serde")]
    pub n: BigUint,
    #[serde(with = "biguint_serde")]
    pub n_squared: BigUint,
}

pub struct SecretKey {
    pub public: PublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl SecretKey {
    /// Generate a fresh Paillier keypair from two random primes of
    /// `PRIME_BITS` bits each.
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        let p = gen_prime(rng, PRIME_BITS);
        let q = gen_prime(rng, PRIME_BITS);
        let n = &p * &q;
        let n_squared = &n * &n;
        let one = BigUint::one();
        let lambda = (&p - &one).lcm(&(&q - &one));
        // mu = lambda^-1 mod n, valid because gcd(lambda, n) = 1 for
        // two distinct primes under the g = n+1 simplification.
        let mu = mod_inverse(&lambda, &n).expect("lambda invertible mod n for distinct primes");
        Self {
            public: PublicKey { n, n_squared },
            lambda,
            mu,
        }
    }

    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigUint> {
        if ciphertext.0 >= self.public.n_squared {
            return Err(Error::PaillierDecrypt);
        }
        let x = ciphertext.0.modpow(&self.lambda, &self.public.n_squared);
        let l = paillier_l(&x, &self.public.n);
        Ok((l * &self.mu) % &self.public.n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(#[serde(with = "biguint_serde")] BigUint);

impl Ciphertext {
    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl PublicKey {
    /// Encrypt `m` (reduced mod `n`) with a fresh random blinding
    /// factor `r` coprime to `n`.
    pub fn encrypt<R: RngCore>(&self, rng: &mut R, m: &BigUint) -> Ciphertext {
        let r = self.random_coprime(rng);
        self.encrypt_with_randomness(m, &r)
    }

    fn encrypt_with_randomness(&self, m: &BigUint, r: &BigUint) -> Ciphertext {
        let m = m % &self.n;
        // (1 + m*n) mod n^2, valid since m*n < n^2.
        let base = (BigUint::one() + &m * &self.n) % &self.n_squared;
        let r_to_n = r.modpow(&self.n, &self.n_squared);
        Ciphertext((base * r_to_n) % &self.n_squared)
    }

    /// Homomorphic addition: `E(a) (+) E(b) = E(a+b mod n)`.
    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
        Ciphertext((&a.0 * &b.0) % &self.n_squared)
    }

    /// Homomorphic scalar multiplication: `k (*) E(a) = E(k*a mod n)`.
    pub fn scalar_mul(&self, ciphertext: &Ciphertext, k: &BigUint) -> Ciphertext {
        Ciphertext(ciphertext.0.modpow(k, &self.n_squared))
    }

    /// `E(0)` re-randomized — used to blind a homomorphically-derived
    /// ciphertext before sending it back to its owner in the MtA
    /// protocol, so the owner cannot infer the other party's factor.
    pub fn rerandomize<R: RngCore>(&self, ciphertext: &Ciphertext, rng: &mut R) -> Ciphertext {
        let r = self.random_coprime(rng);
        let r_to_n = r.modpow(&self.n, &self.n_squared);
        Ciphertext((&ciphertext.0 * r_to_n) % &self.n_squared)
    }

    fn random_coprime<R: RngCore>(&self, rng: &mut R) -> BigUint {
        loop {
            let candidate = rng.gen_biguint_below(&self.n);
            if candidate.is_zero() {
                continue;
            }
            if candidate.gcd(&self.n) == BigUint::one() {
                return candidate;
            }
        }
    }
}

fn paillier_l(x: &BigUint, n: &BigUint) -> BigUint {
    (x - BigUint::one()) / n
}

fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    let a = a.to_bigint()?;
    let m = modulus.to_bigint()?;
    let (g, x, _) = extended_gcd(&a, &m);
    if g != num_bigint::BigInt::one() {
        return None;
    }
    let result = ((x % &m) + &m) % &m;
    result.to_biguint()
}

/// Extended Euclidean algorithm over signed bigints: returns `(gcd, x, y)`
/// such that `a*x + b*y = gcd`.
fn extended_gcd(
    a: &num_bigint::BigInt,
    b: &num_bigint::BigInt,
) -> (num_bigint::BigInt, num_bigint::BigInt, num_bigint::BigInt) {
    use num_bigint::BigInt;
    if b.is_zero() {
        return (a.clone(), BigInt::one(), BigInt::zero());
    }
    let (q, r) = a.div_rem(b);
    let (g, x1, y1) = extended_gcd(b, &r);
    (g, y1.clone(), x1 - q * y1)
}

trait ToSigned {
    fn to_bigint(&self) -> Option<num_bigint::BigInt>;
}
impl ToSigned for BigUint {
    fn to_bigint(&self) -> Option<num_bigint::BigInt> {
        Some(num_bigint::BigInt::from(self.clone()))
    }
}
trait ToUnsigned {
    fn to_biguint(&self) -> Option<BigUint>;
}
impl ToUnsigned for num_bigint::BigInt {
    fn to_biguint(&self) -> Option<BigUint> {
        self.clone().try_into().ok()
    }
}

/// Generate a random odd prime of exactly `bits` bits using trial
/// division against small primes followed by Miller-Rabin.
fn gen_prime<R: RngCore>(rng: &mut R, bits: u64) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, rng) {
            return candidate;
        }
    }
}

const SMALL_PRIMES: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

fn is_probable_prime<R: RngCore>(n: &BigUint, rng: &mut R) -> bool {
    for &p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    miller_rabin(n, rng, 40)
}

fn miller_rabin<R: RngCore>(n: &BigUint, rng: &mut R, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = &one + &one;
    if *n <= two {
        return *n == two;
    }
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while (&d).is_even() {
        d >>= 1;
        r += 1;
    }
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

mod biguint_serde {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        value.to_bytes_be().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Ok(BigUint::from_bytes_be(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    /// Smaller than `PRIME_BITS` so the suite stays fast; the math is
    /// identical at production key sizes.
    const TEST_PRIME_BITS: u64 = 256;

    fn test_keypair() -> SecretKey {
        let mut rng = OsRng;
        let p = gen_prime(&mut rng, TEST_PRIME_BITS);
        let q = gen_prime(&mut rng, TEST_PRIME_BITS);
        let n = &p * &q;
        let n_squared = &n * &n;
        let one = BigUint::one();
        let lambda = (&p - &one).lcm(&(&q - &one));
        let mu = mod_inverse(&lambda, &n).unwrap();
        SecretKey {
            public: PublicKey { n, n_squared },
            lambda,
            mu,
        }
    }

    #[test]
    fn encrypt_decrypt_round_trips() {
        let sk = test_keypair();
        let mut rng = OsRng;
        let m = BigUint::from(424242u64);
        let c = sk.public.encrypt(&mut rng, &m);
        assert_eq!(sk.decrypt(&c).unwrap(), m);
    }

    #[test]
    fn homomorphic_add_matches_plaintext_sum() {
        let sk = test_keypair();
        let mut rng = OsRng;
        let a = BigUint::from(111u64);
        let b = BigUint::from(222u64);
        let ca = sk.public.encrypt(&mut rng, &a);
        let cb = sk.public.encrypt(&mut rng, &b);
        let sum = sk.public.add(&ca, &cb);
        assert_eq!(sk.decrypt(&sum).unwrap(), &a + &b);
    }

    #[test]
    fn homomorphic_scalar_mul_matches_plaintext_product() {
        let sk = test_keypair();
        let mut rng = OsRng;
        let a = BigUint::from(7u64);
        let k = BigUint::from(6u64);
        let ca = sk.public.encrypt(&mut rng, &a);
        let scaled = sk.public.scalar_mul(&ca, &k);
        assert_eq!(sk.decrypt(&scaled).unwrap(), &a * &k);
    }

    #[test]
    fn rerandomize_preserves_plaintext() {
        let sk = test_keypair();
        let mut rng = OsRng;
        let m = BigUint::from(99u64);
        let c = sk.public.encrypt(&mut rng, &m);
        let c2 = sk.public.rerandomize(&c, &mut rng);
        assert_ne!(c, c2);
        assert_eq!(sk.decrypt(&c2).unwrap(), m);
    }
}
