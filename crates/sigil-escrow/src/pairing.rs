//! `Flower`/`Pairing` data model and cross-verification (§3, §4.6).

use serde::{Deserialize, Serialize};

use sigil_core::signature::EthereumSignature;
use sigil_core::Algorithm;

use crate::error::Result;

/// One party's deposit for an exchange: its public key, the digest it
/// wants signed, and (once signed) the candidate signature it received
/// from its counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flower {
    pub alg: Algorithm,
    pub pub_key: Vec<u8>,
    pub hash: [u8; 32],
    pub sig: Vec<u8>,
}

impl Flower {
    pub fn is_signed(&self) -> bool {
        !self.sig.is_empty()
    }
}

/// An `ExchangeID`'s escrow record: at most two `Flower`s, added or
/// replaced by matching `pub_key` (invariant 1-2, §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pairing {
    slot1: Option<Flower>,
    slot2: Option<Flower>,
}

impl Pairing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-or-replace-by-pub: fill or overwrite slot 1 if it is empty
    /// or already holds this `pub`; otherwise fill or overwrite slot 2
    /// under the same rule. A third distinct `pub` arriving once both
    /// slots hold two other pubs is silently dropped — the pairing is
    /// full and untouched (§3 invariant 5, §8 scenario F).
    ///
    /// An empty-`sig` submission against a slot that already holds a
    /// signed flower for the same `pub` is a read-only poll, not a
    /// withdrawal: it must never downgrade the stored flower back to
    /// unsigned (§8 scenarios A, B).
    pub fn add_flower(&mut self, flower: Flower) {
        match &self.slot1 {
            None => {
                self.slot1 = Some(flower);
                return;
            }
            Some(existing) if existing.pub_key == flower.pub_key => {
                if existing.is_signed() && !flower.is_signed() {
                    return;
                }
                self.slot1 = Some(flower);
                return;
            }
            _ => {}
        }
        match &self.slot2 {
            None => {
                self.slot2 = Some(flower);
            }
            Some(existing) if existing.pub_key == flower.pub_key => {
                if existing.is_signed() && !flower.is_signed() {
                    return;
                }
                self.slot2 = Some(flower);
            }
            _ => {}
        }
    }

    pub fn find_by_pub(&self, pub_key: &[u8]) -> Option<&Flower> {
        [&self.slot1, &self.slot2]
            .into_iter()
            .flatten()
            .find(|f| f.pub_key == pub_key)
    }

    fn other_than(&self, pub_key: &[u8]) -> Option<&Flower> {
        [&self.slot1, &self.slot2]
            .into_iter()
            .flatten()
            .find(|f| f.pub_key != pub_key)
    }

    /// Both flowers present, both signed, and each verifies against the
    /// *other* flower's `pub`/`hash` (invariant 3, §3 — the deposited
    /// signature always authorizes the counterparty's withdrawal).
    pub fn pollinated(&self) -> Result<bool> {
        let (Some(f1), Some(f2)) = (&self.slot1, &self.slot2) else {
            return Ok(false);
        };
        if !f1.is_signed() || !f2.is_signed() {
            return Ok(false);
        }
        Ok(verify(f1.alg, &f1.pub_key, &f1.hash, &f2.sig)?
            && verify(f2.alg, &f2.pub_key, &f2.hash, &f1.sig)?)
    }

    /// The counterparty's completed signature for `pub_key`, once the
    /// pairing has pollinated. `pub_key` must itself be one of the two
    /// registered flowers — otherwise an unrelated caller could read a
    /// flower's signature without ever having deposited one of its own
    /// (§8 scenario F).
    pub fn counterpart_signature(&self, pub_key: &[u8]) -> Option<&[u8]> {
        self.find_by_pub(pub_key)?;
        self.other_than(pub_key).map(|f| f.sig.as_slice())
    }
}

/// Verify `sig` authorizes `hash` under `pub` and `alg`.
///
/// `ecdsa` signatures are in the threshold library's native form —
/// a 33-byte compressed nonce point followed by a 32-byte scalar —
/// not the 65-byte Ethereum `r || s || v` encoding; the escrow never
/// needs to recover an address. `schnorr` signatures are raw 64-byte
/// BIP-340 signatures over a 32-byte x-only key.
pub fn verify(alg: Algorithm, pub_key: &[u8], hash: &[u8; 32], sig: &[u8]) -> Result<bool> {
    match alg {
        Algorithm::Ecdsa => {
            if sig.len() != 65 {
                return Ok(false);
            }
            let r_point_compressed = &sig[..33];
            if r_point_compressed.len() != 33 {
                return Ok(false);
            }
            let mut r = [0u8; 32];
            r.copy_from_slice(&r_point_compressed[1..33]);
            let mut s = [0u8; 32];
            s.copy_from_slice(&sig[33..65]);
            let signature = EthereumSignature { r, s, v: 0 };
            Ok(signature.verify(pub_key, hash).is_ok())
        }
        Algorithm::Schnorr => {
            let Ok(vk) = frost_secp256k1_tr::VerifyingKey::deserialize(pub_key) else {
                return Ok(false);
            };
            let sig_bytes: [u8; 64] = match sig.try_into() {
                Ok(b) => b,
                Err(_) => return Ok(false),
            };
            let Ok(signature) = frost_secp256k1_tr::Signature::deserialize(&sig_bytes) else {
                return Ok(false);
            };
            Ok(vk.verify(hash, &signature).is_ok())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flower(pub_key: &[u8], sig: &[u8]) -> Flower {
        Flower {
            alg: Algorithm::Ecdsa,
            pub_key: pub_key.to_vec(),
            hash: [0u8; 32],
            sig: sig.to_vec(),
        }
    }

    #[test]
    fn add_flower_keys_slots_by_pub() {
        let mut pairing = Pairing::new();
        pairing.add_flower(flower(b"alice", b""));
        pairing.add_flower(flower(b"alice", b"retry"));
        assert!(pairing.slot2.is_none());
        assert_eq!(pairing.find_by_pub(b"alice").unwrap().sig, b"retry");

        pairing.add_flower(flower(b"bob", b""));
        assert!(pairing.slot2.is_some());
        assert!(pairing.find_by_pub(b"bob").is_some());
    }

    #[test]
    fn third_distinct_pub_is_silently_dropped() {
        let mut pairing = Pairing::new();
        pairing.add_flower(flower(b"alice", b""));
        pairing.add_flower(flower(b"bob", b""));
        pairing.add_flower(flower(b"carol", b""));
        assert!(pairing.find_by_pub(b"alice").is_some());
        assert!(pairing.find_by_pub(b"bob").is_some());
        assert!(pairing.find_by_pub(b"carol").is_none());
    }

    #[test]
    fn empty_sig_poll_does_not_downgrade_a_signed_flower() {
        let mut pairing = Pairing::new();
        pairing.add_flower(flower(b"alice", b"real-sig"));
        pairing.add_flower(flower(b"alice", b""));
        assert_eq!(pairing.find_by_pub(b"alice").unwrap().sig, b"real-sig");
    }

    #[test]
    fn counterpart_signature_refuses_an_unregistered_pub() {
        let mut pairing = Pairing::new();
        pairing.add_flower(flower(b"alice", b"sig-for-bob"));
        pairing.add_flower(flower(b"bob", b"sig-for-alice"));
        assert!(pairing.counterpart_signature(b"carol").is_none());
        assert_eq!(pairing.counterpart_signature(b"bob").unwrap(), b"sig-for-bob");
    }

    #[test]
    fn empty_pairing_is_not_pollinated() {
        let pairing = Pairing::new();
        assert!(!pairing.pollinated().unwrap());
    }

    #[test]
    fn one_flower_is_not_pollinated() {
        let mut pairing = Pairing::new();
        pairing.add_flower(flower(b"alice", b""));
        assert!(!pairing.pollinated().unwrap());
    }
}
