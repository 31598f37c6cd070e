//! Cross-crate property tests for the universally-quantified invariants
//! of §8 that span more than one crate's own test suite.

use proptest::prelude::*;

use sigil_cmp::presign_online_cosign;
use sigil_core::party::ExchangeId;
use sigil_store::EncryptedStore;
use sigil_transport::{InProcessTransport, Message, Transport};

/// Invariant 2 (incomplete share necessity): for one fixed DKG output
/// and presignature pair, corrupting a single bit of the counterpart's
/// incomplete share never yields a signature that verifies.
#[tokio::test]
async fn incomplete_share_corruption_never_yields_a_verifying_signature() {
    let (mut a, mut b) = InProcessTransport::pair();
    let (cfg_a, cfg_b) = tokio::join!(sigil_cmp::keygen(&mut a), sigil_cmp::keygen(&mut b));
    let (cfg_a, cfg_b) = (cfg_a.unwrap(), cfg_b.unwrap());

    let (mut a2, mut b2) = InProcessTransport::pair();
    let (presig_a, presig_b) = tokio::join!(
        sigil_cmp::presign(&cfg_a, &mut a2),
        sigil_cmp::presign(&cfg_b, &mut b2)
    );
    let (presig_a, presig_b) = (presig_a.unwrap(), presig_b.unwrap());

    let digest = [0x42u8; 32];
    let incomplete_b = sigil_cmp::presign_online_incomplete(&presig_b, digest).unwrap();

    proptest!(ProptestConfig::with_cases(64), |(flip_bit in 0u32..256)| {
        let byte_idx = (flip_bit / 8) as usize;
        let bit_idx = flip_bit % 8;
        let mut corrupted = incomplete_b;
        corrupted[byte_idx] ^= 1 << bit_idx;
        prop_assume!(corrupted != incomplete_b);

        match presign_online_cosign(&cfg_a, &presig_a, digest, corrupted) {
            Err(_) => {}
            Ok(sig) => prop_assert!(sig.verify(&cfg_a.public_key, &digest).is_err()),
        }
    });
}

/// Invariant 7 (transport FIFO): for any interleaving of sends, a
/// single receiver observes messages from a single sender in
/// send-order.
proptest! {
    #[test]
    fn transport_preserves_fifo_order(messages in prop::collection::vec(any::<u8>(), 1..50)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (a, mut b) = InProcessTransport::pair();
            for &byte in &messages {
                a.send(Message::new(vec![byte])).await.unwrap();
            }
            for &byte in &messages {
                let received = b.next().await.unwrap().unwrap();
                prop_assert_eq!(received.as_bytes(), &[byte]);
            }
            Ok(())
        })?;
    }
}

/// Invariant 8 (AEAD store opacity): for any plaintext and passphrase,
/// a round trip recovers the plaintext, the ciphertext at rest differs
/// from it, and the wrong passphrase fails to decrypt.
proptest! {
    #[test]
    fn store_round_trips_and_rejects_wrong_passphrase(
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        passphrase in "[a-zA-Z0-9]{1,32}",
        wrong_passphrase in "[a-zA-Z0-9]{1,32}",
    ) {
        prop_assume!(passphrase != wrong_passphrase);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = EncryptedStore::open(&path, &passphrase).unwrap();
        store.put("k", &plaintext).unwrap();

        let raw_on_disk = std::fs::read(&path).unwrap();
        if !plaintext.is_empty() {
            prop_assert!(!raw_on_disk.windows(plaintext.len()).any(|w| w == plaintext.as_slice()));
        }

        let reopened = EncryptedStore::open(&path, &passphrase).unwrap();
        prop_assert_eq!(reopened.get("k").unwrap(), Some(plaintext));

        let wrong = EncryptedStore::open(&path, &wrong_passphrase).unwrap();
        prop_assert!(wrong.get("k").is_err());
    }
}

/// `ExchangeID` derivation (underlying Scenario E) never panics and is
/// symmetric in its two arguments for any pair of distinct 16-hex parts.
proptest! {
    #[test]
    fn exchange_id_derivation_is_symmetric(a in "[0-9a-f]{16}", b in "[0-9a-f]{16}") {
        prop_assume!(a != b);
        let ab = ExchangeId::from_id_parts(&a, &b).unwrap();
        let ba = ExchangeId::from_id_parts(&b, &a).unwrap();
        prop_assert_eq!(ab.as_str(), ba.as_str());
    }
}
