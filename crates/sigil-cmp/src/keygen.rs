//! 2-of-2 ECDSA key generation and proactive secret-share refresh
//! (§4.3 `keygen`, `refresh`).
//!
//! A commit-then-reveal exchange of each party's public share prevents
//! either party from picking her share as a function of the other's
//! (which would let her bias the aggregate key). Each party also
//! publishes her Paillier public key, later used as the MtA responder
//! key during `presign`.

use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use sigil_core::crypto::{encode_point, point_add, sha256_multi};
use sigil_transport::Transport;

use crate::error::{Error, Result};
use crate::paillier::{PublicKey as PaillierPublicKey, SecretKey as PaillierSecretKey};
use crate::wire::{recv_round, send_round};

#[derive(Serialize, Deserialize)]
struct CommitRound {
    commitment: [u8; 32],
}

#[derive(Serialize, Deserialize)]
struct RevealRound {
    share_pub: [u8; 33],
    nonce: [u8; 32],
    paillier_n: Vec<u8>,
}

/// A party's half of a completed 2-of-2 ECDSA key generation.
pub struct EcdsaConfig {
    pub public_key: [u8; 33],
    pub secret_share: Scalar,
    pub paillier_sk: PaillierSecretKey,
    pub counterparty_paillier_pk: PaillierPublicKey,
}

impl Drop for EcdsaConfig {
    fn drop(&mut self) {
        self.secret_share.zeroize();
    }
}

/// Run the 2-of-2 keygen ceremony to completion.
pub async fn keygen<T: Transport>(transport: &mut T) -> Result<EcdsaConfig> {
    let mut rng = OsRng;
    let share = Scalar::random(&mut rng);
    let share_point = (ProjectivePoint::GENERATOR * share).to_affine();
    let share_pub = encode_point(&share_point);

    let mut nonce = [0u8; 32];
    rng.fill_bytes(&mut nonce);
    let commitment = sha256_multi(&[&share_pub, &nonce]);

    let paillier_sk = PaillierSecretKey::generate(&mut rng);
    let paillier_n = paillier_sk.public.n.to_bytes_be();

    send_round(transport, &CommitRound { commitment }).await?;
    let peer_commit: CommitRound = recv_round(transport).await?;

    send_round(
        transport,
        &RevealRound {
            share_pub,
            nonce,
            paillier_n: paillier_n.clone(),
        },
    )
    .await?;
    let peer_reveal: RevealRound = recv_round(transport).await?;

    let expected = sha256_multi(&[&peer_reveal.share_pub, &peer_reveal.nonce]);
    if expected != peer_commit.commitment {
        return Err(Error::ProofFailed("keygen commitment mismatch"));
    }

    let public_key = point_add(&share_pub, &peer_reveal.share_pub).map_err(Error::Core)?;
    let counterparty_paillier_pk = PaillierPublicKey {
        n: num_bigint::BigUint::from_bytes_be(&peer_reveal.paillier_n),
        n_squared: {
            let n = num_bigint::BigUint::from_bytes_be(&peer_reveal.paillier_n);
            &n * &n
        },
    };

    Ok(EcdsaConfig {
        public_key,
        secret_share: share,
        paillier_sk,
        counterparty_paillier_pk,
    })
}

#[derive(Serialize, Deserialize)]
struct RefreshRound {
    delta: [u8; 32],
    paillier_n: Vec<u8>,
}

/// Proactive secret-share rotation: each party offers a freshly
/// sampled `delta` and applies `share + my_delta - their_delta`. Both
/// parties running identical code guarantees the two deltas cancel
/// out of the sum `share_a + share_b`, so the aggregate public key is
/// unchanged while either share alone becomes useless once combined
/// with its pre-refresh counterpart. Paillier keys are regenerated at
/// the same time, since they have no purpose once MtA sessions built
/// on the old keys are long complete.
pub async fn refresh<T: Transport>(config: EcdsaConfig, transport: &mut T) -> Result<EcdsaConfig> {
    let mut rng = OsRng;
    let my_delta = Scalar::random(&mut rng);

    let new_paillier_sk = PaillierSecretKey::generate(&mut rng);
    let paillier_n = new_paillier_sk.public.n.to_bytes_be();

    send_round(
        transport,
        &RefreshRound {
            delta: my_delta.to_bytes().into(),
            paillier_n,
        },
    )
    .await?;
    let peer: RefreshRound = recv_round(transport).await?;

    let their_delta_bytes: [u8; 32] = peer.delta;
    let their_delta: Option<Scalar> =
        k256::elliptic_curve::PrimeField::from_repr(their_delta_bytes.into()).into();
    let their_delta = their_delta.ok_or(Error::ProofFailed("refresh delta out of range"))?;

    let new_share = config.secret_share + my_delta - their_delta;

    Ok(EcdsaConfig {
        public_key: config.public_key,
        secret_share: new_share,
        paillier_sk: new_paillier_sk,
        counterparty_paillier_pk: PaillierPublicKey {
            n: num_bigint::BigUint::from_bytes_be(&peer.paillier_n),
            n_squared: {
                let n = num_bigint::BigUint::from_bytes_be(&peer.paillier_n);
                &n * &n
            },
        },
    })
}
