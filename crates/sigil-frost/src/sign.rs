//! FROST taproot signing (§4.4 `sign_taproot`, `sign_taproot_incomplete`,
//! `sign_taproot_cosign`) and its interrupted variant.
//!
//! FROST's round 1 (nonce commitments) carries no exploitable secret,
//! so all three entry points exchange it live. The fairness-sensitive
//! step is round 2, the signature share: `sign_taproot` exchanges it
//! live and aggregates immediately, while the interrupted variant
//! computes and withholds it, to be combined later once the escrow
//! releases the counterparty's matching share.
//!
//! Unlike CMP, FROST has no separate offline presignature stage — the
//! nonce commitment exchanged in round 1 is single-message and
//! generated fresh for each digest, so `sign_taproot_incomplete`
//! returns the full [`IncompleteTaprootShare`] bundle (both
//! commitments plus the local share) rather than a bare scalar: the
//! bundle is what lets `sign_taproot_cosign` rebuild the exact signing
//! package the withheld share was computed against, without a live
//! transport back to a counterparty who may no longer be connected.

use std::collections::BTreeMap;

use frost_secp256k1_tr::round1::{self as sign_round1, SigningCommitments, SigningNonces};
use frost_secp256k1_tr::round2::{self as sign_round2, SignatureShare};
use frost_secp256k1_tr::{aggregate, Identifier, Signature, SigningPackage};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use sigil_core::signature::TaprootSignature;
use sigil_transport::Transport;

use crate::error::{Error, Result};
use crate::keygen::FrostTaprootConfig;
use crate::wire::{recv_round, send_round};

#[derive(Serialize, Deserialize)]
struct CommitmentWire {
    commitment: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct ShareWire {
    share: Vec<u8>,
}

fn identifier(id: u16) -> Result<Identifier> {
    Identifier::try_from(id).map_err(|e| Error::Protocol(e.to_string()))
}

fn build_signing_package(
    my_id: Identifier,
    my_commitment: &[u8],
    their_id: Identifier,
    their_commitment: &[u8],
    digest: &[u8],
) -> Result<SigningPackage> {
    let my_commitment = SigningCommitments::deserialize(my_commitment)
        .map_err(|e| Error::Protocol(e.to_string()))?;
    let their_commitment = SigningCommitments::deserialize(their_commitment)
        .map_err(|e| Error::Protocol(e.to_string()))?;
    let mut commitments = BTreeMap::new();
    commitments.insert(my_id, my_commitment);
    commitments.insert(their_id, their_commitment);
    Ok(SigningPackage::new(commitments, digest))
}

fn finish(
    config: &FrostTaprootConfig,
    signing_package: &SigningPackage,
    my_id: Identifier,
    my_share: SignatureShare,
    their_id: Identifier,
    their_share_bytes: &[u8],
    digest: &[u8],
) -> Result<TaprootSignature> {
    let their_share =
        SignatureShare::deserialize(their_share_bytes).map_err(|e| Error::Protocol(e.to_string()))?;

    let mut shares = BTreeMap::new();
    shares.insert(my_id, my_share);
    shares.insert(their_id, their_share);

    let signature: Signature = aggregate(signing_package, &shares, &config.pubkey_package)
        .map_err(|e| Error::Protocol(e.to_string()))?;

    let sig_bytes = signature
        .serialize()
        .map_err(|e| Error::Protocol(e.to_string()))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::Protocol("unexpected taproot signature length".to_string()))?;

    config
        .pubkey_package
        .verifying_key()
        .verify(digest, &signature)
        .map_err(|_| Error::SignatureInvalid)?;

    Ok(TaprootSignature(sig_bytes))
}

/// Normal online signing: exchange round-1 commitments and round-2
/// shares live, aggregate, and return the complete verified signature.
pub async fn sign_taproot<T: Transport>(
    self_id: u16,
    peer_id: u16,
    config: &FrostTaprootConfig,
    digest: &[u8],
    transport: &mut T,
) -> Result<TaprootSignature> {
    let my_id = identifier(self_id)?;
    let their_id = identifier(peer_id)?;

    let mut rng = OsRng;
    let (nonces, commitments): (SigningNonces, SigningCommitments) =
        sign_round1::commit(config.key_package.signing_share(), &mut rng);
    let my_commitment = commitments
        .serialize()
        .map_err(|e| Error::Protocol(e.to_string()))?;

    send_round(
        transport,
        &CommitmentWire {
            commitment: my_commitment.clone(),
        },
    )
    .await?;
    let peer_commitment: CommitmentWire = recv_round(transport).await?;

    let signing_package = build_signing_package(
        my_id,
        &my_commitment,
        their_id,
        &peer_commitment.commitment,
        digest,
    )?;

    let my_share = sign_round2::sign(&signing_package, &nonces, &config.key_package)
        .map_err(|e| Error::Protocol(e.to_string()))?;
    let my_share_bytes = my_share.serialize();

    send_round(
        transport,
        &ShareWire {
            share: my_share_bytes.to_vec(),
        },
    )
    .await?;
    let peer_share: ShareWire = recv_round(transport).await?;

    finish(
        config,
        &signing_package,
        my_id,
        my_share,
        their_id,
        &peer_share.share,
        digest,
    )
}

/// Everything a party retains after withholding her round-2 share:
/// both round-1 commitments (needed to rebuild the exact signing
/// package the share was computed against) plus the share itself.
pub struct IncompleteTaprootShare {
    pub(crate) own_commitment: Vec<u8>,
    pub(crate) peer_commitment: Vec<u8>,
    pub share: Vec<u8>,
}

/// Interrupted variant: exchange round-1 commitments live (they carry
/// no exploitable secret), compute the round-2 share, and withhold it
/// instead of sending it to the counterparty.
pub async fn sign_taproot_incomplete<T: Transport>(
    self_id: u16,
    peer_id: u16,
    config: &FrostTaprootConfig,
    digest: &[u8],
    transport: &mut T,
) -> Result<IncompleteTaprootShare> {
    let my_id = identifier(self_id)?;
    let their_id = identifier(peer_id)?;

    let mut rng = OsRng;
    let (nonces, commitments): (SigningNonces, SigningCommitments) =
        sign_round1::commit(config.key_package.signing_share(), &mut rng);
    let my_commitment = commitments
        .serialize()
        .map_err(|e| Error::Protocol(e.to_string()))?;

    send_round(
        transport,
        &CommitmentWire {
            commitment: my_commitment.clone(),
        },
    )
    .await?;
    let peer_commitment: CommitmentWire = recv_round(transport).await?;

    let signing_package = build_signing_package(
        my_id,
        &my_commitment,
        their_id,
        &peer_commitment.commitment,
        digest,
    )?;

    let my_share = sign_round2::sign(&signing_package, &nonces, &config.key_package)
        .map_err(|e| Error::Protocol(e.to_string()))?;

    Ok(IncompleteTaprootShare {
        own_commitment: my_commitment,
        peer_commitment: peer_commitment.commitment,
        share: my_share.serialize().to_vec(),
    })
}

/// Resume an interrupted session: combine the counterparty's withheld
/// share (obtained out-of-band, e.g. released by the escrow) with this
/// party's own withheld state to produce the complete, verified
/// signature.
pub fn sign_taproot_cosign(
    self_id: u16,
    peer_id: u16,
    config: &FrostTaprootConfig,
    digest: &[u8],
    own: &IncompleteTaprootShare,
    counterpart_share: &[u8],
) -> Result<TaprootSignature> {
    let my_id = identifier(self_id)?;
    let their_id = identifier(peer_id)?;

    let signing_package = build_signing_package(
        my_id,
        &own.own_commitment,
        their_id,
        &own.peer_commitment,
        digest,
    )?;
    let my_share =
        SignatureShare::deserialize(&own.share).map_err(|e| Error::Protocol(e.to_string()))?;

    finish(
        config,
        &signing_package,
        my_id,
        my_share,
        their_id,
        counterpart_share,
        digest,
    )
}
