//! Online signing (§4.3 `presign_online`, `presign_online_incomplete`,
//! `presign_online_cosign`) and its interrupted variant, the fairness
//! lever the coordinator uses to withhold a usable signature until
//! the escrow releases the counterparty's matching half.
//!
//! Given a digest `m` and a [`PreSignature`], each party's local
//! contribution is `s_i = kappa_i * m + r * sigma_i`; the complete
//! signature is `s = s_1 + s_2 mod q`. This is the party's entire
//! contribution to the final signature — the "incomplete share" in
//! the interrupted variant is exactly this `s_i` value, withheld
//! instead of exchanged.

use k256::elliptic_curve::PrimeField;
use k256::Scalar;
use serde::{Deserialize, Serialize};

use sigil_core::signature::EthereumSignature;
use sigil_transport::Transport;

use crate::error::{Error, Result};
use crate::keygen::EcdsaConfig;
use crate::presign::PreSignature;
use crate::wire::{recv_round, send_round};

#[derive(Serialize, Deserialize)]
struct ShareRound {
    s: [u8; 32],
}

fn local_share(presig: &PreSignature, digest: &[u8; 32]) -> Result<Scalar> {
    let m = Option::<Scalar>::from(Scalar::from_repr((*digest).into()))
        .ok_or(Error::ProofFailed("digest does not reduce to a valid scalar"))?;
    Ok(presig.kappa() * m + Scalar::from_bytes_r(presig.r) * presig.sigma())
}

/// Combine two local shares into the final signature, verifying it
/// before returning.
fn finish(
    config: &EcdsaConfig,
    presig: &PreSignature,
    digest: &[u8; 32],
    self_share: Scalar,
    peer_share: Scalar,
) -> Result<EthereumSignature> {
    let s = self_share + peer_share;
    let r_point = r_scalar_as_point(presig.r, presig.r_y_is_odd)?;
    let signature = EthereumSignature::from_r_point_and_s(&r_point, s);
    signature
        .verify(&config.public_key, digest)
        .map_err(|_| Error::SignatureInvalid)?;
    Ok(signature)
}

/// Reconstruct `R` from its x-coordinate and the y-parity `presign`
/// recorded, rather than guessing a parity — the recovery id `v` in
/// the finished signature must match the `R` the parties actually
/// agreed on, not an arbitrary same-x point.
fn r_scalar_as_point(r: [u8; 32], y_is_odd: bool) -> Result<k256::AffinePoint> {
    let mut compressed = [0u8; 33];
    compressed[0] = if y_is_odd { 0x03 } else { 0x02 };
    compressed[1..].copy_from_slice(&r);
    sigil_core::crypto::decode_point(&compressed).map_err(Error::Core)
}

trait ScalarFromBytes {
    fn from_bytes_r(bytes: [u8; 32]) -> Self;
}
impl ScalarFromBytes for Scalar {
    fn from_bytes_r(bytes: [u8; 32]) -> Self {
        Option::<Scalar>::from(Scalar::from_repr(bytes.into())).unwrap_or(Scalar::ZERO)
    }
}

/// Normal online signing: exchange local shares over the transport and
/// return the complete, verified signature.
pub async fn presign_online<T: Transport>(
    config: &EcdsaConfig,
    presig: PreSignature,
    digest: [u8; 32],
    transport: &mut T,
) -> Result<EthereumSignature> {
    let self_share = local_share(&presig, &digest)?;
    send_round(
        transport,
        &ShareRound {
            s: self_share.to_bytes().into(),
        },
    )
    .await?;
    let peer: ShareRound = recv_round(transport).await?;
    let peer_share = Scalar::from_bytes_r(peer.s);
    finish(config, &presig, &digest, self_share, peer_share)
}

/// Interrupted variant: compute the local share and return it without
/// ever sending it to the counterparty.
pub fn presign_online_incomplete(presig: &PreSignature, digest: [u8; 32]) -> Result<[u8; 32]> {
    Ok(local_share(presig, &digest)?.to_bytes().into())
}

/// Resume an interrupted session: combine with the counterparty's
/// incomplete share (obtained out-of-band, e.g. released by the
/// escrow) to produce the complete, verified signature.
pub fn presign_online_cosign(
    config: &EcdsaConfig,
    presig: &PreSignature,
    digest: [u8; 32],
    counterpart_incomplete: [u8; 32],
) -> Result<EthereumSignature> {
    let self_share = local_share(presig, &digest)?;
    let peer_share = Scalar::from_bytes_r(counterpart_incomplete);
    finish(config, presig, &digest, self_share, peer_share)
}
