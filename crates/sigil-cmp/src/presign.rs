//! Presignature precomputation (§4.3 `presign`).
//!
//! Computes everything about a CMP signature that does not depend on
//! the message digest: an additively-shared nonce inverse `kappa`, a
//! blinding factor `gamma` used only to hide `kappa` while its public
//! point `Gamma` is agreed on, the public nonce-point x-coordinate
//! `r`, and an additively-shared `sigma = kappa * x` (`x` the
//! aggregate private key) kept secret until the online-signing step.
//!
//! ```text
//! kappa = kappa_1 + kappa_2          (shared nonce inverse)
//! gamma = gamma_1 + gamma_2          (blinding factor)
//! Gamma = Gamma_1 + Gamma_2 = gamma*G
//! delta = kappa * gamma              (revealed — safe, blinded by gamma)
//! R     = delta^-1 * Gamma = kappa^-1 * G
//! r     = R.x mod q
//! sigma = kappa * x                  (never revealed)
//! ```
//!
//! Each product (`kappa*gamma`, `kappa*x`) is split into a local
//! square term plus two MtA-derived cross terms, one per counterparty
//! pairing, following the standard Gennaro–Goldfeder/CGG21
//! presignature shape.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use sigil_core::crypto::sha256_multi;
use sigil_transport::Transport;

use crate::error::{Error, Result};
use crate::keygen::EcdsaConfig;
use crate::mta::{biguint_to_scalar_mod_q, mta_finalize, mta_initiate, mta_respond};
use crate::paillier::Ciphertext;
use crate::wire::{recv_round, send_round};

#[derive(Serialize, Deserialize)]
struct GammaCommit {
    commitment: [u8; 32],
}

#[derive(Serialize, Deserialize)]
struct GammaReveal {
    gamma_pub: [u8; 33],
    nonce: [u8; 32],
}

#[derive(Serialize, Deserialize)]
struct KappaCipher {
    ciphertext: Ciphertext,
}

#[derive(Serialize, Deserialize)]
struct MtaResponse {
    gamma_cross: Ciphertext,
    x_cross: Ciphertext,
}

#[derive(Serialize, Deserialize)]
struct DeltaReveal {
    delta: [u8; 32],
}

/// A fully-precomputed presignature, ready for one online-signing use.
pub struct PreSignature {
    pub r: [u8; 32],
    /// Parity of `R`'s y-coordinate, preserved so the online-signing
    /// step can reconstruct the exact point `R` rather than an
    /// arbitrary same-x point, as §4.3's canonical encoding requires.
    pub(crate) r_y_is_odd: bool,
    kappa: Scalar,
    sigma: Scalar,
}

impl Drop for PreSignature {
    fn drop(&mut self) {
        self.kappa.zeroize();
        self.sigma.zeroize();
    }
}

impl PreSignature {
    /// Internal consistency check on this party's own share: neither
    /// `kappa` (this party's additive share of the nonce inverse) nor
    /// `sigma` (this party's share of `kappa * x`) may be zero — a
    /// zero share is a negligible-probability sampling degeneracy
    /// that would make the corresponding online-signing contribution
    /// trivially invertible by the counterparty. `r` itself is
    /// already guaranteed non-degenerate: it is derived from `delta`,
    /// which `presign` already confirmed is invertible.
    fn validate(&self) -> bool {
        bool::from(!self.kappa.is_zero()) && bool::from(!self.sigma.is_zero())
    }

    pub(crate) fn kappa(&self) -> Scalar {
        self.kappa
    }

    pub(crate) fn sigma(&self) -> Scalar {
        self.sigma
    }
}

async fn commit_reveal_point<T: Transport>(
    transport: &mut T,
    point_bytes: [u8; 33],
) -> Result<[u8; 33]> {
    let mut rng = OsRng;
    let mut nonce = [0u8; 32];
    rng.fill_bytes(&mut nonce);
    let commitment = sha256_multi(&[&point_bytes, &nonce]);

    send_round(transport, &GammaCommit { commitment }).await?;
    let peer_commit: GammaCommit = recv_round(transport).await?;

    send_round(
        transport,
        &GammaReveal {
            gamma_pub: point_bytes,
            nonce,
        },
    )
    .await?;
    let peer_reveal: GammaReveal = recv_round(transport).await?;

    let expected = sha256_multi(&[&peer_reveal.gamma_pub, &peer_reveal.nonce]);
    if expected != peer_commit.commitment {
        return Err(Error::ProofFailed("presign Gamma commitment mismatch"));
    }
    Ok(peer_reveal.gamma_pub)
}

/// Run the presignature ceremony to completion.
pub async fn presign<T: Transport>(config: &EcdsaConfig, transport: &mut T) -> Result<PreSignature> {
    let mut rng = OsRng;
    let kappa = Scalar::random(&mut rng);
    let gamma = Scalar::random(&mut rng);
    let gamma_point = (ProjectivePoint::GENERATOR * gamma).to_affine();
    let gamma_pub: [u8; 33] = gamma_point
        .to_encoded_point(true)
        .as_bytes()
        .try_into()
        .expect("compressed point is 33 bytes");

    let peer_gamma_pub = commit_reveal_point(transport, gamma_pub).await?;
    let peer_gamma_point = k256::PublicKey::from_sec1_bytes(&peer_gamma_pub)
        .map_err(|e| sigil_core::Error::Crypto(format!("invalid Gamma point: {e}")))?;
    let aggregate_gamma = ProjectivePoint::from(gamma_point) + ProjectivePoint::from(*peer_gamma_point.as_affine());

    let c_kappa = mta_initiate(&config.paillier_sk, &kappa, &mut rng);
    send_round(
        transport,
        &KappaCipher {
            ciphertext: c_kappa,
        },
    )
    .await?;
    let peer_kappa: KappaCipher = recv_round(transport).await?;

    let (gamma_cross, beta_delta) = mta_respond(
        &config.counterparty_paillier_pk,
        &peer_kappa.ciphertext,
        &gamma,
        &mut rng,
    );
    let (x_cross, beta_sigma) = mta_respond(
        &config.counterparty_paillier_pk,
        &peer_kappa.ciphertext,
        &config.secret_share,
        &mut rng,
    );
    send_round(
        transport,
        &MtaResponse {
            gamma_cross,
            x_cross,
        },
    )
    .await?;
    let peer_response: MtaResponse = recv_round(transport).await?;

    let alpha_delta = mta_finalize(&config.paillier_sk, &peer_response.gamma_cross)?;
    let alpha_sigma = mta_finalize(&config.paillier_sk, &peer_response.x_cross)?;

    let delta_self = kappa * gamma + alpha_delta + beta_delta;
    let sigma_self = kappa * config.secret_share + alpha_sigma + beta_sigma;

    send_round(
        transport,
        &DeltaReveal {
            delta: delta_self.to_bytes().into(),
        },
    )
    .await?;
    let peer_delta: DeltaReveal = recv_round(transport).await?;
    let peer_delta_scalar = Option::<Scalar>::from(Scalar::from_repr(peer_delta.delta.into()))
        .ok_or(Error::ProofFailed("peer delta out of range"))?;

    let delta = delta_self + peer_delta_scalar;
    let delta_inv =
        Option::<Scalar>::from(delta.invert()).ok_or(Error::ProofFailed("delta is not invertible"))?;

    let r_point = (aggregate_gamma * delta_inv).to_affine();
    let encoded = r_point.to_encoded_point(false);
    let x = encoded.x().ok_or(Error::ProofFailed("R has no x-coordinate"))?;
    let y = encoded.y().ok_or(Error::ProofFailed("R has no y-coordinate"))?;
    let mut r = [0u8; 32];
    r.copy_from_slice(x.as_slice());

    let presig = PreSignature {
        r,
        r_y_is_odd: y[31] & 1 == 1,
        kappa,
        sigma: sigma_self,
    };
    if !presig.validate() {
        return Err(Error::InvalidPreSignature);
    }
    Ok(presig)
}
