//! Dealerless 2-of-2 FROST taproot key generation (§4.4 `keygen_taproot`).
//!
//! Generalizes the teacher's `DkgCeremony`/`part1`/`part2`/`part3` flow
//! from its N-of-M agent/child hierarchy down to exactly two fixed
//! participants, driven directly over a `Transport` instead of
//! QR-code-relayed disk packages.

use std::collections::BTreeMap;

use frost_secp256k1_tr::keys::dkg::{part1, part2, part3};
use frost_secp256k1_tr::keys::{KeyPackage, PublicKeyPackage};
use frost_secp256k1_tr::Identifier;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use sigil_transport::Transport;

use crate::error::{Error, Result};
use crate::wire::{recv_round, send_round};

/// A party's half of a completed 2-of-2 FROST taproot key generation.
pub struct FrostTaprootConfig {
    /// 32-byte BIP-340 x-only group verifying key.
    pub pub_key: [u8; 32],
    pub(crate) key_package: KeyPackage,
    pub(crate) pubkey_package: PublicKeyPackage,
}

#[derive(Serialize, Deserialize)]
struct Round1Wire {
    package: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct Round2Wire {
    package: Vec<u8>,
}

fn identifier(id: u16) -> Result<Identifier> {
    Identifier::try_from(id).map_err(|e| Error::Protocol(e.to_string()))
}

/// A FROST-taproot verifying key's native encoding is either a 32-byte
/// x-only point or a 33-byte compressed SEC1 point depending on
/// library version; normalize to the 32-byte x-only form BIP-341
/// expects.
fn x_only(bytes: &[u8]) -> Result<[u8; 32]> {
    match bytes.len() {
        32 => {
            let mut out = [0u8; 32];
            out.copy_from_slice(bytes);
            Ok(out)
        }
        33 => {
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes[1..]);
            Ok(out)
        }
        n => Err(Error::Protocol(format!(
            "unexpected taproot verifying key length {n}"
        ))),
    }
}

/// Run the dealerless 2-of-2 DKG ceremony to completion. `self_id` and
/// `peer_id` must be `1` and `2` in some order, agreed on out of band.
pub async fn keygen_taproot<T: Transport>(
    self_id: u16,
    peer_id: u16,
    transport: &mut T,
) -> Result<FrostTaprootConfig> {
    let mut rng = OsRng;
    let my_id = identifier(self_id)?;
    let their_id = identifier(peer_id)?;

    let (round1_secret, round1_package) =
        part1(my_id, 2, 2, &mut rng).map_err(|e| Error::Protocol(e.to_string()))?;

    send_round(
        transport,
        &Round1Wire {
            package: round1_package
                .serialize()
                .map_err(|e| Error::Protocol(e.to_string()))?,
        },
    )
    .await?;
    let peer_round1: Round1Wire = recv_round(transport).await?;
    let peer_round1_package =
        frost_secp256k1_tr::keys::dkg::round1::Package::deserialize(&peer_round1.package)
            .map_err(|e| Error::Protocol(e.to_string()))?;

    let mut round1_packages = BTreeMap::new();
    round1_packages.insert(their_id, peer_round1_package);

    let (round2_secret, round2_packages) =
        part2(round1_secret, &round1_packages).map_err(|e| Error::Protocol(e.to_string()))?;
    let round2_package = round2_packages
        .get(&their_id)
        .ok_or_else(|| Error::Protocol("missing round2 package for counterparty".to_string()))?;

    send_round(
        transport,
        &Round2Wire {
            package: round2_package
                .serialize()
                .map_err(|e| Error::Protocol(e.to_string()))?,
        },
    )
    .await?;
    let peer_round2: Round2Wire = recv_round(transport).await?;
    let peer_round2_package =
        frost_secp256k1_tr::keys::dkg::round2::Package::deserialize(&peer_round2.package)
            .map_err(|e| Error::Protocol(e.to_string()))?;

    let mut round2_packages_in = BTreeMap::new();
    round2_packages_in.insert(their_id, peer_round2_package);

    let (key_package, pubkey_package) = part3(&round2_secret, &round1_packages, &round2_packages_in)
        .map_err(|e| Error::Protocol(e.to_string()))?;

    let vk_bytes = pubkey_package
        .verifying_key()
        .serialize()
        .map_err(|e| Error::Protocol(e.to_string()))?;

    Ok(FrostTaprootConfig {
        pub_key: x_only(&vk_bytes)?,
        key_package,
        pubkey_package,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_transport::InProcessTransport;

    #[tokio::test]
    async fn both_parties_agree_on_the_same_group_key() {
        let (mut a, mut b) = InProcessTransport::pair();
        let (cfg_a, cfg_b) =
            tokio::join!(keygen_taproot(1, 2, &mut a), keygen_taproot(2, 1, &mut b));
        let cfg_a = cfg_a.unwrap();
        let cfg_b = cfg_b.unwrap();
        assert_eq!(cfg_a.pub_key, cfg_b.pub_key);
    }
}
