//! Inter-peer wire structures carried over the [`Transport`] during
//! `EXCHANGE_WISHES` and `COSIGN` (§6), plus the bincode-over-transport
//! round plumbing shared by both, mirroring `sigil-cmp::wire` and
//! `sigil-frost::wire`.

use serde::{Deserialize, Serialize};

use sigil_core::Algorithm;
use sigil_transport::{Message, Transport};

use crate::error::{Error, Result};

/// Which chain a party's own jointly-controlled address is funded in,
/// and therefore which threshold scheme signs that address's spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    Btc,
    Eth,
}

impl TokenType {
    /// The threshold scheme that signs this side's jointly-controlled
    /// address: ECDSA for ETH, FROST/Schnorr for BTC (§4.5, §6).
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TokenType::Eth => Algorithm::Ecdsa,
            TokenType::Btc => Algorithm::Schnorr,
        }
    }
}

/// The record each party announces during `EXCHANGE_WISHES` describing
/// its own withdrawal transaction (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxWithdrawal {
    pub id_part: String,
    pub token_type: TokenType,
    pub address: String,
    pub value: i64,
    /// base64 of the 32-byte digest of the withdrawal transaction.
    pub hash: String,
    /// base64 of the serialized CMP incomplete-share message, populated
    /// only by the ECDSA/ETH side; empty on the FROST/BTC side, which
    /// instead completes the interrupted FROST flow live over the
    /// transport during `COSIGN`.
    pub inc_sig: String,
}

impl TxWithdrawal {
    pub fn hash_bytes(&self) -> Result<[u8; 32]> {
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.hash)
            .map_err(|_| Error::Handshake("withdrawal hash is not valid base64"))?;
        bytes
            .try_into()
            .map_err(|_| Error::Handshake("withdrawal hash is not 32 bytes"))
    }

    pub fn inc_sig_bytes(&self) -> Result<Option<[u8; 32]>> {
        if self.inc_sig.is_empty() {
            return Ok(None);
        }
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.inc_sig)
            .map_err(|_| Error::Handshake("inc_sig is not valid base64"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Handshake("inc_sig is not 32 bytes"))?;
        Ok(Some(arr))
    }
}

/// A bare FROST round-2 share handed to the counterparty after the
/// live commitment round, carrying no exploitable secret alone.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FrostShareRound {
    pub share: Vec<u8>,
}

pub(crate) async fn send_round<T: Transport>(transport: &T, round: &impl Serialize) -> Result<()> {
    let bytes = bincode::serialize(round)?;
    transport.send(Message::new(bytes)).await?;
    Ok(())
}

pub(crate) async fn recv_round<T: Transport, M: for<'de> Deserialize<'de>>(
    transport: &mut T,
) -> Result<M> {
    let msg = transport
        .next()
        .await?
        .ok_or(Error::Handshake("transport closed mid-round"))?;
    Ok(bincode::deserialize(msg.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_type_wire_strings_match_spec() {
        assert_eq!(
            serde_json::to_string(&TokenType::Btc).unwrap(),
            "\"BTC\""
        );
        assert_eq!(
            serde_json::to_string(&TokenType::Eth).unwrap(),
            "\"ETH\""
        );
    }

    #[test]
    fn eth_side_signs_with_ecdsa_btc_side_with_schnorr() {
        assert_eq!(TokenType::Eth.algorithm(), Algorithm::Ecdsa);
        assert_eq!(TokenType::Btc.algorithm(), Algorithm::Schnorr);
    }
}
