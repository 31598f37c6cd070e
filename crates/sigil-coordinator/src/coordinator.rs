//! Per-party exchange state machine (§4.5): `INIT -> KEYGEN -> FUND_WAIT
//! -> EXCHANGE_WISHES -> COSIGN -> ESCROW_POST -> RELEASE -> DONE`, with
//! `FAILED` reachable from every stage.
//!
//! Each stage is also exposed as a standalone async function so a
//! caller (or a test) can drive the pipeline incrementally instead of
//! through [`run_exchange`].

use base64::Engine;
use tracing::info;

use sigil_cmp::{EcdsaConfig, PreSignature};
use sigil_core::party::ExchangeId;
use sigil_core::signature::EthereumSignature;
use sigil_core::Algorithm;
use sigil_frost::FrostTaprootConfig;
use sigil_transport::{Message, Transport};

use crate::chain::ChainOracle;
use crate::error::{Error, Failure, Result};
use crate::escrow_client::EscrowClient;
use crate::stage::Stage;
use crate::wire::{recv_round, send_round, FrostShareRound, TokenType, TxWithdrawal};

/// Single round-trip handshake confirming the transport carries live
/// traffic before spending effort on key generation (`INIT -> KEYGEN`).
pub async fn init_handshake<T: Transport>(transport: &mut T) -> Result<()> {
    const PING: &[u8] = b"ping";
    transport.send(Message::new(PING.to_vec())).await?;
    let pong = transport
        .next()
        .await?
        .ok_or(Error::Handshake("transport closed during handshake"))?;
    if pong.as_bytes() != PING {
        return Err(Error::Handshake("unexpected handshake reply"));
    }
    Ok(())
}

/// Run both threshold DKGs and the ECDSA presignature precomputation
/// (`KEYGEN`). FROST has no separate presignature stage (§4.4).
pub async fn keygen<T: Transport>(
    frost_self_id: u16,
    frost_peer_id: u16,
    transport: &mut T,
) -> Result<(EcdsaConfig, PreSignature, FrostTaprootConfig)> {
    let ecdsa_config = sigil_cmp::keygen(transport).await?;
    let ecdsa_presig = sigil_cmp::presign(&ecdsa_config, transport).await?;
    let frost_config = sigil_frost::keygen_taproot(frost_self_id, frost_peer_id, transport).await?;
    Ok((ecdsa_config, ecdsa_presig, frost_config))
}

/// Wait for the party's own jointly-controlled address to be funded
/// (`FUND_WAIT`). Delegates entirely to the external [`ChainOracle`];
/// on-chain watching itself is out of this core's scope (§1).
pub async fn fund_wait<O: ChainOracle>(
    oracle: &O,
    token_type: TokenType,
    address: &str,
    value: i64,
) -> Result<()> {
    oracle.wait_for_funding(token_type, address, value).await?;
    Ok(())
}

/// Build this party's own `TxWithdrawal` announcement. The ECDSA/ETH
/// side populates `inc_sig` with its incomplete CMP share over its own
/// digest; the FROST/BTC side leaves it empty (§6).
pub fn build_own_withdrawal(
    id_part: &str,
    token_type: TokenType,
    address: &str,
    value: i64,
    own_digest: [u8; 32],
    ecdsa_presig: Option<&PreSignature>,
) -> Result<TxWithdrawal> {
    let inc_sig = match token_type {
        TokenType::Eth => {
            let presig = ecdsa_presig.ok_or(Error::Handshake(
                "the ECDSA/ETH side requires a presignature to build inc_sig",
            ))?;
            let share = sigil_cmp::presign_online_incomplete(presig, own_digest)?;
            base64::engine::general_purpose::STANDARD.encode(share)
        }
        TokenType::Btc => String::new(),
    };
    Ok(TxWithdrawal {
        id_part: id_part.to_string(),
        token_type,
        address: address.to_string(),
        value,
        hash: base64::engine::general_purpose::STANDARD.encode(own_digest),
        inc_sig,
    })
}

/// Exchange `TxWithdrawal` announcements and derive the shared
/// `ExchangeID` (`EXCHANGE_WISHES`).
pub async fn exchange_wishes<T: Transport>(
    own: &TxWithdrawal,
    transport: &mut T,
) -> Result<(ExchangeId, TxWithdrawal)> {
    send_round(transport, own).await?;
    let peer: TxWithdrawal = recv_round(transport).await?;
    let exchange_id = ExchangeId::from_id_parts(&own.id_part, &peer.id_part)
        .map_err(|_| Error::DegenerateExchangeId)?;
    Ok((exchange_id, peer))
}

/// Encode an [`EthereumSignature`] in the escrow's native ECDSA wire
/// form: a 33-byte compressed nonce point `R` followed by the 32-byte
/// scalar `s` (not the 65-byte `r || s || v` Ethereum form — see
/// `sigil-escrow::pairing::verify`). `v`, after low-S normalization,
/// already carries the y-parity of the `R` this signature was produced
/// against.
fn ecdsa_to_escrow_wire(sig: &EthereumSignature) -> Vec<u8> {
    let mut out = Vec::with_capacity(65);
    out.push(if sig.v == 1 { 0x03 } else { 0x02 });
    out.extend_from_slice(&sig.r);
    out.extend_from_slice(&sig.s);
    out
}

/// Produce the complete signature authorizing the *counterparty's*
/// withdrawal (`COSIGN`), in escrow wire form, ready to deposit.
///
/// The ECDSA/ETH side combines the FROST/BTC side's live round-2 share
/// with its own to complete the counterparty's taproot signature; the
/// FROST/BTC side combines the counterparty's `inc_sig` with its own
/// ECDSA share to complete the counterparty's ECDSA signature. Both
/// sides participate in the same live round-1 FROST commitment
/// exchange, since FROST's signing package structurally requires both
/// commitments before either share can be computed.
pub async fn cosign<T: Transport>(
    frost_self_id: u16,
    frost_peer_id: u16,
    ecdsa_config: &EcdsaConfig,
    ecdsa_presig: PreSignature,
    frost_config: &FrostTaprootConfig,
    own: &TxWithdrawal,
    peer: &TxWithdrawal,
    transport: &mut T,
) -> Result<Vec<u8>> {
    let frost_digest = match (own.token_type, peer.token_type) {
        (TokenType::Btc, _) => own.hash_bytes()?,
        (_, TokenType::Btc) => peer.hash_bytes()?,
        _ => return Err(Error::Handshake("no party is on the FROST/BTC side")),
    };

    let my_incomplete =
        sigil_frost::sign_taproot_incomplete(frost_self_id, frost_peer_id, frost_config, &frost_digest, transport)
            .await?;
    send_round(
        transport,
        &FrostShareRound {
            share: my_incomplete.share.clone(),
        },
    )
    .await?;
    let peer_share: FrostShareRound = recv_round(transport).await?;

    match own.token_type {
        TokenType::Eth => {
            let sig = sigil_frost::sign_taproot_cosign(
                frost_self_id,
                frost_peer_id,
                frost_config,
                &frost_digest,
                &my_incomplete,
                &peer_share.share,
            )?;
            Ok(sig.to_bytes().to_vec())
        }
        TokenType::Btc => {
            let peer_inc_sig = peer
                .inc_sig_bytes()?
                .ok_or(Error::Handshake("ECDSA/ETH side did not supply inc_sig"))?;
            let peer_hash = peer.hash_bytes()?;
            let sig = sigil_cmp::presign_online_cosign(ecdsa_config, &ecdsa_presig, peer_hash, peer_inc_sig)?;
            Ok(ecdsa_to_escrow_wire(&sig))
        }
    }
}

/// Deposit the completed counterpart signature and poll until the
/// escrow pollinates and releases this party's own signature
/// (`ESCROW_POST` through `RELEASE`).
pub async fn escrow_post(
    escrow: &EscrowClient,
    exchange_id: &ExchangeId,
    own_pub: &[u8],
    own_digest: [u8; 32],
    deposit_sig: &[u8],
    own_alg: Algorithm,
) -> Result<Vec<u8>> {
    escrow
        .post_and_await_release(own_alg, exchange_id, own_pub, &own_digest, deposit_sig)
        .await
}

/// Everything one party needs to drive an exchange end to end.
pub struct ExchangeParams {
    /// The FROST identifier this party uses; must be `1` or `2`, the
    /// opposite of `frost_peer_id`, agreed out of band.
    pub frost_self_id: u16,
    pub frost_peer_id: u16,
    /// Which chain this party's own jointly-controlled address is
    /// funded in.
    pub own_token_type: TokenType,
    /// 16-hex-char identifier this party contributes toward the
    /// `ExchangeID` (§6).
    pub own_id_part: String,
    /// The address this party wants its withdrawal to land at.
    pub own_address: String,
    pub own_value: i64,
    /// Digest of this party's own withdrawal transaction (built and
    /// hashed by the caller — on-chain tx construction is out of
    /// scope, §1).
    pub own_withdrawal_digest: [u8; 32],
    pub escrow_base_url: String,
}

pub struct ExchangeOutcome {
    pub exchange_id: ExchangeId,
    /// The counterparty's deposited signature, authorizing this
    /// party's own withdrawal transaction — ready to attach and
    /// broadcast.
    pub own_released_signature: Vec<u8>,
}

/// Drive one party's side of an exchange through every stage,
/// transitioning to `FAILED` with the originating stage and root cause
/// on any error (§7, §9).
pub async fn run_exchange<T: Transport, O: ChainOracle>(
    params: ExchangeParams,
    transport: &mut T,
    oracle: &O,
) -> std::result::Result<ExchangeOutcome, Failure> {
    info!(stage = %Stage::Init, "starting exchange");
    init_handshake(transport)
        .await
        .map_err(|e| Failure::new(Stage::Init, e))?;

    info!(from = %Stage::Init, to = %Stage::Keygen, "transition");
    let (ecdsa_config, ecdsa_presig, frost_config) =
        keygen(params.frost_self_id, params.frost_peer_id, transport)
            .await
            .map_err(|e| Failure::new(Stage::Keygen, e))?;

    info!(from = %Stage::Keygen, to = %Stage::FundWait, "transition");
    fund_wait(
        oracle,
        params.own_token_type,
        &params.own_address,
        params.own_value,
    )
    .await
    .map_err(|e| Failure::new(Stage::FundWait, e))?;

    info!(from = %Stage::FundWait, to = %Stage::ExchangeWishes, "transition");
    let own_tx = build_own_withdrawal(
        &params.own_id_part,
        params.own_token_type,
        &params.own_address,
        params.own_value,
        params.own_withdrawal_digest,
        Some(&ecdsa_presig),
    )
    .map_err(|e| Failure::new(Stage::ExchangeWishes, e))?;

    let (exchange_id, peer_tx) = exchange_wishes(&own_tx, transport)
        .await
        .map_err(|e| Failure::new(Stage::ExchangeWishes, e))?;

    info!(exchange_id = %exchange_id, from = %Stage::ExchangeWishes, to = %Stage::Cosign, "transition");
    let deposit_sig = cosign(
        params.frost_self_id,
        params.frost_peer_id,
        &ecdsa_config,
        ecdsa_presig,
        &frost_config,
        &own_tx,
        &peer_tx,
        transport,
    )
    .await
    .map_err(|e| Failure::new(Stage::Cosign, e))?;

    info!(exchange_id = %exchange_id, from = %Stage::Cosign, to = %Stage::EscrowPost, "transition");
    let own_pub: Vec<u8> = match params.own_token_type {
        TokenType::Eth => ecdsa_config.public_key.to_vec(),
        TokenType::Btc => frost_config.pub_key.to_vec(),
    };
    let escrow = EscrowClient::new(params.escrow_base_url.clone());
    let released = escrow_post(
        &escrow,
        &exchange_id,
        &own_pub,
        params.own_withdrawal_digest,
        &deposit_sig,
        params.own_token_type.algorithm(),
    )
    .await
    .map_err(|e| Failure::new(Stage::EscrowPost, e))?;

    info!(exchange_id = %exchange_id, from = %Stage::EscrowPost, to = %Stage::Release, "transition");
    info!(exchange_id = %exchange_id, stage = %Stage::Done, "exchange complete");

    Ok(ExchangeOutcome {
        exchange_id,
        own_released_signature: released,
    })
}
