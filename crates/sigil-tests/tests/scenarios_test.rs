//! Concrete end-to-end exchange scenarios (§8 Scenarios A–F), driven
//! over `InProcessTransport` and the escrow box's axum `Router` via
//! `tower::ServiceExt::oneshot`, matching axum's own testing idiom —
//! no real socket is opened.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde_json::{json, Value};
use tower::ServiceExt;

use sigil_core::party::ExchangeId;
use sigil_escrow::{router, EscrowState};

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn native_ecdsa_sig(signing_key: &SigningKey, digest: &[u8; 32]) -> Vec<u8> {
    let (signature, recovery_id): (K256Signature, RecoveryId) =
        signing_key.sign_prehash_recoverable(digest).unwrap();
    let prefix = if recovery_id.is_y_odd() { 0x03 } else { 0x02 };
    let mut out = Vec::with_capacity(65);
    out.push(prefix);
    out.extend_from_slice(&signature.r().to_bytes());
    out.extend_from_slice(&signature.s().to_bytes());
    out
}

async fn post(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/escrow")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, parsed)
}

fn envelope(alg: &str, id: &str, pub_key: &[u8], hash: &[u8; 32], sig: &[u8]) -> Value {
    json!({
        "alg": alg,
        "id": id,
        "pub": b64(pub_key),
        "hash": b64(hash),
        "sig": b64(sig),
    })
}

/// Scenario A — Happy ETH↔BTC: both parties deposit the signature
/// authorizing the other's withdrawal and each receives the other's
/// signature back, ready to broadcast.
#[tokio::test]
async fn scenario_a_happy_eth_btc_exchange() {
    let app = router(EscrowState::new());
    let exchange_id = ExchangeId::from_id_parts("pppppppppppppppp", "qqqqqqqqqqqqqqqq").unwrap();

    let p_key = SigningKey::random(&mut OsRng); // P's ECDSA/ETH-side share
    let q_key = SigningKey::random(&mut OsRng); // Q's ECDSA counterpart used here to stand in for Q's own deposit key
    let p_pub = VerifyingKey::from(&p_key).to_encoded_point(true);
    let q_pub = VerifyingKey::from(&q_key).to_encoded_point(true);

    // Hp: digest of P's own withdrawal (EA -> Qe), Hq: digest of Q's (BA -> Pb).
    let hp = [0x10u8; 32];
    let hq = [0x20u8; 32];

    // P deposits the signature authorizing Q's withdrawal (over Hq);
    // Q deposits the signature authorizing P's withdrawal (over Hp).
    let sig_for_q = native_ecdsa_sig(&p_key, &hq);
    let sig_for_p = native_ecdsa_sig(&q_key, &hp);

    let (status, _) = post(
        &app,
        envelope("ecdsa", exchange_id.as_str(), p_pub.as_bytes(), &hp, &sig_for_q),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = post(
        &app,
        envelope("ecdsa", exchange_id.as_str(), q_pub.as_bytes(), &hq, &sig_for_p),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let released = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(released, sig_for_q);

    let (status, body) = post(
        &app,
        envelope("ecdsa", exchange_id.as_str(), p_pub.as_bytes(), &hp, b""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let released = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(released, sig_for_p);
}

/// Scenario B — Probe before counterparty: repeated 204s until the
/// counterparty deposits, then the withheld signature appears.
#[tokio::test]
async fn scenario_b_probe_before_counterparty_arrives() {
    let app = router(EscrowState::new());
    let p_key = SigningKey::random(&mut OsRng);
    let q_key = SigningKey::random(&mut OsRng);
    let p_pub = VerifyingKey::from(&p_key).to_encoded_point(true);
    let q_pub = VerifyingKey::from(&q_key).to_encoded_point(true);
    let hp = [1u8; 32];
    let hq = [2u8; 32];
    let sig_for_q = native_ecdsa_sig(&p_key, &hq);

    let (status, _) = post(&app, envelope("ecdsa", "ex-b", p_pub.as_bytes(), &hp, &sig_for_q)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // P polls several times with an empty probe; Q has not arrived.
    for _ in 0..3 {
        let (status, body) = post(&app, envelope("ecdsa", "ex-b", p_pub.as_bytes(), &hp, b"")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    // Q finally deposits.
    let sig_for_p = native_ecdsa_sig(&q_key, &hp);
    let (status, _) = post(&app, envelope("ecdsa", "ex-b", q_pub.as_bytes(), &hq, &sig_for_p)).await;
    assert_eq!(status, StatusCode::OK);

    // P's next probe now returns Q's signature.
    let (status, body) = post(&app, envelope("ecdsa", "ex-b", p_pub.as_bytes(), &hp, b"")).await;
    assert_eq!(status, StatusCode::OK);
    let released = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(released, sig_for_p);
}

/// Scenario C — Bad deposit: a non-verifying signature never
/// pollinates; a corrected re-deposit does.
#[tokio::test]
async fn scenario_c_bad_deposit_then_corrected() {
    let app = router(EscrowState::new());
    let p_key = SigningKey::random(&mut OsRng);
    let q_key = SigningKey::random(&mut OsRng);
    let p_pub = VerifyingKey::from(&p_key).to_encoded_point(true);
    let q_pub = VerifyingKey::from(&q_key).to_encoded_point(true);
    let hp = [3u8; 32];
    let hq = [4u8; 32];

    // P deposits a signature that does not verify against (q_pub, hq) —
    // it's signed by p_key, the wrong key, over the wrong digest.
    let garbage = native_ecdsa_sig(&p_key, &[0xffu8; 32]);
    let (status, _) = post(&app, envelope("ecdsa", "ex-c", p_pub.as_bytes(), &hp, &garbage)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let sig_for_p = native_ecdsa_sig(&q_key, &hp);
    let (status, _) = post(&app, envelope("ecdsa", "ex-c", q_pub.as_bytes(), &hq, &sig_for_p)).await;
    assert_eq!(status, StatusCode::NO_CONTENT); // not pollinated yet

    // P re-deposits with the correct signature over Hq; pollination flips.
    let sig_for_q = native_ecdsa_sig(&p_key, &hq);
    let (status, body) = post(&app, envelope("ecdsa", "ex-c", p_pub.as_bytes(), &hp, &sig_for_q)).await;
    assert_eq!(status, StatusCode::OK);
    let released = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(released, sig_for_p);
}

/// Scenario D — Aborted exchange: P deposits, Q never arrives; no
/// error, no signature released.
#[tokio::test]
async fn scenario_d_aborted_exchange_leaves_no_release() {
    let app = router(EscrowState::new());
    let p_key = SigningKey::random(&mut OsRng);
    let p_pub = VerifyingKey::from(&p_key).to_encoded_point(true);
    let hp = [5u8; 32];
    let hq = [6u8; 32];
    let sig_for_q = native_ecdsa_sig(&p_key, &hq);

    let (status, _) = post(&app, envelope("ecdsa", "ex-d", p_pub.as_bytes(), &hp, &sig_for_q)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for _ in 0..5 {
        let (status, body) = post(&app, envelope("ecdsa", "ex-d", p_pub.as_bytes(), &hp, b"")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }
}

/// Scenario E — Identical `id_part`: both parties independently derive
/// the same 16-hex `id_part`; `ExchangeID` derivation must be treated
/// as a fatal protocol error and aborted before depositing.
#[test]
fn scenario_e_identical_id_part_is_rejected_before_deposit() {
    let id_part = "ffffffffffffffff";
    assert!(ExchangeId::from_id_parts(id_part, id_part).is_err());
}

/// Scenario F — Replay against a pollinated pair: a third party's
/// deposit under the same `exID` leaves the existing pair untouched.
#[tokio::test]
async fn scenario_f_replay_against_pollinated_pair_is_ignored() {
    let app = router(EscrowState::new());
    let p_key = SigningKey::random(&mut OsRng);
    let q_key = SigningKey::random(&mut OsRng);
    let carol_key = SigningKey::random(&mut OsRng);
    let p_pub = VerifyingKey::from(&p_key).to_encoded_point(true);
    let q_pub = VerifyingKey::from(&q_key).to_encoded_point(true);
    let carol_pub = VerifyingKey::from(&carol_key).to_encoded_point(true);
    let hp = [7u8; 32];
    let hq = [8u8; 32];

    let sig_for_q = native_ecdsa_sig(&p_key, &hq);
    let sig_for_p = native_ecdsa_sig(&q_key, &hp);
    post(&app, envelope("ecdsa", "ex-f", p_pub.as_bytes(), &hp, &sig_for_q)).await;
    let (status, _) = post(&app, envelope("ecdsa", "ex-f", q_pub.as_bytes(), &hq, &sig_for_p)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &app,
        envelope("ecdsa", "ex-f", carol_pub.as_bytes(), &[9u8; 32], b""),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = post(&app, envelope("ecdsa", "ex-f", p_pub.as_bytes(), &hp, b"")).await;
    assert_eq!(status, StatusCode::OK);
    let released = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(released, sig_for_p);
}
