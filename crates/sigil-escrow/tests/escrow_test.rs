//! End-to-end exercise of the escrow's axum router over in-process
//! HTTP requests, mirroring the cross-asset pollination invariant
//! (§4.5): each party deposits the signature that authorizes the
//! *other* party's withdrawal.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde_json::{json, Value};
use tower::ServiceExt;

use sigil_escrow::{router, EscrowState};

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Produce an escrow-native ECDSA "sig": 33-byte compressed nonce
/// point `R` followed by the 32-byte scalar `s`.
fn native_sig(signing_key: &SigningKey, digest: &[u8; 32]) -> Vec<u8> {
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

#[tokio::test]
async fn two_parties_pollinate_and_receive_each_others_signature() {
    let app = router(EscrowState::new());

    let alice_key = SigningKey::random(&mut OsRng);
    let bob_key = SigningKey::random(&mut OsRng);
    let alice_pub = VerifyingKey::from(&alice_key).to_encoded_point(true);
    let bob_pub = VerifyingKey::from(&bob_key).to_encoded_point(true);

    let alice_hash = [1u8; 32]; // digest of Alice's withdrawal tx
    let bob_hash = [2u8; 32]; // digest of Bob's withdrawal tx

    // Each party deposits the signature authorizing the *other's* withdrawal.
    let sig_for_bob = native_sig(&alice_key, &bob_hash);
    let sig_for_alice = native_sig(&bob_key, &alice_hash);

    let (status, body) = post(
        &app,
        json!({
            "alg": "ecdsa",
            "id": "exchange-1",
            "pub": b64(alice_pub.as_bytes()),
            "hash": b64(&alice_hash),
            "sig": "",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = post(
        &app,
        json!({
            "alg": "ecdsa",
            "id": "exchange-1",
            "pub": b64(bob_pub.as_bytes()),
            "hash": b64(&bob_hash),
            "sig": "",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Alice deposits the signature for Bob's withdrawal; not yet pollinated.
    let (status, _) = post(
        &app,
        json!({
            "alg": "ecdsa",
            "id": "exchange-1",
            "pub": b64(alice_pub.as_bytes()),
            "hash": b64(&alice_hash),
            "sig": b64(&sig_for_bob),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Bob deposits the signature for Alice's withdrawal; now pollinated.
    let (status, body) = post(
        &app,
        json!({
            "alg": "ecdsa",
            "id": "exchange-1",
            "pub": b64(bob_pub.as_bytes()),
            "hash": b64(&bob_hash),
            "sig": b64(&sig_for_alice),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let returned_sig = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(returned_sig, sig_for_bob);

    // Alice polling afterward (empty sig probe) gets her counterpart's signature too.
    let (status, body) = post(
        &app,
        json!({
            "alg": "ecdsa",
            "id": "exchange-1",
            "pub": b64(alice_pub.as_bytes()),
            "hash": b64(&alice_hash),
            "sig": "",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let returned_sig = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(returned_sig, sig_for_alice);
}

#[tokio::test]
async fn unknown_algorithm_is_rejected() {
    let app = router(EscrowState::new());
    let (status, body) = post(
        &app,
        json!({
            "alg": "rsa",
            "id": "exchange-2",
            "pub": b64(b"whatever"),
            "hash": b64(&[0u8; 32]),
            "sig": "",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().contains("rsa"));
}

#[tokio::test]
async fn wrong_signature_does_not_pollinate() {
    let app = router(EscrowState::new());

    let alice_key = SigningKey::random(&mut OsRng);
    let bob_key = SigningKey::random(&mut OsRng);
    let alice_pub = VerifyingKey::from(&alice_key).to_encoded_point(true);
    let bob_pub = VerifyingKey::from(&bob_key).to_encoded_point(true);
    let alice_hash = [9u8; 32];
    let bob_hash = [8u8; 32];

    post(
        &app,
        json!({"alg": "ecdsa", "id": "ex3", "pub": b64(alice_pub.as_bytes()), "hash": b64(&alice_hash), "sig": ""}),
    )
    .await;
    post(
        &app,
        json!({"alg": "ecdsa", "id": "ex3", "pub": b64(bob_pub.as_bytes()), "hash": b64(&bob_hash), "sig": ""}),
    )
    .await;

    // Bob deposits a signature over the wrong digest (won't verify against Alice's hash).
    let garbage_sig = native_sig(&bob_key, &[0xffu8; 32]);
    post(
        &app,
        json!({"alg": "ecdsa", "id": "ex3", "pub": b64(bob_pub.as_bytes()), "hash": b64(&bob_hash), "sig": b64(&garbage_sig)}),
    )
    .await;
    let alice_sig = native_sig(&alice_key, &bob_hash);
    let (status, _) = post(
        &app,
        json!({"alg": "ecdsa", "id": "ex3", "pub": b64(alice_pub.as_bytes()), "hash": b64(&alice_hash), "sig": b64(&alice_sig)}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn replay_against_a_pollinated_pair_is_ignored() {
    let app = router(EscrowState::new());

    let alice_key = SigningKey::random(&mut OsRng);
    let bob_key = SigningKey::random(&mut OsRng);
    let carol_key = SigningKey::random(&mut OsRng);
    let alice_pub = VerifyingKey::from(&alice_key).to_encoded_point(true);
    let bob_pub = VerifyingKey::from(&bob_key).to_encoded_point(true);
    let carol_pub = VerifyingKey::from(&carol_key).to_encoded_point(true);
    let alice_hash = [3u8; 32];
    let bob_hash = [4u8; 32];

    let sig_for_bob = native_sig(&alice_key, &bob_hash);
    let sig_for_alice = native_sig(&bob_key, &alice_hash);

    post(&app, json!({"alg": "ecdsa", "id": "ex4", "pub": b64(alice_pub.as_bytes()), "hash": b64(&alice_hash), "sig": b64(&sig_for_bob)})).await;
    let (status, _) = post(&app, json!({"alg": "ecdsa", "id": "ex4", "pub": b64(bob_pub.as_bytes()), "hash": b64(&bob_hash), "sig": b64(&sig_for_alice)})).await;
    assert_eq!(status, StatusCode::OK);

    // A third party posts under the same exID; the existing pair is untouched.
    let (status, _) = post(&app, json!({"alg": "ecdsa", "id": "ex4", "pub": b64(carol_pub.as_bytes()), "hash": b64(&[5u8; 32]), "sig": ""})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Alice still gets her counterpart signature, unaffected by Carol's post.
    let (status, body) = post(&app, json!({"alg": "ecdsa", "id": "ex4", "pub": b64(alice_pub.as_bytes()), "hash": b64(&alice_hash), "sig": ""})).await;
    assert_eq!(status, StatusCode::OK);
    let returned_sig = base64::engine::general_purpose::STANDARD
        .decode(body["signature"].as_str().unwrap())
        .unwrap();
    assert_eq!(returned_sig, sig_for_bob);
}
