//! `POST /v1/escrow` (§4.6, §6 wire format).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sigil_core::party::ExchangeId;
use sigil_core::Algorithm;

use crate::pairing::Flower;
use crate::state::EscrowState;

#[derive(Debug, Deserialize)]
pub struct EscrowRequest {
    pub alg: String,
    pub id: String,
    #[serde(rename = "pub")]
    pub pub_b64: String,
    pub hash: String,
    pub sig: String,
}

#[derive(Debug, Serialize)]
pub struct EscrowResponse {
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

fn bad_request(reason: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            errors: vec![reason.into()],
        }),
    )
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn post_escrow(
    State(state): State<EscrowState>,
    Json(req): Json<EscrowRequest>,
) -> impl IntoResponse {
    let alg = match Algorithm::from_wire_str(&req.alg) {
        Ok(a) => a,
        Err(e) => return bad_request(e.to_string()).into_response(),
    };

    let exchange_id = match ExchangeId::from_raw(req.id.clone()) {
        Ok(id) => id,
        Err(e) => return bad_request(e.to_string()).into_response(),
    };

    let pub_key = match base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &req.pub_b64) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => return bad_request("pub must not be empty").into_response(),
        Err(_) => return bad_request("pub is not valid base64").into_response(),
    };

    let hash_bytes = match base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &req.hash) {
        Ok(bytes) => bytes,
        Err(_) => return bad_request("hash is not valid base64").into_response(),
    };
    let hash: [u8; 32] = match hash_bytes.try_into() {
        Ok(h) => h,
        Err(bytes) => {
            return bad_request(format!("hash must be 32 bytes, got {}", bytes.len())).into_response()
        }
    };

    let sig = if req.sig.is_empty() {
        Vec::new()
    } else {
        match base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &req.sig) {
            Ok(bytes) => bytes,
            Err(_) => return bad_request("sig is not valid base64").into_response(),
        }
    };

    let lock = state.lock_for(&exchange_id).await;
    let mut pairing = lock.lock().await;

    pairing.add_flower(Flower {
        alg,
        pub_key: pub_key.clone(),
        hash,
        sig,
    });

    let pollinated = match pairing.pollinated() {
        Ok(p) => p,
        Err(e) => {
            warn!(exchange_id = %exchange_id, error = %e, "verification error while checking pollination");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    errors: vec![e.to_string()],
                }),
            )
                .into_response();
        }
    };

    if pollinated {
        if let Some(counterpart_sig) = pairing.counterpart_signature(&pub_key) {
            info!(exchange_id = %exchange_id, "pairing pollinated, returning counterpart signature");
            return (
                StatusCode::OK,
                Json(EscrowResponse {
                    signature: base64::Engine::encode(
                        &base64::engine::general_purpose::STANDARD,
                        counterpart_sig,
                    ),
                }),
            )
                .into_response();
        }
    }

    StatusCode::NO_CONTENT.into_response()
}
