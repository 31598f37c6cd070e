//! HTTP client for `POST /v1/escrow` (§4.5 `ESCROW_POST`, §6 wire
//! format), including the 5-second polling loop the coordinator uses
//! to wait for its counterparty's deposit.

use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sigil_core::party::ExchangeId;
use sigil_core::Algorithm;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct EscrowRequest<'a> {
    alg: &'a str,
    id: &'a str,
    #[serde(rename = "pub")]
    pub_b64: String,
    hash: String,
    sig: String,
}

#[derive(Deserialize)]
struct EscrowResponse {
    signature: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    errors: Vec<String>,
}

pub struct EscrowClient {
    base_url: String,
    http: reqwest::Client,
}

impl EscrowClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// A single `POST /v1/escrow`. Returns `Some(counterpart_sig)` on a
    /// `200`, `None` on a `204`.
    async fn post_once(
        &self,
        alg: Algorithm,
        id: &ExchangeId,
        pub_key: &[u8],
        hash: &[u8; 32],
        sig: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        let body = EscrowRequest {
            alg: alg.as_wire_str(),
            id: id.as_str(),
            pub_b64: base64::engine::general_purpose::STANDARD.encode(pub_key),
            hash: base64::engine::general_purpose::STANDARD.encode(hash),
            sig: base64::engine::general_purpose::STANDARD.encode(sig),
        };

        let response = self
            .http
            .post(format!("{}/v1/escrow", self.base_url))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let parsed: EscrowResponse = response.json().await?;
                let sig = base64::engine::general_purpose::STANDARD
                    .decode(&parsed.signature)
                    .map_err(|_| Error::EscrowRejected("signature field is not valid base64".into()))?;
                Ok(Some(sig))
            }
            reqwest::StatusCode::NO_CONTENT => Ok(None),
            status => {
                let reason = response
                    .json::<ErrorResponse>()
                    .await
                    .map(|e| e.errors.join("; "))
                    .unwrap_or_else(|_| status.to_string());
                Err(Error::EscrowRejected(reason))
            }
        }
    }

    /// Deposit the caller's own flower, then poll with `sig=""` every
    /// 5 seconds (§5) until the escrow pollinates and releases the
    /// counterparty's signature.
    pub async fn post_and_await_release(
        &self,
        alg: Algorithm,
        id: &ExchangeId,
        pub_key: &[u8],
        hash: &[u8; 32],
        sig: &[u8],
    ) -> Result<Vec<u8>> {
        if let Some(released) = self.post_once(alg, id, pub_key, hash, sig).await? {
            return Ok(released);
        }
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            debug!(exchange_id = %id, "polling escrow for counterpart release");
            if let Some(released) = self.post_once(alg, id, pub_key, hash, &[]).await? {
                return Ok(released);
            }
        }
    }
}
