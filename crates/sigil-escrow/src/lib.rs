//! Semi-trusted escrow box mediating a two-party signature exchange
//! (§4.6): a single `POST /v1/escrow` operation over per-`ExchangeID`
//! pairings of at most two `Flower`s, never seeing either party's key
//! shares.

pub mod error;
pub mod handler;
pub mod pairing;
pub mod state;

pub use error::{Error, Result};
pub use pairing::{Flower, Pairing};
pub use state::EscrowState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the escrow's axum router, matching the teacher's
/// `sigil-bridge::main` wiring shape.
pub fn router(state: EscrowState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/escrow", post(handler::post_escrow))
        .route("/health", get(handler::health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
