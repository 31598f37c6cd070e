//! The per-party exchange coordinator (§4.5): wires `sigil-cmp` and
//! `sigil-frost` together over a [`sigil_transport::Transport`] and an
//! escrow HTTP client into the single `INIT..DONE`/`FAILED` state
//! machine each party runs independently.

pub mod chain;
pub mod coordinator;
pub mod error;
pub mod escrow_client;
pub mod stage;
pub mod wire;

pub use chain::{ChainError, ChainOracle, NullOracle};
pub use coordinator::{
    build_own_withdrawal, cosign, escrow_post, exchange_wishes, fund_wait, init_handshake, keygen,
    run_exchange, ExchangeOutcome, ExchangeParams,
};
pub use error::{Error, Failure, Result};
pub use escrow_client::EscrowClient;
pub use stage::Stage;
pub use wire::{TokenType, TxWithdrawal};
