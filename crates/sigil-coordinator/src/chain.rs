//! The on-chain adapter boundary (§1 Non-goals, §4.5 `FUND_WAIT`/`RELEASE`).
//!
//! On-chain transaction construction, broadcast, fee selection, and
//! confirmation tracking are explicitly out of this core's scope — only
//! the trait boundary lives here. A real deployment supplies its own
//! [`ChainOracle`] per chain (a Bitcoin UTXO watcher, an Ethereum JSON-RPC
//! client); this crate only needs to know when to stop waiting and where
//! to hand off a signed transaction.

use async_trait::async_trait;

use crate::wire::TokenType;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("chain oracle error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// External collaborator watching one chain's confirmations and
/// broadcasting completed withdrawal transactions.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    /// Block until `address` has been funded to at least `value` on
    /// `token_type`'s chain, per the default/per-chain re-poll cadence
    /// of §5 (12 s Eth, 10 min Btc), or return an error after the 300 s
    /// default balance-wait timeout.
    async fn wait_for_funding(&self, token_type: TokenType, address: &str, value: i64) -> Result<()>;

    /// Attach `signature` to the withdrawal transaction identified by
    /// `digest` and broadcast it, returning the resulting transaction id.
    async fn broadcast(
        &self,
        token_type: TokenType,
        digest: &[u8; 32],
        signature: &[u8],
    ) -> Result<String>;
}

/// A no-op oracle for tests and for operators who broadcast manually
/// out of band: funding is assumed already present, and broadcast just
/// reports a synthetic id rather than touching any network.
pub struct NullOracle;

#[async_trait]
impl ChainOracle for NullOracle {
    async fn wait_for_funding(&self, _token_type: TokenType, _address: &str, _value: i64) -> Result<()> {
        Ok(())
    }

    async fn broadcast(
        &self,
        _token_type: TokenType,
        _digest: &[u8; 32],
        _signature: &[u8],
    ) -> Result<String> {
        Ok("unbroadcast".to_string())
    }
}
