//! Bidirectional message transport carrying DKG and signing protocol
//! traffic between two named parties (§4.1).
//!
//! The transport is intentionally payload-agnostic: it moves opaque
//! byte blobs and guarantees per-direction FIFO delivery. Protocol
//! framing (rounds, party tags) is the round-based engine's problem,
//! not the transport's.

pub mod error;
pub mod in_process;
pub mod tcp;

pub use error::{Error, Result};

use async_trait::async_trait;

/// A single opaque protocol message moving over a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(pub Vec<u8>);

impl Message {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Named bidirectional message channel between two parties (§4.1).
///
/// `send` is non-blocking and does not require the peer to be
/// connected; `next` blocks until a message is available or the
/// channel is closed, at which point it returns `Ok(None)` forever.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, msg: Message) -> Result<()>;

    async fn next(&mut self) -> Result<Option<Message>>;

    /// Close the channel. Further `next()` calls return `Ok(None)`;
    /// further `send()` calls are a no-op.
    async fn done(&mut self);
}

pub use in_process::InProcessTransport;
pub use tcp::TcpTransport;
