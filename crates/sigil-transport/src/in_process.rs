//! In-process transport for tests and the end-to-end harness: two
//! crossed unbounded channels, no network involved.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{Error, Message, Result, Transport};

/// One side of a crossed pair of unbounded channels. `pair()` builds
/// both sides at once so that sends from one become `next()`s on the
/// other, preserving per-direction FIFO order.
pub struct InProcessTransport {
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    closed: bool,
}

impl InProcessTransport {
    /// Build a crossed pair: `a`'s sends arrive on `b`'s `next()` and
    /// vice versa.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                closed: false,
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                closed: false,
            },
        )
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send(&self, msg: Message) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        // The receiver half may already be dropped; that's the peer's
        // problem to discover via its own `next()`, not ours to report.
        let _ = self.tx.send(msg);
        Ok(())
    }

    async fn next(&mut self) -> Result<Option<Message>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rx.recv().await)
    }

    async fn done(&mut self) {
        self.closed = true;
        self.rx.close();
    }
}
