//! Shared bincode-over-`Transport` round plumbing used by keygen,
//! presign, and online-signing.

use serde::{Deserialize, Serialize};

use sigil_transport::{Message, Transport};

use crate::error::{Error, Result};

pub async fn send_round<T: Transport>(transport: &T, round: &impl Serialize) -> Result<()> {
    let bytes = bincode::serialize(round)?;
    transport.send(Message::new(bytes)).await?;
    Ok(())
}

pub async fn recv_round<T: Transport, M: for<'de> Deserialize<'de>>(
    transport: &mut T,
) -> Result<M> {
    let msg = transport
        .next()
        .await?
        .ok_or(Error::BadMessage("transport closed mid-round"))?;
    Ok(bincode::deserialize(msg.as_bytes())?)
}
