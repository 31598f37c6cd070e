//! Per-`ExchangeID` sharded locking (§4.6, §5, §9) so unrelated
//! exchanges never serialize behind one lock.
//!
//! Adapted from the teacher's `Arc<RwLock<AgentStore>>` state-sharing
//! pattern in `sigil-daemon::ipc::server`: an outer `RwLock` guards
//! only the *set of per-exchange locks*, held briefly to fetch or
//! insert one; the actual pairing mutation happens under that
//! exchange's own `tokio::sync::Mutex`, held independently of every
//! other exchange.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use sigil_core::party::ExchangeId;

use crate::pairing::Pairing;

#[derive(Clone, Default)]
pub struct EscrowState {
    pairings: Arc<RwLock<HashMap<ExchangeId, Arc<Mutex<Pairing>>>>>,
}

impl EscrowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (creating if absent) the lock guarding `id`'s pairing.
    pub async fn lock_for(&self, id: &ExchangeId) -> Arc<Mutex<Pairing>> {
        if let Some(lock) = self.pairings.read().await.get(id) {
            return lock.clone();
        }
        let mut pairings = self.pairings.write().await;
        pairings
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Pairing::new())))
            .clone()
    }
}
