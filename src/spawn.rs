//! Live-card spawning.
//!
//! The hosting application owns whatever renderable object stands behind a
//! live card; the engine only needs a unique handle for it.

use crate::catalog::CardInstance;
use crate::ids::{LiveCardId, PlayerId};

/// Produces live-card handles for spawned cards.
pub trait SpawnFactory {
    /// Spawn a live object for `card` owned by `owner` and return its handle.
    fn spawn(&mut self, card: &CardInstance, owner: PlayerId) -> LiveCardId;

    /// Release the object behind a handle. Default does nothing.
    fn despawn(&mut self, _card: LiveCardId) {}
}

/// Hands out sequential handles starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialSpawner {
    next: u64,
}

impl SequentialSpawner {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnFactory for SequentialSpawner {
    fn spawn(&mut self, _card: &CardInstance, _owner: PlayerId) -> LiveCardId {
        let id = LiveCardId::from_raw(self.next);
        self.next += 1;
        id
    }
}
