//! Identifier newtypes shared across the engine.
//!
//! Unlike catalog names (plain strings), these are the handles the transport and
//! the hosting application hold on to. Live-card handles are minted by the
//! [`SpawnFactory`](crate::spawn::SpawnFactory) the match was created with, so the
//! engine never reaches for process-wide counters.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Player identifier, index-based (registration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PlayerId(pub u8);

/// Catalog identifier of one card design (the "identifier-only" form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CardId(pub u32);

/// Handle of a spawned, mutable card instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LiveCardId(pub u64);

/// Transport-level connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ConnectionId(pub u64);

/// Per-entity network handle handed out at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct NetHandle(pub u32);

impl PlayerId {
    /// Create a player ID from a registration index.
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl CardId {
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

impl LiveCardId {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

impl std::fmt::Display for LiveCardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "live#{}", self.0)
    }
}
