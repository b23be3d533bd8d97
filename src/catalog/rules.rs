//! Match-wide rules: zone layout and the game-start / turn action lists.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::zone::ZoneKind;

/// A zone every player gets at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ZoneDefinition {
    pub name: String,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub is_private: bool,
    pub kind: ZoneKind,
}

impl ZoneDefinition {
    pub fn new(name: impl Into<String>, kind: ZoneKind, is_private: bool) -> Self {
        Self {
            name: name.into(),
            is_private,
            kind,
        }
    }

    pub fn static_zone(name: impl Into<String>, is_private: bool) -> Self {
        Self::new(name, ZoneKind::Static, is_private)
    }

    pub fn dynamic_zone(name: impl Into<String>) -> Self {
        Self::new(name, ZoneKind::Dynamic, false)
    }
}

/// Which players a scheduled action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PlayerSubset {
    CurrentPlayer,
    CurrentOpponents,
    AllPlayers,
}

/// An action run at game start, turn start, or turn end.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum GameAction {
    IncreaseAttribute { attribute: String, value: i32 },
    DecreaseAttribute { attribute: String, value: i32 },
    SetAttribute { attribute: String, value: i32 },
    MoveCards { from: String, to: String, count: u32 },
    ShuffleZone { zone: String },
}

impl GameAction {
    /// Zone names this action refers to.
    pub fn zones(&self) -> Vec<&str> {
        match self {
            GameAction::MoveCards { from, to, .. } => vec![from, to],
            GameAction::ShuffleZone { zone } => vec![zone],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ScheduledAction {
    pub target: PlayerSubset,
    pub action: GameAction,
}

impl ScheduledAction {
    pub fn new(target: PlayerSubset, action: GameAction) -> Self {
        Self { target, action }
    }
}
