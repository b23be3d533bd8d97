//! Engine configuration.
//!
//! Everything here is a per-deployment knob, not rule data: rule data lives in
//! the [`Catalog`](crate::catalog::Catalog). Every field has a default, so an
//! empty JSON object is a valid config.

use std::time::Duration;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Engine-wide settings for a match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct EngineConfig {
    /// Turn length in seconds.
    pub turn_duration_secs: u64,
    pub max_hand_size: usize,
    /// Ceiling on nested trigger firings within one entry point.
    pub max_cascade_depth: usize,
    /// End-of-turn events between a kill and the physical destruction.
    pub destruction_delay_turns: u32,
    pub players_per_match: usize,
    /// Seed for the match RNG; entropy when unset.
    pub rng_seed: Option<u64>,
    pub deck_zone: String,
    pub hand_zone: String,
    pub board_zone: String,
    pub graveyard_zone: Option<String>,
    /// Player attribute whose reaching zero ends the match (checked by the runtime).
    pub defeat_attribute: Option<String>,
    /// Permanent effect that shields a card from avoidable effects.
    pub untargetable_effect: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_duration_secs: 60,
            max_hand_size: 7,
            max_cascade_depth: 64,
            destruction_delay_turns: 3,
            players_per_match: 2,
            rng_seed: None,
            deck_zone: "Deck".to_string(),
            hand_zone: "Hand".to_string(),
            board_zone: "Board".to_string(),
            graveyard_zone: Some("Graveyard".to_string()),
            defeat_attribute: None,
            untargetable_effect: None,
        }
    }
}

impl EngineConfig {
    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_duration_secs)
    }

    #[cfg(feature = "serialization")]
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
