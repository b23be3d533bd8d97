//! Events the engine raises against live cards.

use crate::ids::{CardId, PlayerId};

use super::{Direction, TurnPhase};
use super::condition::ComparisonOp;

/// Something that happened, checked against every candidate effect's trigger.
///
/// Player-side events carry the acting player so that owner/opponent source
/// filters can be resolved per card. Card-side events are only ever raised on
/// the card they happened to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    PlayerLifecycle {
        phase: TurnPhase,
        player: PlayerId,
    },
    PlayerAttributeDelta {
        direction: Direction,
        attribute: String,
        player: PlayerId,
    },
    PlayerPlayedCard {
        player: PlayerId,
        card: CardId,
        card_type: String,
    },
    CardZoneTransition {
        direction: Direction,
        zone: String,
    },
    CardAttributeDelta {
        direction: Direction,
        attribute: String,
    },
    CardAttributeCompare {
        op: ComparisonOp,
        attribute: String,
        value: i32,
    },
    CardAttacked,
    TurnCount {
        turns_in_play: u32,
    },
}

impl TriggerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TriggerEvent::PlayerLifecycle { .. } => "PlayerLifecycle",
            TriggerEvent::PlayerAttributeDelta { .. } => "PlayerAttributeDelta",
            TriggerEvent::PlayerPlayedCard { .. } => "PlayerPlayedCard",
            TriggerEvent::CardZoneTransition { .. } => "CardZoneTransition",
            TriggerEvent::CardAttributeDelta { .. } => "CardAttributeDelta",
            TriggerEvent::CardAttributeCompare { .. } => "CardAttributeCompare",
            TriggerEvent::CardAttacked => "CardAttacked",
            TriggerEvent::TurnCount { .. } => "TurnCount",
        }
    }
}
