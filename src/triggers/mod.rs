//! Trigger system.
//!
//! ```text
//! triggers/
//!   mod.rs        - Trigger variants and event matching
//!   condition.rs  - Condition variants and AND evaluation
//!   event.rs      - TriggerEvent raised by the engine
//!   check.rs      - is_valid_trigger / is_valid_target evaluators
//! ```
//!
//! Matching is two-staged: [`Trigger::matches`] decides whether an event is of
//! the right shape for a trigger (attribute names, zones, owner relationship),
//! then [`check::is_valid_trigger`] evaluates the effect's trigger conditions.

pub mod check;
pub mod condition;
pub mod event;

pub use check::{
    TriggerContext, can_be_target_of_effect, is_valid_card_target, is_valid_player_target,
    is_valid_trigger,
};
pub use condition::{
    CardSubject, ComparisonOp, Condition, ConditionSubject, all_hold_for_card,
    all_hold_for_player,
};
pub use event::TriggerEvent;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// Turn lifecycle phase for player lifecycle triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TurnPhase {
    TurnStart,
    TurnEnd,
}

/// Which players a player-side trigger listens to, relative to the card owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PlayerSource {
    Owner,
    AnyOpponent,
    AnyPlayer,
}

impl PlayerSource {
    /// Whether an event acted by `actor` concerns a card owned by `owner`.
    pub fn admits(self, owner: PlayerId, actor: PlayerId) -> bool {
        match self {
            PlayerSource::Owner => actor == owner,
            PlayerSource::AnyOpponent => actor != owner,
            PlayerSource::AnyPlayer => true,
        }
    }
}

/// Direction of an attribute delta or zone transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Attribute increased / card entered the zone.
    #[cfg_attr(feature = "serialization", serde(alias = "Enter"))]
    Increase,
    /// Attribute decreased / card left the zone.
    #[cfg_attr(feature = "serialization", serde(alias = "Leave"))]
    Decrease,
}

impl Direction {
    pub const ENTER: Direction = Direction::Increase;
    pub const LEAVE: Direction = Direction::Decrease;
}

/// How a turn-count trigger counts a card's turns in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TurnCountMode {
    /// Fires once, on the turn start where `turns_in_play == n + 1`.
    After,
    /// Fires on every turn start where `turns_in_play % n == 0`.
    Every,
}

/// What causes an effect to fire. Exactly one per effect instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum Trigger {
    PlayerLifecycle {
        phase: TurnPhase,
        source: PlayerSource,
    },
    PlayerAttributeDelta {
        direction: Direction,
        attribute: String,
        #[cfg_attr(feature = "serialization", serde(default = "default_source"))]
        source: PlayerSource,
    },
    PlayerPlayedCard {
        card_type: String,
        #[cfg_attr(feature = "serialization", serde(default = "default_source"))]
        source: PlayerSource,
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
        threshold: i32,
    },
    CardAttacked,
    TurnCount {
        mode: TurnCountMode,
        n: u32,
    },
}

#[cfg(feature = "serialization")]
fn default_source() -> PlayerSource {
    PlayerSource::Owner
}

impl Trigger {
    /// Player-side triggers fan their conditions out over candidate players.
    pub fn player_source(&self) -> Option<PlayerSource> {
        match self {
            Trigger::PlayerLifecycle { source, .. }
            | Trigger::PlayerAttributeDelta { source, .. }
            | Trigger::PlayerPlayedCard { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Which subject the trigger conditions of this trigger are evaluated against.
    pub fn condition_subject(&self) -> ConditionSubject {
        match self {
            Trigger::PlayerLifecycle { .. } | Trigger::PlayerAttributeDelta { .. } => {
                ConditionSubject::Player
            }
            // Conditions look at the last card the candidate played.
            Trigger::PlayerPlayedCard { .. } => ConditionSubject::Card,
            Trigger::CardZoneTransition { .. }
            | Trigger::CardAttributeDelta { .. }
            | Trigger::CardAttributeCompare { .. }
            | Trigger::CardAttacked
            | Trigger::TurnCount { .. } => ConditionSubject::Card,
        }
    }

    /// Check whether `event`, raised on a card owned by `owner`, is one this trigger listens for.
    pub fn matches(&self, event: &TriggerEvent, owner: PlayerId) -> bool {
        match (self, event) {
            (
                Trigger::PlayerLifecycle { phase, source },
                TriggerEvent::PlayerLifecycle {
                    phase: event_phase,
                    player,
                },
            ) => phase == event_phase && source.admits(owner, *player),
            (
                Trigger::PlayerAttributeDelta {
                    direction,
                    attribute,
                    source,
                },
                TriggerEvent::PlayerAttributeDelta {
                    direction: event_direction,
                    attribute: event_attribute,
                    player,
                },
            ) => {
                direction == event_direction
                    && attribute == event_attribute
                    && source.admits(owner, *player)
            }
            (
                Trigger::PlayerPlayedCard { card_type, source },
                TriggerEvent::PlayerPlayedCard {
                    player,
                    card_type: played_type,
                    ..
                },
            ) => card_type == played_type && source.admits(owner, *player),
            (
                Trigger::CardZoneTransition { direction, zone },
                TriggerEvent::CardZoneTransition {
                    direction: event_direction,
                    zone: event_zone,
                },
            ) => direction == event_direction && zone == event_zone,
            (
                Trigger::CardAttributeDelta {
                    direction,
                    attribute,
                },
                TriggerEvent::CardAttributeDelta {
                    direction: event_direction,
                    attribute: event_attribute,
                },
            ) => direction == event_direction && attribute == event_attribute,
            (
                Trigger::CardAttributeCompare {
                    op,
                    attribute,
                    threshold,
                },
                TriggerEvent::CardAttributeCompare {
                    op: event_op,
                    attribute: event_attribute,
                    value,
                },
            ) => op == event_op && attribute == event_attribute && op.holds(*value, *threshold),
            (Trigger::CardAttacked, TriggerEvent::CardAttacked) => true,
            (Trigger::TurnCount { mode, n }, TriggerEvent::TurnCount { turns_in_play }) => {
                match mode {
                    TurnCountMode::After => n.checked_add(1) == Some(*turns_in_play),
                    TurnCountMode::Every => *n > 0 && turns_in_play % n == 0,
                }
            }
            _ => false,
        }
    }

    /// Human-readable description, used in logs.
    pub fn display(&self) -> String {
        match self {
            Trigger::PlayerLifecycle { phase, source } => {
                format!("{phase:?} of {source:?}")
            }
            Trigger::PlayerAttributeDelta {
                direction,
                attribute,
                source,
            } => format!("{source:?} {attribute} {direction:?}"),
            Trigger::PlayerPlayedCard { card_type, source } => {
                format!("{source:?} played a {card_type}")
            }
            Trigger::CardZoneTransition { direction, zone } => match direction {
                Direction::Increase => format!("enters {zone}"),
                Direction::Decrease => format!("leaves {zone}"),
            },
            Trigger::CardAttributeDelta {
                direction,
                attribute,
            } => format!("{attribute} {direction:?}"),
            Trigger::CardAttributeCompare {
                op,
                attribute,
                threshold,
            } => format!("{attribute} {} {threshold}", op.symbol()),
            Trigger::CardAttacked => "attacked".to_string(),
            Trigger::TurnCount { mode, n } => format!("{mode:?} {n} turns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_source_relationship() {
        let owner = PlayerId(0);
        let other = PlayerId(1);
        assert!(PlayerSource::Owner.admits(owner, owner));
        assert!(!PlayerSource::Owner.admits(owner, other));
        assert!(PlayerSource::AnyOpponent.admits(owner, other));
        assert!(!PlayerSource::AnyOpponent.admits(owner, owner));
        assert!(PlayerSource::AnyPlayer.admits(owner, other));
    }

    #[test]
    fn test_zone_transition_matches_zone_and_direction() {
        let trigger = Trigger::CardZoneTransition {
            direction: Direction::ENTER,
            zone: "Board".into(),
        };
        let enter_board = TriggerEvent::CardZoneTransition {
            direction: Direction::ENTER,
            zone: "Board".into(),
        };
        let leave_board = TriggerEvent::CardZoneTransition {
            direction: Direction::LEAVE,
            zone: "Board".into(),
        };
        let enter_hand = TriggerEvent::CardZoneTransition {
            direction: Direction::ENTER,
            zone: "Hand".into(),
        };
        assert!(trigger.matches(&enter_board, PlayerId(0)));
        assert!(!trigger.matches(&leave_board, PlayerId(0)));
        assert!(!trigger.matches(&enter_hand, PlayerId(0)));
    }

    #[test]
    fn test_compare_trigger_requires_same_op_and_threshold() {
        let trigger = Trigger::CardAttributeCompare {
            op: ComparisonOp::Equal,
            attribute: "Life".into(),
            threshold: 0,
        };
        let eq_zero = TriggerEvent::CardAttributeCompare {
            op: ComparisonOp::Equal,
            attribute: "Life".into(),
            value: 0,
        };
        let le_zero = TriggerEvent::CardAttributeCompare {
            op: ComparisonOp::LessThanOrEqual,
            attribute: "Life".into(),
            value: 0,
        };
        let eq_one = TriggerEvent::CardAttributeCompare {
            op: ComparisonOp::Equal,
            attribute: "Life".into(),
            value: 1,
        };
        assert!(trigger.matches(&eq_zero, PlayerId(0)));
        assert!(!trigger.matches(&le_zero, PlayerId(0)));
        assert!(!trigger.matches(&eq_one, PlayerId(0)));
    }

    #[test]
    fn test_turn_count_modes() {
        let after_two = Trigger::TurnCount {
            mode: TurnCountMode::After,
            n: 2,
        };
        let every_two = Trigger::TurnCount {
            mode: TurnCountMode::Every,
            n: 2,
        };
        let turns = |n| TriggerEvent::TurnCount { turns_in_play: n };
        assert!(!after_two.matches(&turns(2), PlayerId(0)));
        assert!(after_two.matches(&turns(3), PlayerId(0)));
        assert!(!after_two.matches(&turns(4), PlayerId(0)));
        assert!(every_two.matches(&turns(2), PlayerId(0)));
        assert!(!every_two.matches(&turns(3), PlayerId(0)));
        assert!(every_two.matches(&turns(4), PlayerId(0)));

        let after_max = Trigger::TurnCount {
            mode: TurnCountMode::After,
            n: u32::MAX,
        };
        assert!(!after_max.matches(&turns(0), PlayerId(0)));
        assert!(!after_max.matches(&turns(u32::MAX), PlayerId(0)));
    }

    #[test]
    fn test_lifecycle_owner_relationship() {
        let trigger = Trigger::PlayerLifecycle {
            phase: TurnPhase::TurnStart,
            source: PlayerSource::AnyOpponent,
        };
        let start = |p| TriggerEvent::PlayerLifecycle {
            phase: TurnPhase::TurnStart,
            player: PlayerId(p),
        };
        assert!(!trigger.matches(&start(0), PlayerId(0)));
        assert!(trigger.matches(&start(1), PlayerId(0)));
    }
}
