//! Conditions attached to effects.
//!
//! A condition list is a logical AND: evaluation stops at the first failing
//! condition. Attribute comparisons fail closed when the attribute is missing.

use std::collections::HashMap;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::catalog::{CardInstance, CardTypeTemplate, Catalog};
use crate::player::PlayerState;

/// Comparison operator used by attribute conditions and compare triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ComparisonOp {
    LessThan,
    LessThanOrEqual,
    Equal,
    GreaterThanOrEqual,
    GreaterThan,
}

impl ComparisonOp {
    /// Every operator, in the order compare triggers are re-evaluated.
    pub const ALL: [ComparisonOp; 5] = [
        ComparisonOp::LessThan,
        ComparisonOp::LessThanOrEqual,
        ComparisonOp::Equal,
        ComparisonOp::GreaterThanOrEqual,
        ComparisonOp::GreaterThan,
    ];

    /// Check if `value <op> threshold` holds.
    pub fn holds(self, value: i32, threshold: i32) -> bool {
        match self {
            ComparisonOp::LessThan => value < threshold,
            ComparisonOp::LessThanOrEqual => value <= threshold,
            ComparisonOp::Equal => value == threshold,
            ComparisonOp::GreaterThanOrEqual => value >= threshold,
            ComparisonOp::GreaterThan => value > threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::Equal => "==",
            ComparisonOp::GreaterThanOrEqual => ">=",
            ComparisonOp::GreaterThan => ">",
        }
    }
}

/// A single condition in an effect's trigger or target condition list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum Condition {
    PlayerAttributeCompare {
        op: ComparisonOp,
        attribute: String,
        value: i32,
    },
    CardHasPermanentEffect {
        named: String,
        #[cfg_attr(feature = "serialization", serde(default))]
        negate: bool,
    },
    CardHasSubtype {
        named: String,
        #[cfg_attr(feature = "serialization", serde(default))]
        negate: bool,
    },
    CardAttributeCompare {
        op: ComparisonOp,
        attribute: String,
        value: i32,
    },
}

/// What a condition is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSubject {
    Player,
    Card,
}

/// A card as seen by condition evaluation.
///
/// `attributes` is the live copy when the card is spawned, otherwise the
/// template's starting values.
#[derive(Debug, Clone, Copy)]
pub struct CardSubject<'a> {
    pub card: &'a CardInstance,
    pub card_type: &'a CardTypeTemplate,
    pub attributes: &'a HashMap<String, i32>,
}

impl<'a> CardSubject<'a> {
    /// Subject for a card that has not been spawned.
    pub fn from_template(card: &'a CardInstance, card_type: &'a CardTypeTemplate) -> Self {
        Self {
            card,
            card_type,
            attributes: &card_type.attributes,
        }
    }

    /// True if the card design or its type template carries the named permanent effect.
    pub fn has_permanent_effect(&self, name: &str, catalog: &Catalog) -> bool {
        self.card
            .effects
            .iter()
            .chain(self.card_type.effects.iter())
            .any(|effect| effect.definition == name && catalog.is_permanent(&effect.definition))
    }

    pub fn has_subtype(&self, name: &str) -> bool {
        self.card.subtypes.iter().any(|subtype| subtype == name)
    }
}

impl Condition {
    /// Which subject this condition applies to.
    pub fn subject(&self) -> ConditionSubject {
        match self {
            Condition::PlayerAttributeCompare { .. } => ConditionSubject::Player,
            Condition::CardHasPermanentEffect { .. }
            | Condition::CardHasSubtype { .. }
            | Condition::CardAttributeCompare { .. } => ConditionSubject::Card,
        }
    }

    /// Evaluate against a player. Card conditions never hold for a player.
    pub fn holds_for_player(&self, player: &PlayerState) -> bool {
        match self {
            Condition::PlayerAttributeCompare {
                op,
                attribute,
                value,
            } => player
                .attribute(attribute)
                .is_some_and(|current| op.holds(current, *value)),
            _ => false,
        }
    }

    /// Evaluate against a card. Player conditions never hold for a card.
    pub fn holds_for_card(&self, subject: &CardSubject<'_>, catalog: &Catalog) -> bool {
        match self {
            Condition::CardHasPermanentEffect { named, negate } => {
                subject.has_permanent_effect(named, catalog) != *negate
            }
            Condition::CardHasSubtype { named, negate } => subject.has_subtype(named) != *negate,
            Condition::CardAttributeCompare {
                op,
                attribute,
                value,
            } => subject
                .attributes
                .get(attribute)
                .is_some_and(|current| op.holds(*current, *value)),
            Condition::PlayerAttributeCompare { .. } => false,
        }
    }
}

/// AND over a condition list for a player candidate.
pub fn all_hold_for_player(conditions: &[Condition], player: &PlayerState) -> bool {
    conditions
        .iter()
        .all(|condition| condition.holds_for_player(player))
}

/// AND over a condition list for a card candidate.
pub fn all_hold_for_card(
    conditions: &[Condition],
    subject: &CardSubject<'_>,
    catalog: &Catalog,
) -> bool {
    conditions
        .iter()
        .all(|condition| condition.holds_for_card(subject, catalog))
}
