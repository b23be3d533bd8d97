//! Rule definitions: the named, game-wide effect types effects refer to.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Category of a rule definition. Fixes the action vocabulary and target shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RuleCategory {
    Permanent,
    TargetsPlayer,
    TargetsCard,
    General,
}

/// Actions available to player-targeted rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum PlayerAction {
    IncreaseAttribute { attribute: String },
    DecreaseAttribute { attribute: String },
    SetAttribute { attribute: String },
    /// Moves `magnitude` cards between two of the target player's zones.
    MoveCards { from: String, to: String },
}

/// Actions available to card-targeted rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum CardAction {
    AddCounter { attribute: String },
    RemoveCounter { attribute: String },
    SetAttribute { attribute: String },
    Kill,
    /// Replace the card with the named card design, keeping its owner.
    Transform { into: String },
}

/// Actions of general (untargeted) rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum GeneralAction {
    /// Put a new copy of the named card design into play for the source's owner.
    CreateToken { card: String },
}

/// Category plus its action. A permanent rule has no action: it only exists to
/// be looked up by `CardHasPermanentEffect` conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "category"))]
pub enum RuleKind {
    Permanent,
    TargetsPlayer {
        action: PlayerAction,
    },
    TargetsCard {
        action: CardAction,
        /// Card type a chosen target must have, if any.
        #[cfg_attr(feature = "serialization", serde(default))]
        target_card_type: Option<String>,
    },
    General {
        action: GeneralAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RuleDefinition {
    pub name: String,
    #[cfg_attr(feature = "serialization", serde(flatten))]
    pub kind: RuleKind,
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn permanent(name: impl Into<String>) -> Self {
        Self::new(name, RuleKind::Permanent)
    }

    pub fn player(name: impl Into<String>, action: PlayerAction) -> Self {
        Self::new(name, RuleKind::TargetsPlayer { action })
    }

    pub fn card(name: impl Into<String>, action: CardAction) -> Self {
        Self::new(
            name,
            RuleKind::TargetsCard {
                action,
                target_card_type: None,
            },
        )
    }

    pub fn general(name: impl Into<String>, action: GeneralAction) -> Self {
        Self::new(name, RuleKind::General { action })
    }

    /// Restrict chosen targets of a card rule to one card type.
    pub fn with_target_card_type(mut self, card_type: impl Into<String>) -> Self {
        if let RuleKind::TargetsCard {
            target_card_type, ..
        } = &mut self.kind
        {
            *target_card_type = Some(card_type.into());
        }
        self
    }

    pub fn category(&self) -> RuleCategory {
        match self.kind {
            RuleKind::Permanent => RuleCategory::Permanent,
            RuleKind::TargetsPlayer { .. } => RuleCategory::TargetsPlayer,
            RuleKind::TargetsCard { .. } => RuleCategory::TargetsCard,
            RuleKind::General { .. } => RuleCategory::General,
        }
    }

    /// The attribute the action reads or writes, if it has one.
    pub fn subject_attribute(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::TargetsPlayer { action } => match action {
                PlayerAction::IncreaseAttribute { attribute }
                | PlayerAction::DecreaseAttribute { attribute }
                | PlayerAction::SetAttribute { attribute } => Some(attribute),
                PlayerAction::MoveCards { .. } => None,
            },
            RuleKind::TargetsCard { action, .. } => match action {
                CardAction::AddCounter { attribute }
                | CardAction::RemoveCounter { attribute }
                | CardAction::SetAttribute { attribute } => Some(attribute),
                CardAction::Kill | CardAction::Transform { .. } => None,
            },
            RuleKind::Permanent | RuleKind::General { .. } => None,
        }
    }

    /// Whether resolving this rule consumes an effect magnitude.
    pub fn needs_magnitude(&self) -> bool {
        match &self.kind {
            RuleKind::TargetsPlayer { .. } => true,
            RuleKind::TargetsCard { action, .. } => !matches!(
                action,
                CardAction::Kill | CardAction::Transform { .. }
            ),
            RuleKind::Permanent | RuleKind::General { .. } => false,
        }
    }

    /// Card type a chosen target must have, for card rules.
    pub fn target_card_type(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::TargetsCard {
                target_card_type, ..
            } => target_card_type.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_kind() {
        assert_eq!(
            RuleDefinition::permanent("Guard").category(),
            RuleCategory::Permanent
        );
        let heal = RuleDefinition::player(
            "Heal",
            PlayerAction::IncreaseAttribute {
                attribute: "Life".into(),
            },
        );
        assert_eq!(heal.category(), RuleCategory::TargetsPlayer);
        assert_eq!(heal.subject_attribute(), Some("Life"));
        assert!(heal.needs_magnitude());
    }

    #[test]
    fn test_kill_needs_no_magnitude() {
        let kill = RuleDefinition::card("Destroy", CardAction::Kill).with_target_card_type("Creature");
        assert!(!kill.needs_magnitude());
        assert_eq!(kill.subject_attribute(), None);
        assert_eq!(kill.target_card_type(), Some("Creature"));
    }
}
