//! Effect instances attached to card designs and card-type templates.

use rand::Rng;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::triggers::{Condition, Trigger};

/// How much an effect does, evaluated when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum Magnitude {
    Fixed { value: i32 },
    /// Inclusive on both ends.
    Random { min: i32, max: i32 },
}

impl Magnitude {
    pub fn fixed(value: i32) -> Self {
        Magnitude::Fixed { value }
    }

    pub fn evaluate<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        match *self {
            Magnitude::Fixed { value } => value,
            Magnitude::Random { min, max } if min >= max => min,
            Magnitude::Random { min, max } => rng.random_range(min..=max),
        }
    }
}

/// Target shapes of player-targeted effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PlayerTarget {
    CurrentPlayer,
    CurrentOpponent,
    AllPlayers,
    RandomPlayer,
    /// Chosen by the current player.
    TargetPlayer,
}

/// Target shapes of card-targeted effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CardTarget {
    ThisCard,
    AllCards,
    AllCurrentPlayerCards,
    AllCurrentOpponentCards,
    RandomCard,
    /// Any live card, chosen by the current player.
    TargetCard,
    /// One of the current player's own cards, chosen by them.
    CurrentPlayerCard,
    /// One of the current opponent's cards, chosen by the current player.
    CurrentOpponentCard,
}

impl PlayerTarget {
    pub fn requires_choice(self) -> bool {
        matches!(self, PlayerTarget::TargetPlayer)
    }
}

impl CardTarget {
    pub fn requires_choice(self) -> bool {
        matches!(
            self,
            CardTarget::TargetCard | CardTarget::CurrentPlayerCard | CardTarget::CurrentOpponentCard
        )
    }
}

/// Target shape of one effect instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum EffectTarget {
    #[default]
    None,
    Player(PlayerTarget),
    Card(CardTarget),
}

impl EffectTarget {
    pub fn requires_choice(self) -> bool {
        match self {
            EffectTarget::None => false,
            EffectTarget::Player(target) => target.requires_choice(),
            EffectTarget::Card(target) => target.requires_choice(),
        }
    }
}

/// One effect attached to a card design or a card-type template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct EffectInstance {
    /// Name of the [`RuleDefinition`](super::RuleDefinition) this effect instantiates.
    pub definition: String,
    pub trigger: Trigger,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub trigger_conditions: Vec<Condition>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub target_conditions: Vec<Condition>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub unavoidable: bool,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub target: EffectTarget,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub magnitude: Option<Magnitude>,
}

impl EffectInstance {
    pub fn new(definition: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            definition: definition.into(),
            trigger,
            trigger_conditions: Vec::new(),
            target_conditions: Vec::new(),
            unavoidable: false,
            target: EffectTarget::None,
            magnitude: None,
        }
    }

    pub fn targeting_player(mut self, target: PlayerTarget) -> Self {
        self.target = EffectTarget::Player(target);
        self
    }

    pub fn targeting_card(mut self, target: CardTarget) -> Self {
        self.target = EffectTarget::Card(target);
        self
    }

    pub fn with_magnitude(mut self, magnitude: Magnitude) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_value(self, value: i32) -> Self {
        self.with_magnitude(Magnitude::fixed(value))
    }

    pub fn with_trigger_condition(mut self, condition: Condition) -> Self {
        self.trigger_conditions.push(condition);
        self
    }

    pub fn with_target_condition(mut self, condition: Condition) -> Self {
        self.target_conditions.push(condition);
        self
    }

    pub fn unavoidable(mut self) -> Self {
        self.unavoidable = true;
        self
    }
}
