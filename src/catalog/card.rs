//! Card designs and card-type templates.

use std::collections::HashMap;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::CardId;

use super::effect::EffectInstance;

/// Static per-card-type rules shared by every card design of that type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CardTypeTemplate {
    pub name: String,
    /// Kill the card as soon as one of its effects has resolved.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub destroy_after_triggering_effect: bool,
    /// Integer attribute schema with starting values, copied into every live card.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub attributes: HashMap<String, i32>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub effects: Vec<EffectInstance>,
}

impl CardTypeTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destroy_after_triggering_effect: false,
            attributes: HashMap::new(),
            effects: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, starting_value: i32) -> Self {
        self.attributes.insert(name.into(), starting_value);
        self
    }

    pub fn effect(mut self, effect: EffectInstance) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn destroy_after_triggering_effect(mut self) -> Self {
        self.destroy_after_triggering_effect = true;
        self
    }
}

/// Resource a player pays to play a card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ResourceCost {
    pub attribute: String,
    pub amount: i32,
}

/// One distinct card design. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CardInstance {
    pub id: CardId,
    pub name: String,
    pub card_type: String,
    #[cfg_attr(feature = "serialization", serde(default = "default_max_copies"))]
    pub max_copies: u32,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub rarity: String,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub subtypes: Vec<String>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub effects: Vec<EffectInstance>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub costs: Vec<ResourceCost>,
}

#[cfg(feature = "serialization")]
fn default_max_copies() -> u32 {
    DEFAULT_MAX_COPIES
}

const DEFAULT_MAX_COPIES: u32 = 3;

impl CardInstance {
    pub fn new(id: u32, name: impl Into<String>, card_type: impl Into<String>) -> Self {
        Self {
            id: CardId::from_raw(id),
            name: name.into(),
            card_type: card_type.into(),
            max_copies: DEFAULT_MAX_COPIES,
            rarity: String::new(),
            subtypes: Vec::new(),
            effects: Vec::new(),
            costs: Vec::new(),
        }
    }

    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    pub fn effect(mut self, effect: EffectInstance) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn cost(mut self, attribute: impl Into<String>, amount: i32) -> Self {
        self.costs.push(ResourceCost {
            attribute: attribute.into(),
            amount,
        });
        self
    }

    pub fn rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = rarity.into();
        self
    }

    pub fn max_copies(mut self, max_copies: u32) -> Self {
        self.max_copies = max_copies;
        self
    }
}

/// A player attribute with the value every registered player starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AttributeDefinition {
    pub name: String,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub base_value: i32,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, base_value: i32) -> Self {
        Self {
            name: name.into(),
            base_value,
        }
    }
}
