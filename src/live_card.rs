use std::collections::HashMap;

use crate::catalog::{CardInstance, CardTypeTemplate};
use crate::ids::{CardId, LiveCardId, PlayerId};

/// A spawned card with its own mutable attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCard {
    pub id: LiveCardId,
    pub card: CardId,
    pub owner: PlayerId,
    pub alive: bool,
    pub turns_in_play: u32,
    pub attributes: HashMap<String, i32>,
}

impl LiveCard {
    /// Spawn state copied from the card type's starting attributes.
    pub fn spawn(
        id: LiveCardId,
        card: &CardInstance,
        card_type: &CardTypeTemplate,
        owner: PlayerId,
    ) -> Self {
        Self {
            id,
            card: card.id,
            owner,
            alive: true,
            turns_in_play: 0,
            attributes: card_type.attributes.clone(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<i32> {
        self.attributes.get(name).copied()
    }
}
