use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::ZoneDefinition;
use crate::ids::{CardId, LiveCardId};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Whether a zone holds identifier-only cards or live, mutable ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ZoneKind {
    /// Cards whose attributes never diverge from the template (deck, hand, graveyard).
    Static,
    /// Cards with live state (board).
    Dynamic,
}

/// Ordered zone contents. The end of the list is the top of the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneContents {
    Static(Vec<CardId>),
    Dynamic(Vec<LiveCardId>),
}

/// One of a player's zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    pub is_private: bool,
    pub contents: ZoneContents,
}

impl Zone {
    pub fn from_definition(definition: &ZoneDefinition) -> Self {
        let contents = match definition.kind {
            ZoneKind::Static => ZoneContents::Static(Vec::new()),
            ZoneKind::Dynamic => ZoneContents::Dynamic(Vec::new()),
        };
        Self {
            name: definition.name.clone(),
            is_private: definition.is_private,
            contents,
        }
    }

    pub fn kind(&self) -> ZoneKind {
        match self.contents {
            ZoneContents::Static(_) => ZoneKind::Static,
            ZoneContents::Dynamic(_) => ZoneKind::Dynamic,
        }
    }

    pub fn len(&self) -> usize {
        match &self.contents {
            ZoneContents::Static(cards) => cards.len(),
            ZoneContents::Dynamic(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier list of a static zone (empty for dynamic zones).
    pub fn card_ids(&self) -> &[CardId] {
        match &self.contents {
            ZoneContents::Static(cards) => cards,
            ZoneContents::Dynamic(_) => &[],
        }
    }

    /// Live-card handles of a dynamic zone (empty for static zones).
    pub fn live_cards(&self) -> &[LiveCardId] {
        match &self.contents {
            ZoneContents::Dynamic(cards) => cards,
            ZoneContents::Static(_) => &[],
        }
    }

    pub fn contains_card(&self, card: CardId) -> bool {
        self.card_ids().contains(&card)
    }

    pub fn contains_live(&self, card: LiveCardId) -> bool {
        self.live_cards().contains(&card)
    }

    /// Put an identifier on top of a static zone. Returns false for dynamic zones.
    pub fn push_card(&mut self, card: CardId) -> bool {
        match &mut self.contents {
            ZoneContents::Static(cards) => {
                cards.push(card);
                true
            }
            ZoneContents::Dynamic(_) => false,
        }
    }

    /// Put a live card on top of a dynamic zone. Returns false for static zones.
    pub fn push_live(&mut self, card: LiveCardId) -> bool {
        match &mut self.contents {
            ZoneContents::Dynamic(cards) => {
                cards.push(card);
                true
            }
            ZoneContents::Static(_) => false,
        }
    }

    /// Take the top identifier off a static zone.
    pub fn pop_card(&mut self) -> Option<CardId> {
        match &mut self.contents {
            ZoneContents::Static(cards) => cards.pop(),
            ZoneContents::Dynamic(_) => None,
        }
    }

    pub fn top_live(&self) -> Option<LiveCardId> {
        self.live_cards().last().copied()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match &mut self.contents {
            ZoneContents::Static(cards) => cards.shuffle(rng),
            ZoneContents::Dynamic(cards) => cards.shuffle(rng),
        }
    }

    /// Remove the first copy of `card` from a static zone.
    pub fn remove_card(&mut self, card: CardId) -> bool {
        match &mut self.contents {
            ZoneContents::Static(cards) => match cards.iter().position(|c| *c == card) {
                Some(index) => {
                    cards.remove(index);
                    true
                }
                None => false,
            },
            ZoneContents::Dynamic(_) => false,
        }
    }

    pub fn remove_live(&mut self, card: LiveCardId) -> bool {
        match &mut self.contents {
            ZoneContents::Dynamic(cards) => match cards.iter().position(|c| *c == card) {
                Some(index) => {
                    cards.remove(index);
                    true
                }
                None => false,
            },
            ZoneContents::Static(_) => false,
        }
    }

    /// Replace a live card in place, keeping its position.
    pub fn replace_live(&mut self, old: LiveCardId, new: LiveCardId) -> bool {
        match &mut self.contents {
            ZoneContents::Dynamic(cards) => match cards.iter_mut().find(|c| **c == old) {
                Some(slot) => {
                    *slot = new;
                    true
                }
                None => false,
            },
            ZoneContents::Static(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_zone_rejects_live_cards() {
        let mut deck = Zone::from_definition(&ZoneDefinition::static_zone("Deck", true));
        assert_eq!(deck.kind(), ZoneKind::Static);
        assert!(deck.push_card(CardId(1)));
        assert!(!deck.push_live(LiveCardId(1)));
        assert_eq!(deck.len(), 1);
        assert!(deck.contains_card(CardId(1)));
    }

    #[test]
    fn test_pop_takes_from_top() {
        let mut deck = Zone::from_definition(&ZoneDefinition::static_zone("Deck", true));
        deck.push_card(CardId(1));
        deck.push_card(CardId(2));
        assert_eq!(deck.pop_card(), Some(CardId(2)));
        assert_eq!(deck.pop_card(), Some(CardId(1)));
        assert_eq!(deck.pop_card(), None);
    }

    #[test]
    fn test_remove_first_copy_only() {
        let mut hand = Zone::from_definition(&ZoneDefinition::static_zone("Hand", true));
        hand.push_card(CardId(4));
        hand.push_card(CardId(4));
        assert!(hand.remove_card(CardId(4)));
        assert_eq!(hand.card_ids(), &[CardId(4)]);
        assert!(!hand.remove_card(CardId(5)));
    }

    #[test]
    fn test_replace_live_keeps_position() {
        let mut board = Zone::from_definition(&ZoneDefinition::dynamic_zone("Board"));
        board.push_live(LiveCardId(1));
        board.push_live(LiveCardId(2));
        board.push_live(LiveCardId(3));
        assert!(board.replace_live(LiveCardId(2), LiveCardId(9)));
        assert_eq!(
            board.live_cards(),
            &[LiveCardId(1), LiveCardId(9), LiveCardId(3)]
        );
    }
}
