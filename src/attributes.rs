//! Cascading attribute writes.
//!
//! Every attribute change in the engine funnels through
//! [`Match::set_player_attribute`] or [`Match::set_card_attribute`]. A write
//! raises the delta event for its direction and, for cards, one compare event
//! per comparison operator. Trigger effects fired from those events may write
//! attributes again; nesting is bounded by `max_cascade_depth`.

use std::cmp::Ordering;

use tracing::debug;

use crate::engine::Match;
use crate::executor::EngineError;
use crate::ids::{LiveCardId, PlayerId};
use crate::net::Transport;
use crate::triggers::{ComparisonOp, Direction, TriggerEvent};

fn direction_of(old: i32, new: i32) -> Option<Direction> {
    match new.cmp(&old) {
        Ordering::Greater => Some(Direction::Increase),
        Ordering::Less => Some(Direction::Decrease),
        Ordering::Equal => None,
    }
}

impl<T: Transport> Match<T> {
    /// Write a player attribute and fire `PlayerAttributeDelta` on every live card.
    pub fn set_player_attribute(
        &mut self,
        player: PlayerId,
        attribute: &str,
        value: i32,
    ) -> Result<(), EngineError> {
        let old = self.player_attribute(player, attribute)?;
        if let Some(state) = self.game.player_mut(player) {
            state.attributes.insert(attribute.to_string(), value);
        }
        debug!(%player, attribute, old, value, "player attribute set");

        let Some(direction) = direction_of(old, value) else {
            return Ok(());
        };
        let event = TriggerEvent::PlayerAttributeDelta {
            direction,
            attribute: attribute.to_string(),
            player,
        };
        self.fire_on_all_cards(&event)
    }

    /// Write a card attribute, fire its delta trigger, then every compare variant.
    ///
    /// The compare events fire even when the value did not change.
    pub fn set_card_attribute(
        &mut self,
        card: LiveCardId,
        attribute: &str,
        value: i32,
    ) -> Result<(), EngineError> {
        let old = self.card_attribute(card, attribute)?;
        if let Some(live) = self.game.live_card_mut(card) {
            live.attributes.insert(attribute.to_string(), value);
        }
        debug!(%card, attribute, old, value, "card attribute set");

        if let Some(direction) = direction_of(old, value) {
            let event = TriggerEvent::CardAttributeDelta {
                direction,
                attribute: attribute.to_string(),
            };
            self.trigger_effect(&event, card)?;
        }
        for op in ComparisonOp::ALL {
            let event = TriggerEvent::CardAttributeCompare {
                op,
                attribute: attribute.to_string(),
                value,
            };
            self.trigger_effect(&event, card)?;
        }
        Ok(())
    }

    /// Raise a player-side event on every alive live card, in zone order.
    pub(crate) fn fire_on_all_cards(&mut self, event: &TriggerEvent) -> Result<(), EngineError> {
        for card in self.game.live_cards_in_order() {
            if self.game.live_card(card).is_some_and(|live| live.alive) {
                self.trigger_effect(event, card)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of() {
        assert_eq!(direction_of(1, 3), Some(Direction::Increase));
        assert_eq!(direction_of(3, 1), Some(Direction::Decrease));
        assert_eq!(direction_of(2, 2), None);
    }
}
