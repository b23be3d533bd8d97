//! Effect execution.
//!
//! Turns a resolved effect (definition + magnitude + concrete targets) into
//! state changes. Every attribute write goes through the cascading
//! `set_*_attribute` operations so that delta and compare triggers fire.

use rand::seq::IndexedRandom;
use tracing::{debug, error, trace};

use crate::catalog::{CardAction, CardTarget, EffectInstance, PlayerAction, PlayerTarget};
use crate::engine::Match;
use crate::ids::{CardId, LiveCardId, PlayerId};
use crate::net::Transport;
use crate::triggers::{can_be_target_of_effect, is_valid_card_target, is_valid_player_target};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by engine operations.
///
/// Invalid client intents are not errors (see
/// [`IntentOutcome`](crate::decision::IntentOutcome)); these are reference
/// failures the rule data or the caller should never produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Referenced player does not exist.
    UnknownPlayer(PlayerId),
    /// Referenced live card is not spawned.
    UnknownLiveCard(LiveCardId),
    /// Referenced card design does not exist.
    UnknownCard(CardId),
    /// No card design with this name.
    UnknownCardName(String),
    /// Card design names a type the catalog does not have.
    UnknownCardType(String),
    /// Player has no zone with this name.
    UnknownZone { player: PlayerId, zone: String },
    /// Effect names a rule definition the catalog does not have.
    DefinitionNotFound(String),
    /// Attribute is not defined on the entity.
    AttributeNotFound { entity: String, attribute: String },
    /// Nested trigger firings exceeded the configured ceiling.
    CascadeLimitExceeded { depth: usize },
    /// Operation needs a running match.
    GameNotRunning,
    /// Starting a match nobody registered for.
    NoPlayers,
    /// Registration after the match started.
    RegistrationClosed,
    /// Every seat is taken.
    MatchFull,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownPlayer(id) => write!(f, "Unknown player {}", id),
            EngineError::UnknownLiveCard(id) => write!(f, "Unknown live card {}", id),
            EngineError::UnknownCard(id) => write!(f, "Unknown card {}", id),
            EngineError::UnknownCardName(name) => write!(f, "Unknown card '{}'", name),
            EngineError::UnknownCardType(name) => write!(f, "Unknown card type '{}'", name),
            EngineError::UnknownZone { player, zone } => {
                write!(f, "{} has no zone '{}'", player, zone)
            }
            EngineError::DefinitionNotFound(name) => {
                write!(f, "Rule definition '{}' not found", name)
            }
            EngineError::AttributeNotFound { entity, attribute } => {
                write!(f, "{} has no attribute '{}'", entity, attribute)
            }
            EngineError::CascadeLimitExceeded { depth } => {
                write!(f, "Trigger cascade exceeded depth {}", depth)
            }
            EngineError::GameNotRunning => write!(f, "Match is not running"),
            EngineError::NoPlayers => write!(f, "No players registered"),
            EngineError::RegistrationClosed => write!(f, "Registration is closed"),
            EngineError::MatchFull => write!(f, "Match is full"),
        }
    }
}

impl std::error::Error for EngineError {}

// ============================================================================
// Target Resolution
// ============================================================================

impl<T: Transport> Match<T> {
    /// Players an automatic player target resolves to, after target conditions.
    pub(crate) fn automatic_player_targets(
        &mut self,
        effect: &EffectInstance,
        target: PlayerTarget,
    ) -> Vec<PlayerId> {
        let candidates: Vec<PlayerId> = match target {
            PlayerTarget::CurrentPlayer => self.game.active_player().into_iter().collect(),
            PlayerTarget::CurrentOpponent => self.game.current_opponents(),
            PlayerTarget::AllPlayers | PlayerTarget::RandomPlayer => self.game.player_ids(),
            PlayerTarget::TargetPlayer => Vec::new(),
        };
        let valid: Vec<PlayerId> = candidates
            .into_iter()
            .filter(|&id| {
                self.game
                    .player(id)
                    .is_some_and(|player| is_valid_player_target(effect, player))
            })
            .collect();

        if target == PlayerTarget::RandomPlayer {
            return valid.choose(&mut self.rng).copied().into_iter().collect();
        }
        valid
    }

    /// Live cards an automatic card target resolves to, after target conditions.
    pub(crate) fn automatic_card_targets(
        &mut self,
        effect: &EffectInstance,
        target: CardTarget,
        source: LiveCardId,
    ) -> Vec<LiveCardId> {
        if target == CardTarget::ThisCard {
            return self
                .game
                .live_card(source)
                .map(|card| card.id)
                .into_iter()
                .collect();
        }

        let active = self.game.active_player();
        let valid: Vec<LiveCardId> = self
            .game
            .live_cards_in_order()
            .into_iter()
            .filter(|&id| {
                let Some(card) = self.game.live_card(id) else {
                    return false;
                };
                let in_scope = match target {
                    CardTarget::AllCurrentPlayerCards => Some(card.owner) == active,
                    CardTarget::AllCurrentOpponentCards => Some(card.owner) != active,
                    CardTarget::AllCards | CardTarget::RandomCard => true,
                    _ => false,
                };
                in_scope && self.is_affectable_card(effect, id)
            })
            .collect();

        if target == CardTarget::RandomCard {
            return valid.choose(&mut self.rng).copied().into_iter().collect();
        }
        valid
    }

    /// Alive, reachable, and passes every target condition.
    pub(crate) fn is_affectable_card(&self, effect: &EffectInstance, id: LiveCardId) -> bool {
        let (Some(card), Some(subject)) = (
            self.game.live_card(id),
            self.game.card_subject(&self.catalog, id),
        ) else {
            return false;
        };
        can_be_target_of_effect(
            effect,
            card,
            &subject,
            &self.catalog,
            self.config.untargetable_effect.as_deref(),
        ) && is_valid_card_target(effect, &subject, &self.catalog)
    }

    // ========================================================================
    // Action Application
    // ========================================================================

    /// Apply a player action to one target player.
    pub(crate) fn apply_player_action(
        &mut self,
        action: &PlayerAction,
        target: PlayerId,
        magnitude: i32,
    ) -> Result<(), EngineError> {
        trace!(player = %target, ?action, magnitude, "apply player action");
        match action {
            PlayerAction::IncreaseAttribute { attribute } => {
                let current = self.player_attribute(target, attribute)?;
                self.set_player_attribute(target, attribute, current.saturating_add(magnitude))
            }
            PlayerAction::DecreaseAttribute { attribute } => {
                let current = self.player_attribute(target, attribute)?;
                self.set_player_attribute(target, attribute, current.saturating_sub(magnitude))
            }
            PlayerAction::SetAttribute { attribute } => {
                self.set_player_attribute(target, attribute, magnitude)
            }
            PlayerAction::MoveCards { from, to } => {
                let count = usize::try_from(magnitude).unwrap_or(0);
                self.move_cards(target, from, to, count).map(|_| ())
            }
        }
    }

    /// Apply a card action to one target card. A card that vanished in the
    /// meantime is skipped.
    pub(crate) fn apply_card_action(
        &mut self,
        action: &CardAction,
        target: LiveCardId,
        magnitude: i32,
    ) -> Result<(), EngineError> {
        if self.game.live_card(target).is_none() {
            debug!(card = %target, "card action target is gone");
            return Ok(());
        }
        trace!(card = %target, ?action, magnitude, "apply card action");
        match action {
            CardAction::AddCounter { attribute } => {
                let current = self.card_attribute(target, attribute)?;
                self.set_card_attribute(target, attribute, current.saturating_add(magnitude))
            }
            CardAction::RemoveCounter { attribute } => {
                let current = self.card_attribute(target, attribute)?;
                self.set_card_attribute(target, attribute, current.saturating_sub(magnitude))
            }
            CardAction::SetAttribute { attribute } => {
                self.set_card_attribute(target, attribute, magnitude)
            }
            CardAction::Kill => self.kill_card(target),
            CardAction::Transform { into } => self.transform_card(target, into).map(|_| ()),
        }
    }

    pub(crate) fn player_attribute(
        &self,
        player: PlayerId,
        attribute: &str,
    ) -> Result<i32, EngineError> {
        let state = self
            .game
            .player(player)
            .ok_or(EngineError::UnknownPlayer(player))?;
        state.attribute(attribute).ok_or_else(|| {
            error!(%player, attribute, "player attribute not found");
            EngineError::AttributeNotFound {
                entity: player.to_string(),
                attribute: attribute.to_string(),
            }
        })
    }

    pub(crate) fn card_attribute(
        &self,
        card: LiveCardId,
        attribute: &str,
    ) -> Result<i32, EngineError> {
        let live = self
            .game
            .live_card(card)
            .ok_or(EngineError::UnknownLiveCard(card))?;
        live.attribute(attribute).ok_or_else(|| {
            error!(%card, attribute, "card attribute not found");
            EngineError::AttributeNotFound {
                entity: card.to_string(),
                attribute: attribute.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnknownZone {
            player: PlayerId(1),
            zone: "Crypt".into(),
        };
        assert_eq!(err.to_string(), "player#1 has no zone 'Crypt'");
        assert_eq!(
            EngineError::CascadeLimitExceeded { depth: 64 }.to_string(),
            "Trigger cascade exceeded depth 64"
        );
    }
}
