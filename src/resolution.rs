//! Effect resolution session.
//!
//! At most one effect per match waits for a client to pick its target. While
//! one waits, further firings are queued and resolved in arrival order once
//! the selection is answered. Turn boundaries abandon both.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::catalog::{
    CardTarget, EffectInstance, EffectTarget, GeneralAction, RuleKind,
};
use crate::decision::{IntentOutcome, RejectReason};
use crate::engine::Match;
use crate::executor::EngineError;
use crate::ids::{LiveCardId, PlayerId};
use crate::lifecycle::DestructionReason;
use crate::net::{ServerMessage, TargetChoice, TargetKind, Transport};
use crate::triggers::{TriggerContext, TriggerEvent, is_valid_player_target, is_valid_trigger};

/// Stack headroom kept free before a nested resolution.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each new stack segment when the headroom runs out.
const STACK_SEGMENT: usize = 1024 * 1024;

/// An effect waiting for its chosen target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEffect {
    pub effect: EffectInstance,
    pub source: LiveCardId,
    /// The player asked to choose.
    pub chooser: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingPlayerTarget(PendingEffect),
    AwaitingCardTarget(PendingEffect),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn pending(&self) -> Option<&PendingEffect> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingPlayerTarget(pending)
            | SessionState::AwaitingCardTarget(pending) => Some(pending),
        }
    }

    pub fn target_kind(&self) -> Option<TargetKind> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingPlayerTarget(_) => Some(TargetKind::Player),
            SessionState::AwaitingCardTarget(_) => Some(TargetKind::Card),
        }
    }
}

#[derive(Debug, Clone)]
struct QueuedFiring {
    effect: EffectInstance,
    source: LiveCardId,
}

/// Per-match selection state plus the firings deferred behind it.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSession {
    state: SessionState,
    queue: VecDeque<QueuedFiring>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn await_target(&mut self, kind: TargetKind, pending: PendingEffect) {
        self.state = match kind {
            TargetKind::Player => SessionState::AwaitingPlayerTarget(pending),
            TargetKind::Card => SessionState::AwaitingCardTarget(pending),
        };
    }

    fn take_pending(&mut self) -> Option<PendingEffect> {
        match std::mem::take(&mut self.state) {
            SessionState::Idle => None,
            SessionState::AwaitingPlayerTarget(pending)
            | SessionState::AwaitingCardTarget(pending) => Some(pending),
        }
    }

    fn enqueue(&mut self, effect: EffectInstance, source: LiveCardId) {
        self.queue.push_back(QueuedFiring { effect, source });
    }

    fn pop_queued(&mut self) -> Option<QueuedFiring> {
        self.queue.pop_front()
    }

    /// Drop the pending selection and every queued firing.
    ///
    /// Returns whether a selection was pending and how many firings were dropped.
    pub fn abandon(&mut self) -> (bool, usize) {
        let had_pending = self.take_pending().is_some();
        let dropped = self.queue.len();
        self.queue.clear();
        (had_pending, dropped)
    }
}

impl<T: Transport> Match<T> {
    // ========================================================================
    // Firing
    // ========================================================================

    /// Fire every effect of `source` whose trigger matches `event` and whose
    /// trigger conditions hold.
    ///
    /// Effects on the card design come before effects on its card type.
    /// Permanent effects never fire.
    pub(crate) fn trigger_effect(
        &mut self,
        event: &TriggerEvent,
        source: LiveCardId,
    ) -> Result<(), EngineError> {
        let Some(live) = self.game.live_card(source) else {
            return Ok(());
        };
        let owner = live.owner;
        let catalog = Arc::clone(&self.catalog);
        let Some((card, card_type)) = catalog.card_with_type(live.card) else {
            return Ok(());
        };

        let candidates: Vec<&EffectInstance> = card
            .effects
            .iter()
            .chain(card_type.effects.iter())
            .filter(|effect| !catalog.is_permanent(&effect.definition))
            .filter(|effect| effect.trigger.matches(event, owner))
            .collect();

        for effect in candidates {
            // Conditions are read after the previous effect in this batch resolved.
            let ctx = TriggerContext::new(&self.game, &catalog);
            if !is_valid_trigger(effect, source, &ctx) {
                continue;
            }
            debug!(
                card = %source,
                effect = %effect.definition,
                trigger = %effect.trigger.display(),
                event = event.name(),
                "effect fired"
            );
            self.dispatch(effect.clone(), source)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, effect: EffectInstance, source: LiveCardId) -> Result<(), EngineError> {
        if !self.session.is_idle() {
            debug!(card = %source, effect = %effect.definition, "selection pending, firing queued");
            self.session.enqueue(effect, source);
            return Ok(());
        }
        self.resolve_firing(effect, source)
    }

    /// Resolve one firing, one level deeper in the cascade.
    fn resolve_firing(&mut self, effect: EffectInstance, source: LiveCardId) -> Result<(), EngineError> {
        if self.cascade_depth >= self.config.max_cascade_depth {
            error!(
                depth = self.cascade_depth,
                effect = %effect.definition,
                "trigger cascade limit reached"
            );
            return Err(EngineError::CascadeLimitExceeded {
                depth: self.cascade_depth,
            });
        }
        self.cascade_depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.resolve_effect(&effect, source)
        });
        self.cascade_depth -= 1;
        result
    }

    fn resolve_effect(&mut self, effect: &EffectInstance, source: LiveCardId) -> Result<(), EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog.definition(&effect.definition).ok_or_else(|| {
            error!(effect = %effect.definition, "rule definition not found");
            EngineError::DefinitionNotFound(effect.definition.clone())
        })?;

        match (&definition.kind, effect.target) {
            (RuleKind::Permanent, _) => return Ok(()),
            (
                RuleKind::General {
                    action: GeneralAction::CreateToken { card },
                },
                _,
            ) => {
                let Some(owner) = self.game.live_card(source).map(|live| live.owner) else {
                    return Ok(());
                };
                self.create_token(owner, card)?;
            }
            (RuleKind::TargetsPlayer { action }, EffectTarget::Player(target)) => {
                if target.requires_choice() {
                    return self.request_target(effect, source, TargetKind::Player);
                }
                let magnitude = self.roll_magnitude(effect);
                for player in self.automatic_player_targets(effect, target) {
                    self.apply_player_action(action, player, magnitude)?;
                }
            }
            (RuleKind::TargetsCard { action, .. }, EffectTarget::Card(target)) => {
                if target.requires_choice() {
                    return self.request_target(effect, source, TargetKind::Card);
                }
                let magnitude = self.roll_magnitude(effect);
                for card in self.automatic_card_targets(effect, target, source) {
                    self.apply_card_action(action, card, magnitude)?;
                }
            }
            _ => {
                warn!(effect = %effect.definition, "target shape does not fit rule category");
                return Ok(());
            }
        }
        self.finish_effect(source)
    }

    /// One roll per resolution, shared by every target.
    fn roll_magnitude(&mut self, effect: &EffectInstance) -> i32 {
        effect
            .magnitude
            .map_or(0, |magnitude| magnitude.evaluate(&mut self.rng))
    }

    /// Bookkeeping after an effect resolved: self-destroying card types die,
    /// and every client gets the new state.
    fn finish_effect(&mut self, source: LiveCardId) -> Result<(), EngineError> {
        let destroy_after = self
            .game
            .live_card(source)
            .and_then(|live| self.catalog.card_with_type(live.card))
            .is_some_and(|(_, card_type)| card_type.destroy_after_triggering_effect);
        if destroy_after {
            self.kill_with(source, DestructionReason::AfterEffect)?;
        }
        self.broadcast_state();
        Ok(())
    }

    // ========================================================================
    // Target Selection
    // ========================================================================

    fn request_target(
        &mut self,
        effect: &EffectInstance,
        source: LiveCardId,
        kind: TargetKind,
    ) -> Result<(), EngineError> {
        let Some(chooser) = self.game.active_player() else {
            return Ok(());
        };
        if !self.game.player(chooser).is_some_and(|player| player.is_connected) {
            debug!(%chooser, effect = %effect.definition, "chooser disconnected, effect skipped");
            return Ok(());
        }
        let pending = PendingEffect {
            effect: effect.clone(),
            source,
            chooser,
        };
        if !self.has_selectable_target(&pending, kind) {
            debug!(effect = %effect.definition, ?kind, "no legal target, effect skipped");
            return Ok(());
        }

        debug!(%chooser, effect = %effect.definition, ?kind, "target requested");
        self.session.await_target(kind, pending);
        self.send_to(
            chooser,
            ServerMessage::SelectTarget {
                kind,
                effect: effect.definition.clone(),
                source,
            },
        );
        Ok(())
    }

    fn has_selectable_target(&self, pending: &PendingEffect, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Player => self
                .game
                .players
                .iter()
                .any(|player| self.is_valid_chosen_player(pending, player.id)),
            TargetKind::Card => self
                .game
                .live_cards_in_order()
                .into_iter()
                .any(|card| self.is_valid_chosen_card(pending, card)),
        }
    }

    fn is_valid_chosen_player(&self, pending: &PendingEffect, player: PlayerId) -> bool {
        self.game
            .player(player)
            .is_some_and(|state| is_valid_player_target(&pending.effect, state))
    }

    /// Alive, of the required card type, owned by the right side, and
    /// passing every target condition.
    fn is_valid_chosen_card(&self, pending: &PendingEffect, card: LiveCardId) -> bool {
        let Some(live) = self.game.live_card(card) else {
            return false;
        };
        let required_type = self
            .catalog
            .definition(&pending.effect.definition)
            .and_then(|definition| definition.target_card_type());
        if let Some(required) = required_type
            && !self
                .catalog
                .card(live.card)
                .is_some_and(|design| design.card_type == required)
        {
            return false;
        }
        let side_ok = match pending.effect.target {
            EffectTarget::Card(CardTarget::CurrentPlayerCard) => live.owner == pending.chooser,
            EffectTarget::Card(CardTarget::CurrentOpponentCard) => live.owner != pending.chooser,
            _ => true,
        };
        side_ok && self.is_affectable_card(&pending.effect, card)
    }

    /// A client's answer to the pending target request.
    ///
    /// An invalid answer re-sends the same request to the same player.
    pub fn select_target(
        &mut self,
        player: PlayerId,
        choice: TargetChoice,
    ) -> Result<IntentOutcome, EngineError> {
        let Some(kind) = self.session.state().target_kind() else {
            return Ok(IntentOutcome::Rejected(RejectReason::NoPendingSelection));
        };
        let Some(pending) = self.session.state().pending().cloned() else {
            return Ok(IntentOutcome::Rejected(RejectReason::NoPendingSelection));
        };
        if pending.chooser != player {
            return Ok(IntentOutcome::Rejected(RejectReason::NotChooser));
        }

        let valid = match (kind, choice) {
            (TargetKind::Player, TargetChoice::Player(id)) => {
                self.is_valid_chosen_player(&pending, id)
            }
            (TargetKind::Card, TargetChoice::Card(id)) => self.is_valid_chosen_card(&pending, id),
            _ => false,
        };
        if !valid {
            warn!(%player, ?choice, effect = %pending.effect.definition, "invalid target, re-prompting");
            self.send_to(
                player,
                ServerMessage::SelectTarget {
                    kind,
                    effect: pending.effect.definition.clone(),
                    source: pending.source,
                },
            );
            return Ok(IntentOutcome::Reprompted);
        }

        self.session.take_pending();
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog
            .definition(&pending.effect.definition)
            .ok_or_else(|| EngineError::DefinitionNotFound(pending.effect.definition.clone()))?;
        let magnitude = self.roll_magnitude(&pending.effect);
        debug!(%player, ?choice, effect = %pending.effect.definition, magnitude, "target chosen");
        match (&definition.kind, choice) {
            (RuleKind::TargetsPlayer { action }, TargetChoice::Player(target)) => {
                self.apply_player_action(action, target, magnitude)?;
            }
            (RuleKind::TargetsCard { action, .. }, TargetChoice::Card(target)) => {
                self.apply_card_action(action, target, magnitude)?;
            }
            _ => {}
        }
        self.finish_effect(pending.source)?;
        self.drain_queue()?;
        Ok(IntentOutcome::Applied)
    }

    /// Resolve queued firings until one of them asks for a target again.
    fn drain_queue(&mut self) -> Result<(), EngineError> {
        while self.session.is_idle() {
            let Some(firing) = self.session.pop_queued() else {
                break;
            };
            if self.game.live_card(firing.source).is_none() {
                continue;
            }
            self.resolve_firing(firing.effect, firing.source)?;
        }
        Ok(())
    }

    /// Abandon any pending selection and queued firings at a turn boundary.
    pub(crate) fn abandon_selection(&mut self) {
        let (had_pending, dropped) = self.session.abandon();
        if had_pending || dropped > 0 {
            debug!(had_pending, dropped, "pending resolution abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::Trigger;

    fn pending() -> PendingEffect {
        PendingEffect {
            effect: EffectInstance::new("Buff", Trigger::CardAttacked),
            source: LiveCardId(1),
            chooser: PlayerId(0),
        }
    }

    #[test]
    fn test_abandon_clears_state_and_queue() {
        let mut session = ResolutionSession::new();
        session.await_target(TargetKind::Card, pending());
        session.enqueue(EffectInstance::new("Buff", Trigger::CardAttacked), LiveCardId(2));
        session.enqueue(EffectInstance::new("Buff", Trigger::CardAttacked), LiveCardId(3));
        assert_eq!(session.state().target_kind(), Some(TargetKind::Card));

        assert_eq!(session.abandon(), (true, 2));
        assert!(session.is_idle());
        assert_eq!(session.queued(), 0);
        assert_eq!(session.abandon(), (false, 0));
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut session = ResolutionSession::new();
        session.enqueue(EffectInstance::new("A", Trigger::CardAttacked), LiveCardId(1));
        session.enqueue(EffectInstance::new("B", Trigger::CardAttacked), LiveCardId(2));
        assert_eq!(session.pop_queued().map(|f| f.source), Some(LiveCardId(1)));
        assert_eq!(session.pop_queued().map(|f| f.source), Some(LiveCardId(2)));
        assert!(session.pop_queued().is_none());
    }
}
