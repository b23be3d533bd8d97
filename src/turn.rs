//! Turn sequencing.
//!
//! Registration, the start and end of turns, early turn end with the
//! hand-limit discard flow, and the turn clock. Turn order is registration
//! order; the turn number increments each time the order wraps around.

use std::sync::Arc;
use std::time::Instant;

use rand::seq::IndexedRandom;
use tracing::{debug, error, info, warn};

use crate::catalog::{GameAction, PlayerSubset, ScheduledAction};
use crate::decision::{IntentOutcome, RejectReason};
use crate::engine::Match;
use crate::executor::EngineError;
use crate::game_state::MatchStatus;
use crate::ids::{CardId, ConnectionId, PlayerId};
use crate::net::{ServerMessage, Transport};
use crate::player::PlayerState;
use crate::triggers::{TriggerEvent, TurnPhase};

/// Turn boundaries never abort halfway: a step that fails (a runaway cascade,
/// a missing attribute) is reported and the turn change carries on.
fn skip_failed_step(step: &'static str, result: Result<(), EngineError>) {
    if let Err(err) = result {
        error!(step, %err, "turn boundary step failed, continuing");
    }
}

/// A hand-limit discard the active player still owes before their turn ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDiscard {
    pub player: PlayerId,
    pub count: usize,
}

impl<T: Transport> Match<T> {
    // ========================================================================
    // Registration
    // ========================================================================

    /// Seat a new player with `deck` in their deck zone (last card on top).
    pub fn register_player(
        &mut self,
        name: &str,
        connection: ConnectionId,
        deck: &[CardId],
    ) -> Result<PlayerId, EngineError> {
        if self.game.turn.status != MatchStatus::NotStarted {
            return Err(EngineError::RegistrationClosed);
        }
        if self.game.players.len() >= self.config.players_per_match {
            return Err(EngineError::MatchFull);
        }
        if let Some(&unknown) = deck.iter().find(|&&card| self.catalog.card(card).is_none()) {
            return Err(EngineError::UnknownCard(unknown));
        }
        let index = u8::try_from(self.game.players.len()).map_err(|_| EngineError::MatchFull)?;
        let id = PlayerId::from_index(index);

        let mut state = PlayerState::new(id, name, connection, &self.catalog);
        match state.zone_mut(&self.config.deck_zone) {
            Some(zone) => {
                for &card in deck {
                    zone.push_card(card);
                }
            }
            None if !deck.is_empty() => {
                return Err(EngineError::UnknownZone {
                    player: id,
                    zone: self.config.deck_zone.clone(),
                });
            }
            None => {}
        }
        let handle = state.net_handle;
        self.game.players.push(state);

        info!(player = %id, name, deck = deck.len(), "player registered");
        self.broadcast(ServerMessage::PlayerRegistered {
            player: id,
            name: name.to_string(),
            handle,
        });
        Ok(id)
    }

    /// Mark a player disconnected. Nothing is sent to them afterwards.
    pub fn disconnect_player(&mut self, player: PlayerId) {
        if let Some(state) = self.game.player_mut(player) {
            state.is_connected = false;
            info!(%player, "player disconnected");
        }
    }

    // ========================================================================
    // Turns
    // ========================================================================

    /// Start the match: run game-start actions, then the first turn.
    pub fn start_game(&mut self, now: Instant) -> Result<(), EngineError> {
        if self.game.turn.status != MatchStatus::NotStarted {
            warn!("start_game called twice");
            return Ok(());
        }
        if self.game.players.is_empty() {
            return Err(EngineError::NoPlayers);
        }
        self.game.turn.status = MatchStatus::Running;
        self.game.turn.active_index = 0;
        self.game.turn.turn_number = 1;
        info!(players = self.game.players.len(), "game started");

        let catalog = Arc::clone(&self.catalog);
        self.run_scheduled_actions(catalog.game_start_actions());
        self.broadcast_per_viewer(|snapshot| ServerMessage::GameStarted { snapshot });
        self.start_turn(now);
        Ok(())
    }

    /// Always completes: a failing trigger or action is logged and skipped.
    fn start_turn(&mut self, now: Instant) {
        self.abandon_selection();
        self.pending_discard = None;
        let Some(active) = self.game.active_player() else {
            return;
        };
        let turn_number = self.game.turn.turn_number;
        info!(player = %active, turn_number, "turn started");

        let catalog = Arc::clone(&self.catalog);
        self.run_scheduled_actions(catalog.turn_start_actions());
        let started = self.fire_on_all_cards(&TriggerEvent::PlayerLifecycle {
            phase: TurnPhase::TurnStart,
            player: active,
        });
        skip_failed_step("turn start triggers", started);

        for card in self.game.live_cards_in_order() {
            let Some(live) = self.game.live_card_mut(card) else {
                continue;
            };
            if !live.alive {
                continue;
            }
            live.turns_in_play = live.turns_in_play.saturating_add(1);
            let turns_in_play = live.turns_in_play;
            let counted = self.trigger_effect(&TriggerEvent::TurnCount { turns_in_play }, card);
            skip_failed_step("turn count triggers", counted);
        }

        self.turn_deadline = Some(now + self.config.turn_duration());
        self.broadcast_per_viewer(|snapshot| ServerMessage::TurnStarted {
            player: active,
            turn_number,
            snapshot,
        });
    }

    /// The active player asks to end their turn early.
    ///
    /// Over the hand limit, they are asked to discard first and the turn ends
    /// once [`Match::discard_cards`] succeeds.
    pub fn stop_turn(&mut self, player: PlayerId, now: Instant) -> Result<IntentOutcome, EngineError> {
        if !self.game.is_running() {
            return Ok(IntentOutcome::Rejected(RejectReason::GameNotRunning));
        }
        if self.game.active_player() != Some(player) {
            return Ok(IntentOutcome::Rejected(RejectReason::NotActivePlayer));
        }
        if self.pending_discard.is_some() {
            return Ok(IntentOutcome::Rejected(RejectReason::DiscardPending));
        }

        let excess = self.hand_excess(player);
        if excess > 0 {
            debug!(%player, excess, "over hand limit, discard requested");
            self.pending_discard = Some(PendingDiscard {
                player,
                count: excess,
            });
            self.send_to(player, ServerMessage::SelectDiscard { count: excess });
            return Ok(IntentOutcome::Deferred);
        }
        self.end_turn(now)?;
        Ok(IntentOutcome::Applied)
    }

    /// Reply to a discard request. The named cards must all be in hand and
    /// number exactly the requested count.
    pub fn discard_cards(
        &mut self,
        player: PlayerId,
        cards: &[CardId],
        now: Instant,
    ) -> Result<IntentOutcome, EngineError> {
        let Some(pending) = self.pending_discard.filter(|pending| pending.player == player) else {
            return Ok(IntentOutcome::Rejected(RejectReason::NoPendingDiscard));
        };

        if cards.len() != pending.count || !self.hand_holds_all(player, cards) {
            warn!(%player, ?cards, count = pending.count, "invalid discard, re-prompting");
            self.send_to(
                player,
                ServerMessage::SelectDiscard {
                    count: pending.count,
                },
            );
            return Ok(IntentOutcome::Reprompted);
        }

        for &card in cards {
            self.discard_from_hand(player, card);
        }
        debug!(%player, discarded = cards.len(), "discard accepted");
        self.pending_discard = None;
        self.end_turn(now)?;
        Ok(IntentOutcome::Applied)
    }

    /// End the active player's turn and start the next one.
    ///
    /// Only fails when no game is running. Trigger and action failures along
    /// the way are logged and skipped, so the turn always advances.
    pub fn end_turn(&mut self, now: Instant) -> Result<(), EngineError> {
        if !self.game.is_running() {
            return Err(EngineError::GameNotRunning);
        }
        let Some(active) = self.game.active_player() else {
            return Err(EngineError::GameNotRunning);
        };
        let turn_number = self.game.turn.turn_number;

        self.abandon_selection();
        self.count_down_destructions();
        self.force_discard(active);
        self.pending_discard = None;

        let catalog = Arc::clone(&self.catalog);
        self.run_scheduled_actions(catalog.turn_end_actions());
        let ended = self.fire_on_all_cards(&TriggerEvent::PlayerLifecycle {
            phase: TurnPhase::TurnEnd,
            player: active,
        });
        skip_failed_step("turn end triggers", ended);
        self.destroy_after_effect_cards();
        for player in &mut self.game.players {
            player.last_card_played = None;
        }

        info!(player = %active, turn_number, "turn ended");
        self.broadcast(ServerMessage::TurnEnded {
            player: active,
            turn_number,
        });

        let turn = &mut self.game.turn;
        turn.active_index += 1;
        if turn.active_index >= self.game.players.len() {
            turn.active_index = 0;
            turn.turn_number += 1;
        }
        self.turn_deadline = None;

        if self.game.is_running() {
            self.start_turn(now);
        }
        Ok(())
    }

    /// Advance the turn clock. Returns true if the turn timed out and ended.
    pub fn tick(&mut self, now: Instant) -> Result<bool, EngineError> {
        let expired = self.game.is_running()
            && self.turn_deadline.is_some_and(|deadline| now >= deadline);
        if !expired {
            return Ok(false);
        }
        debug!("turn timer elapsed");
        self.end_turn(now)?;
        Ok(true)
    }

    pub fn turn_deadline(&self) -> Option<Instant> {
        self.turn_deadline
    }

    pub fn pending_discard(&self) -> Option<PendingDiscard> {
        self.pending_discard
    }

    /// End the match. Later turn operations are refused.
    pub fn end_game(&mut self, winner: Option<PlayerId>) {
        if matches!(self.game.turn.status, MatchStatus::Ended { .. }) {
            return;
        }
        self.game.turn.status = MatchStatus::Ended { winner };
        self.turn_deadline = None;
        self.pending_discard = None;
        self.abandon_selection();
        info!(?winner, "game ended");
        self.broadcast(ServerMessage::GameEnded { winner });
    }

    // ========================================================================
    // Hand Limit
    // ========================================================================

    fn hand_excess(&self, player: PlayerId) -> usize {
        self.game
            .player(player)
            .map_or(0, |state| state.zone_len(&self.config.hand_zone))
            .saturating_sub(self.config.max_hand_size)
    }

    fn hand_holds_all(&self, player: PlayerId, cards: &[CardId]) -> bool {
        let Some(hand) = self
            .game
            .player(player)
            .and_then(|state| state.zone(&self.config.hand_zone))
        else {
            return false;
        };
        let mut remaining = hand.card_ids().to_vec();
        cards.iter().all(|card| {
            match remaining.iter().position(|held| held == card) {
                Some(index) => {
                    remaining.swap_remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Discard random cards until the hand is back at the limit.
    fn force_discard(&mut self, player: PlayerId) {
        let excess = self.hand_excess(player);
        for _ in 0..excess {
            let picked = self
                .game
                .player(player)
                .and_then(|state| state.zone(&self.config.hand_zone))
                .and_then(|hand| hand.card_ids().choose(&mut self.rng).copied());
            let Some(card) = picked else {
                break;
            };
            self.discard_from_hand(player, card);
        }
        if excess > 0 {
            debug!(%player, excess, "hand excess discarded at random");
        }
    }

    /// Hand to graveyard, or out of the game when there is no graveyard zone.
    fn discard_from_hand(&mut self, player: PlayerId, card: CardId) {
        let hand = self.config.hand_zone.clone();
        let graveyard = self.config.graveyard_zone.clone();
        let Some(state) = self.game.player_mut(player) else {
            return;
        };
        let removed = state.zone_mut(&hand).is_some_and(|zone| zone.remove_card(card));
        if removed
            && let Some(graveyard) = graveyard
            && let Some(zone) = state.zone_mut(&graveyard)
        {
            zone.push_card(card);
        }
    }

    // ========================================================================
    // Scheduled Actions
    // ========================================================================

    fn run_scheduled_actions(&mut self, actions: &[ScheduledAction]) {
        for scheduled in actions {
            let targets = match scheduled.target {
                PlayerSubset::CurrentPlayer => self.game.active_player().into_iter().collect(),
                PlayerSubset::CurrentOpponents => self.game.current_opponents(),
                PlayerSubset::AllPlayers => self.game.player_ids(),
            };
            for player in targets {
                let result = self.run_game_action(&scheduled.action, player);
                skip_failed_step("scheduled action", result);
            }
        }
    }

    fn run_game_action(&mut self, action: &GameAction, player: PlayerId) -> Result<(), EngineError> {
        match action {
            GameAction::IncreaseAttribute { attribute, value } => {
                let current = self.player_attribute(player, attribute)?;
                self.set_player_attribute(player, attribute, current.saturating_add(*value))
            }
            GameAction::DecreaseAttribute { attribute, value } => {
                let current = self.player_attribute(player, attribute)?;
                self.set_player_attribute(player, attribute, current.saturating_sub(*value))
            }
            GameAction::SetAttribute { attribute, value } => {
                self.set_player_attribute(player, attribute, *value)
            }
            GameAction::MoveCards { from, to, count } => {
                self.move_cards(player, from, to, *count as usize).map(|_| ())
            }
            GameAction::ShuffleZone { zone } => {
                if let Some(target) = self
                    .game
                    .player_mut(player)
                    .and_then(|state| state.zone_mut(zone))
                {
                    target.shuffle(&mut self.rng);
                }
                Ok(())
            }
        }
    }
}
