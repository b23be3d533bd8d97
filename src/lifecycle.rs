//! Zone & lifecycle management.
//!
//! Moving cards between zones, spawning and despawning live cards, killing,
//! transforming, and the delayed physical destruction of killed cards.
//!
//! A static-to-dynamic move spawns a live card and fires `Enter` on it. A
//! dynamic-to-static move fires `Leave` first and despawns afterwards, so the
//! leave effects still see the card in its zone.

use std::sync::Arc;

use tracing::{debug, info};

use crate::decision::{IntentOutcome, RejectReason};
use crate::engine::Match;
use crate::executor::EngineError;
use crate::ids::{CardId, LiveCardId, PlayerId};
use crate::live_card::LiveCard;
use crate::net::{ServerMessage, Transport};
use crate::player::LastPlayed;
use crate::triggers::{Direction, TriggerEvent};
use crate::zone::{Zone, ZoneKind};

// ============================================================================
// Destruction Queue
// ============================================================================

/// Why a card is waiting for physical destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionReason {
    /// Killed; removed after a number of end-of-turn events.
    Killed,
    /// Its card type dies after firing; removed at the next end of turn.
    AfterEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDestruction {
    pub card: LiveCardId,
    pub remaining: u32,
    pub reason: DestructionReason,
}

/// Killed cards, in kill order.
#[derive(Debug, Clone, Default)]
pub struct DestructionQueue {
    entries: Vec<ScheduledDestruction>,
}

impl DestructionQueue {
    pub fn contains(&self, card: LiveCardId) -> bool {
        self.entries.iter().any(|entry| entry.card == card)
    }

    /// Schedule a card. A card already scheduled keeps its entry.
    pub fn schedule(&mut self, card: LiveCardId, remaining: u32, reason: DestructionReason) -> bool {
        if self.contains(card) {
            return false;
        }
        self.entries.push(ScheduledDestruction {
            card,
            remaining,
            reason,
        });
        true
    }

    pub fn cancel(&mut self, card: LiveCardId) {
        self.entries.retain(|entry| entry.card != card);
    }

    pub fn cards(&self) -> Vec<LiveCardId> {
        self.entries.iter().map(|entry| entry.card).collect()
    }

    /// One end-of-turn tick for killed cards. Returns the cards now due.
    pub fn count_down(&mut self) -> Vec<LiveCardId> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.reason != DestructionReason::Killed {
                return true;
            }
            entry.remaining = entry.remaining.saturating_sub(1);
            if entry.remaining == 0 {
                due.push(entry.card);
                false
            } else {
                true
            }
        });
        due
    }

    /// Remove and return every after-effect entry.
    pub fn take_after_effect(&mut self) -> Vec<LiveCardId> {
        let mut due = Vec::new();
        self.entries.retain(|entry| {
            if entry.reason == DestructionReason::AfterEffect {
                due.push(entry.card);
                false
            } else {
                true
            }
        });
        due
    }
}

fn unknown_zone(player: PlayerId, zone: &str) -> EngineError {
    EngineError::UnknownZone {
        player,
        zone: zone.to_string(),
    }
}

fn zone_event(direction: Direction, zone: &str) -> TriggerEvent {
    TriggerEvent::CardZoneTransition {
        direction,
        zone: zone.to_string(),
    }
}

impl<T: Transport> Match<T> {
    // ========================================================================
    // Zone Moves
    // ========================================================================

    /// Move up to `count` cards from the top of `from` to the top of `to`,
    /// both zones of `player`. Returns how many cards moved.
    ///
    /// The count is clamped to the origin's size; moving from an empty zone
    /// is a no-op.
    pub fn move_cards(
        &mut self,
        player: PlayerId,
        from: &str,
        to: &str,
        count: usize,
    ) -> Result<usize, EngineError> {
        let state = self
            .game
            .player(player)
            .ok_or(EngineError::UnknownPlayer(player))?;
        let from_kind = state
            .zone(from)
            .map(Zone::kind)
            .ok_or_else(|| unknown_zone(player, from))?;
        let to_kind = state
            .zone(to)
            .map(Zone::kind)
            .ok_or_else(|| unknown_zone(player, to))?;
        let count = count.min(state.zone_len(from));

        let mut moved = 0;
        for _ in 0..count {
            let step = match (from_kind, to_kind) {
                (ZoneKind::Static, ZoneKind::Static) => self.move_static(player, from, to),
                (ZoneKind::Static, ZoneKind::Dynamic) => self.move_into_play(player, from, to)?,
                (ZoneKind::Dynamic, ZoneKind::Static) => {
                    self.move_out_of_play(player, from, to)?
                }
                (ZoneKind::Dynamic, ZoneKind::Dynamic) => {
                    self.move_between_dynamic(player, from, to)?
                }
            };
            // Trigger effects may have emptied the origin in the meantime.
            if !step {
                break;
            }
            moved += 1;
        }
        debug!(%player, from, to, moved, "cards moved");
        Ok(moved)
    }

    /// Client move request: the active player moving between their own zones.
    pub fn request_move(
        &mut self,
        player: PlayerId,
        from: &str,
        to: &str,
        count: usize,
    ) -> Result<IntentOutcome, EngineError> {
        if !self.game.is_running() {
            return Ok(IntentOutcome::Rejected(RejectReason::GameNotRunning));
        }
        if self.game.active_player() != Some(player) {
            return Ok(IntentOutcome::Rejected(RejectReason::NotActivePlayer));
        }
        let zones_exist = self
            .game
            .player(player)
            .is_some_and(|state| state.zone(from).is_some() && state.zone(to).is_some());
        if !zones_exist {
            return Ok(IntentOutcome::Rejected(RejectReason::UnknownZone));
        }
        self.move_cards(player, from, to, count)?;
        self.broadcast_state();
        Ok(IntentOutcome::Applied)
    }

    fn move_static(&mut self, player: PlayerId, from: &str, to: &str) -> bool {
        let Some(card) = self.take_top_card(player, from) else {
            return false;
        };
        self.put_card(player, to, card)
    }

    fn move_into_play(&mut self, player: PlayerId, from: &str, to: &str) -> Result<bool, EngineError> {
        let Some(card) = self.take_top_card(player, from) else {
            return Ok(false);
        };
        self.enter_zone(player, card, to)?;
        Ok(true)
    }

    fn move_out_of_play(
        &mut self,
        player: PlayerId,
        from: &str,
        to: &str,
    ) -> Result<bool, EngineError> {
        let Some(card) = self.top_live(player, from) else {
            return Ok(false);
        };
        self.trigger_effect(&zone_event(Direction::LEAVE, from), card)?;

        let still_there = self
            .game
            .player(player)
            .and_then(|state| state.zone(from))
            .is_some_and(|zone| zone.contains_live(card));
        if still_there && let Some(removed) = self.despawn(card) {
            self.put_card(player, to, removed.card);
        }
        Ok(true)
    }

    fn move_between_dynamic(
        &mut self,
        player: PlayerId,
        from: &str,
        to: &str,
    ) -> Result<bool, EngineError> {
        let Some(card) = self.top_live(player, from) else {
            return Ok(false);
        };
        if let Some(state) = self.game.player_mut(player) {
            if let Some(zone) = state.zone_mut(from) {
                zone.remove_live(card);
            }
            if let Some(zone) = state.zone_mut(to) {
                zone.push_live(card);
            }
        }
        self.trigger_effect(&zone_event(Direction::LEAVE, from), card)?;
        self.trigger_effect(&zone_event(Direction::ENTER, to), card)?;
        Ok(true)
    }

    fn take_top_card(&mut self, player: PlayerId, zone: &str) -> Option<CardId> {
        self.game.player_mut(player)?.zone_mut(zone)?.pop_card()
    }

    fn top_live(&self, player: PlayerId, zone: &str) -> Option<LiveCardId> {
        self.game.player(player)?.zone(zone)?.top_live()
    }

    fn put_card(&mut self, player: PlayerId, zone: &str, card: CardId) -> bool {
        self.game
            .player_mut(player)
            .and_then(|state| state.zone_mut(zone))
            .is_some_and(|zone| zone.push_card(card))
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Spawn a live copy of `design` on top of a dynamic zone and fire `Enter`.
    pub(crate) fn enter_zone(
        &mut self,
        owner: PlayerId,
        design: CardId,
        zone: &str,
    ) -> Result<LiveCardId, EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let (card, card_type) = catalog
            .card_with_type(design)
            .ok_or(EngineError::UnknownCard(design))?;

        let id = self.spawner.spawn(card, owner);
        let placed = self
            .game
            .player_mut(owner)
            .and_then(|state| state.zone_mut(zone))
            .is_some_and(|target| target.push_live(id));
        if !placed {
            self.spawner.despawn(id);
            return Err(unknown_zone(owner, zone));
        }
        self.game
            .insert_live_card(LiveCard::spawn(id, card, card_type, owner));
        debug!(card = %id, design = %card.name, %owner, zone, "card spawned");
        self.broadcast(ServerMessage::CardSpawned {
            card: id,
            design,
            owner,
            zone: zone.to_string(),
        });

        self.trigger_effect(&zone_event(Direction::ENTER, zone), id)?;
        Ok(id)
    }

    /// Remove a live card from its zone and the store. Returns its last state.
    pub(crate) fn despawn(&mut self, card: LiveCardId) -> Option<LiveCard> {
        for player in &mut self.game.players {
            for zone in &mut player.zones {
                zone.remove_live(card);
            }
            if let Some(last) = &mut player.last_card_played
                && last.live == Some(card)
            {
                last.live = None;
            }
        }
        self.destructions.cancel(card);
        let removed = self.game.remove_live_card(card)?;
        self.spawner.despawn(card);
        Some(removed)
    }

    // ========================================================================
    // Putting Cards Into Play
    // ========================================================================

    /// The active player plays a card from their hand onto the board.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card: CardId,
    ) -> Result<IntentOutcome, EngineError> {
        if !self.game.is_running() {
            return Ok(IntentOutcome::Rejected(RejectReason::GameNotRunning));
        }
        if self.game.active_player() != Some(player) {
            return Ok(IntentOutcome::Rejected(RejectReason::NotActivePlayer));
        }
        let hand = self.config.hand_zone.clone();
        let in_hand = self
            .game
            .player(player)
            .and_then(|state| state.zone(&hand))
            .is_some_and(|zone| zone.contains_card(card));
        if !in_hand {
            return Ok(IntentOutcome::Rejected(RejectReason::CardNotInHand));
        }

        let catalog = Arc::clone(&self.catalog);
        let design = catalog.card(card).ok_or(EngineError::UnknownCard(card))?;
        if !self
            .game
            .player(player)
            .is_some_and(|state| state.can_pay(&design.costs))
        {
            return Ok(IntentOutcome::Rejected(RejectReason::CannotPay));
        }

        if let Some(zone) = self
            .game
            .player_mut(player)
            .and_then(|state| state.zone_mut(&hand))
        {
            zone.remove_card(card);
        }
        info!(%player, card = %design.name, "card played");
        for cost in &design.costs {
            let current = self.player_attribute(player, &cost.attribute)?;
            let paid = current.saturating_sub(cost.amount);
            self.set_player_attribute(player, &cost.attribute, paid)?;
        }

        let board = self.config.board_zone.clone();
        let live = self.enter_zone(player, card, &board)?;
        let live = self.game.live_card(live).map(|spawned| spawned.id);
        if let Some(state) = self.game.player_mut(player) {
            state.last_card_played = Some(LastPlayed { card, live });
        }
        self.fire_on_all_cards(&TriggerEvent::PlayerPlayedCard {
            player,
            card,
            card_type: design.card_type.clone(),
        })?;
        self.broadcast_state();
        Ok(IntentOutcome::Applied)
    }

    /// Put a fresh copy of the named design onto `owner`'s board.
    pub(crate) fn create_token(
        &mut self,
        owner: PlayerId,
        design: &str,
    ) -> Result<LiveCardId, EngineError> {
        let card = self
            .catalog
            .card_by_name(design)
            .map(|card| card.id)
            .ok_or_else(|| EngineError::UnknownCardName(design.to_string()))?;
        let board = self.config.board_zone.clone();
        self.enter_zone(owner, card, &board)
    }

    // ========================================================================
    // Kill, Transform, Destroy
    // ========================================================================

    /// Mark a card dead and schedule its physical destruction.
    ///
    /// Killing a card that is already scheduled does nothing.
    pub fn kill_card(&mut self, card: LiveCardId) -> Result<(), EngineError> {
        self.kill_with(card, DestructionReason::Killed)
    }

    pub(crate) fn kill_with(
        &mut self,
        card: LiveCardId,
        reason: DestructionReason,
    ) -> Result<(), EngineError> {
        if self.destructions.contains(card) {
            return Ok(());
        }
        let Some(live) = self.game.live_card_mut(card) else {
            return Ok(());
        };
        live.alive = false;
        let delay = match reason {
            DestructionReason::Killed => self.config.destruction_delay_turns,
            DestructionReason::AfterEffect => 0,
        };
        self.destructions.schedule(card, delay, reason);
        debug!(%card, ?reason, delay, "card killed");
        self.broadcast(ServerMessage::CardKilled { card });

        let zone = self
            .game
            .locate_live(card)
            .map(|(_, zone)| zone.to_string());
        if let Some(zone) = zone {
            self.trigger_effect(&zone_event(Direction::LEAVE, &zone), card)?;
        }
        Ok(())
    }

    /// Replace a live card with a fresh copy of another design, in place.
    ///
    /// The old card dies immediately without waiting for the destruction
    /// delay. Returns the new handle, or `None` if the card is not in play.
    pub fn transform_card(
        &mut self,
        card: LiveCardId,
        into: &str,
    ) -> Result<Option<LiveCardId>, EngineError> {
        let Some((owner, zone)) = self
            .game
            .locate_live(card)
            .map(|(owner, zone)| (owner, zone.to_string()))
        else {
            return Ok(None);
        };
        let catalog = Arc::clone(&self.catalog);
        let design = catalog
            .card_by_name(into)
            .ok_or_else(|| EngineError::UnknownCardName(into.to_string()))?;
        let card_type = catalog
            .card_type(&design.card_type)
            .ok_or_else(|| EngineError::UnknownCardType(design.card_type.clone()))?;

        if let Some(live) = self.game.live_card_mut(card) {
            live.alive = false;
        }
        self.destructions.cancel(card);
        self.trigger_effect(&zone_event(Direction::LEAVE, &zone), card)?;

        let new_id = self.spawner.spawn(design, owner);
        self.game
            .insert_live_card(LiveCard::spawn(new_id, design, card_type, owner));
        if let Some(target) = self
            .game
            .player_mut(owner)
            .and_then(|state| state.zone_mut(&zone))
            && !target.replace_live(card, new_id)
        {
            target.push_live(new_id);
        }
        self.despawn(card);
        info!(old = %card, new = %new_id, design = %design.name, "card transformed");
        self.broadcast(ServerMessage::CardTransformed {
            old: card,
            new: new_id,
            design: design.id,
        });

        self.trigger_effect(&zone_event(Direction::ENTER, &zone), new_id)?;
        Ok(Some(new_id))
    }

    /// End-of-turn countdown for killed cards.
    pub(crate) fn count_down_destructions(&mut self) {
        for card in self.destructions.count_down() {
            self.destroy_card(card);
        }
    }

    /// Remove every card that died after firing its effect.
    pub(crate) fn destroy_after_effect_cards(&mut self) {
        for card in self.destructions.take_after_effect() {
            self.destroy_card(card);
        }
    }

    /// Physically remove a card; its identifier goes to the owner's graveyard.
    fn destroy_card(&mut self, card: LiveCardId) {
        let Some(removed) = self.despawn(card) else {
            return;
        };
        if let Some(graveyard) = self.config.graveyard_zone.clone() {
            self.put_card(removed.owner, &graveyard, removed.card);
        }
        debug!(%card, "card destroyed");
        self.broadcast(ServerMessage::CardDestroyed { card });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_releases_after_delay() {
        let mut queue = DestructionQueue::default();
        assert!(queue.schedule(LiveCardId(1), 3, DestructionReason::Killed));
        assert!(!queue.schedule(LiveCardId(1), 3, DestructionReason::Killed));
        assert!(queue.count_down().is_empty());
        assert!(queue.count_down().is_empty());
        assert_eq!(queue.count_down(), vec![LiveCardId(1)]);
        assert!(!queue.contains(LiveCardId(1)));
    }

    #[test]
    fn test_after_effect_entries_skip_countdown() {
        let mut queue = DestructionQueue::default();
        queue.schedule(LiveCardId(1), 0, DestructionReason::AfterEffect);
        queue.schedule(LiveCardId(2), 2, DestructionReason::Killed);
        assert!(queue.count_down().is_empty());
        assert_eq!(queue.take_after_effect(), vec![LiveCardId(1)]);
        assert_eq!(queue.cards(), vec![LiveCardId(2)]);
    }
}
