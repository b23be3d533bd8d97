//! Per-match entity state store.
//!
//! Players (with their zones and attributes), live cards, and the turn
//! position. Only the engine mutates it; the evaluators in
//! [`triggers`](crate::triggers) only ever borrow it immutably.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::ids::{LiveCardId, PlayerId};
use crate::live_card::LiveCard;
use crate::player::PlayerState;
use crate::triggers::CardSubject;

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStatus {
    #[default]
    NotStarted,
    Running,
    Ended {
        winner: Option<PlayerId>,
    },
}

/// Turn position tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnState {
    pub status: MatchStatus,
    /// Index into `GameState::players` of the active player.
    pub active_index: usize,
    /// Incremented every time the active index wraps around.
    pub turn_number: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub players: Vec<PlayerState>,
    live_cards: HashMap<LiveCardId, LiveCard>,
    pub turn: TurnState,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.turn.status == MatchStatus::Running
    }

    // === Players ===

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id).collect()
    }

    pub fn connected_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|player| player.is_connected)
    }

    /// The active player while the match is running.
    pub fn active_player(&self) -> Option<PlayerId> {
        if !self.is_running() {
            return None;
        }
        self.players.get(self.turn.active_index).map(|player| player.id)
    }

    /// Every player other than the active one.
    pub fn current_opponents(&self) -> Vec<PlayerId> {
        let active = self.active_player();
        self.players
            .iter()
            .map(|player| player.id)
            .filter(|id| Some(*id) != active)
            .collect()
    }

    // === Live cards ===

    pub fn live_card(&self, id: LiveCardId) -> Option<&LiveCard> {
        self.live_cards.get(&id)
    }

    pub fn live_card_mut(&mut self, id: LiveCardId) -> Option<&mut LiveCard> {
        self.live_cards.get_mut(&id)
    }

    pub fn insert_live_card(&mut self, card: LiveCard) {
        self.live_cards.insert(card.id, card);
    }

    pub fn remove_live_card(&mut self, id: LiveCardId) -> Option<LiveCard> {
        self.live_cards.remove(&id)
    }

    pub fn live_card_count(&self) -> usize {
        self.live_cards.len()
    }

    /// Every spawned card, players in registration order, zones in layout order.
    pub fn live_cards_in_order(&self) -> Vec<LiveCardId> {
        self.players
            .iter()
            .flat_map(|player| player.live_cards())
            .collect()
    }

    /// Owner and zone name of a spawned card.
    pub fn locate_live(&self, id: LiveCardId) -> Option<(PlayerId, &str)> {
        self.players.iter().find_map(|player| {
            player
                .zone_of_live(id)
                .map(|zone| (player.id, zone))
        })
    }

    /// Condition subject for a spawned card.
    pub fn card_subject<'a>(
        &'a self,
        catalog: &'a Catalog,
        id: LiveCardId,
    ) -> Option<CardSubject<'a>> {
        let live = self.live_cards.get(&id)?;
        let (card, card_type) = catalog.card_with_type(live.card)?;
        Some(CardSubject {
            card,
            card_type,
            attributes: &live.attributes,
        })
    }

    /// Condition subject for the last card a player played.
    ///
    /// Uses the live copy while it is still spawned, otherwise the template.
    pub fn last_played_subject<'a>(
        &'a self,
        catalog: &'a Catalog,
        player: PlayerId,
    ) -> Option<CardSubject<'a>> {
        let last = self.player(player)?.last_card_played?;
        if let Some(subject) = last.live.and_then(|live| self.card_subject(catalog, live)) {
            return Some(subject);
        }
        let (card, card_type) = catalog.card_with_type(last.card)?;
        Some(CardSubject::from_template(card, card_type))
    }
}
