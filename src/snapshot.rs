//! Viewer-specific state snapshots pushed to clients.
//!
//! Private zones of other players are reduced to their card count.

use std::collections::BTreeMap;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::game_state::GameState;
use crate::ids::{CardId, LiveCardId, PlayerId};
use crate::live_card::LiveCard;
use crate::zone::Zone;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LiveCardSnapshot {
    pub id: LiveCardId,
    pub card: CardId,
    pub owner: PlayerId,
    pub alive: bool,
    pub turns_in_play: u32,
    pub attributes: BTreeMap<String, i32>,
}

impl LiveCardSnapshot {
    pub fn from_live(card: &LiveCard) -> Self {
        Self {
            id: card.id,
            card: card.card,
            owner: card.owner,
            alive: card.alive,
            turns_in_play: card.turns_in_play,
            attributes: card
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), *value))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ZoneSnapshot {
    pub name: String,
    pub count: usize,
    /// Identifiers of a static zone; `None` when hidden from the viewer.
    pub cards: Option<Vec<CardId>>,
    pub live_cards: Vec<LiveCardSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub is_connected: bool,
    pub attributes: BTreeMap<String, i32>,
    pub zones: Vec<ZoneSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GameSnapshot {
    pub turn_number: u32,
    pub active_player: Option<PlayerId>,
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    /// Snapshot as seen by `viewer` (`None` sees only public information).
    pub fn for_viewer(game: &GameState, viewer: Option<PlayerId>) -> Self {
        let players = game
            .players
            .iter()
            .map(|player| {
                let visible_to_viewer = viewer == Some(player.id);
                PlayerSnapshot {
                    id: player.id,
                    name: player.name.clone(),
                    is_connected: player.is_connected,
                    attributes: player
                        .attributes
                        .iter()
                        .map(|(name, value)| (name.clone(), *value))
                        .collect(),
                    zones: player
                        .zones
                        .iter()
                        .map(|zone| zone_snapshot(game, zone, visible_to_viewer))
                        .collect(),
                }
            })
            .collect();
        Self {
            turn_number: game.turn.turn_number,
            active_player: game.active_player(),
            players,
        }
    }
}

fn zone_snapshot(game: &GameState, zone: &Zone, owner_is_viewer: bool) -> ZoneSnapshot {
    let hidden = zone.is_private && !owner_is_viewer;
    ZoneSnapshot {
        name: zone.name.clone(),
        count: zone.len(),
        cards: (!hidden).then(|| zone.card_ids().to_vec()),
        live_cards: if hidden {
            Vec::new()
        } else {
            zone.live_cards()
                .iter()
                .filter_map(|id| game.live_card(*id))
                .map(LiveCardSnapshot::from_live)
                .collect()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardInstance, CardTypeTemplate, Catalog, ZoneDefinition};
    use crate::ids::ConnectionId;
    use crate::player::PlayerState;

    #[test]
    fn test_private_zone_hidden_from_other_players() {
        let catalog = Catalog::builder()
            .zone(ZoneDefinition::static_zone("Hand", true))
            .zone(ZoneDefinition::static_zone("Graveyard", false))
            .card_type(CardTypeTemplate::new("Creature"))
            .card(CardInstance::new(1, "Squire", "Creature"))
            .build()
            .expect("catalog");
        let mut game = GameState::new();
        let mut alice = PlayerState::new(PlayerId(0), "Alice", ConnectionId(1), &catalog);
        for zone in ["Hand", "Graveyard"] {
            if let Some(zone) = alice.zone_mut(zone) {
                zone.push_card(CardId(1));
            }
        }
        game.players.push(alice);
        game.players
            .push(PlayerState::new(PlayerId(1), "Bob", ConnectionId(2), &catalog));

        let own = GameSnapshot::for_viewer(&game, Some(PlayerId(0)));
        assert_eq!(own.players[0].zones[0].cards, Some(vec![CardId(1)]));

        let other = GameSnapshot::for_viewer(&game, Some(PlayerId(1)));
        assert_eq!(other.players[0].zones[0].cards, None);
        assert_eq!(other.players[0].zones[0].count, 1);
        assert_eq!(other.players[0].zones[1].cards, Some(vec![CardId(1)]));
    }
}
