//! Scenario tests driving a whole [`Match`](crate::engine::Match).
//!
//! `Table` seats Alice and Bob with the given decks over a
//! [`RecordingTransport`], starts the game, and offers shorthands for reading
//! the state back.


use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{
    CardAction, CardInstance, CardTypeTemplate, Catalog, CatalogBuilder, GeneralAction,
    PlayerAction, RuleDefinition, ZoneDefinition,
};
use crate::config::EngineConfig;
use crate::engine::Match;
use crate::ids::{CardId, ConnectionId, LiveCardId, PlayerId};
use crate::net::RecordingTransport;
use crate::triggers::{Direction, Trigger};

pub(crate) const SQUIRE: u32 = 1;
pub(crate) const FROG: u32 = 2;

pub(crate) const ALICE: ConnectionId = ConnectionId(1);
pub(crate) const BOB: ConnectionId = ConnectionId(2);

/// Definitions, card types and two plain cards shared by every scenario.
pub(crate) fn base_catalog() -> CatalogBuilder {
    Catalog::builder()
        .player_attribute("Life", 20)
        .player_attribute("Mana", 3)
        .zone(ZoneDefinition::static_zone("Deck", true))
        .zone(ZoneDefinition::static_zone("Hand", true))
        .zone(ZoneDefinition::dynamic_zone("Board"))
        .zone(ZoneDefinition::dynamic_zone("Reserve"))
        .zone(ZoneDefinition::static_zone("Graveyard", false))
        .definition(RuleDefinition::card(
            "Buff",
            CardAction::AddCounter {
                attribute: "Attack".into(),
            },
        ))
        .definition(RuleDefinition::card(
            "Damage",
            CardAction::RemoveCounter {
                attribute: "Health".into(),
            },
        ))
        .definition(RuleDefinition::player(
            "Heal",
            PlayerAction::IncreaseAttribute {
                attribute: "Life".into(),
            },
        ))
        .definition(RuleDefinition::player(
            "Drain",
            PlayerAction::DecreaseAttribute {
                attribute: "Life".into(),
            },
        ))
        .definition(RuleDefinition::player(
            "Draw",
            PlayerAction::MoveCards {
                from: "Deck".into(),
                to: "Hand".into(),
            },
        ))
        .definition(RuleDefinition::card("Slay", CardAction::Kill).with_target_card_type("Creature"))
        .definition(RuleDefinition::card(
            "Polymorph",
            CardAction::Transform {
                into: "Frog".into(),
            },
        ))
        .definition(RuleDefinition::general(
            "Summon",
            GeneralAction::CreateToken {
                card: "Frog".into(),
            },
        ))
        .definition(RuleDefinition::permanent("Ward"))
        .card_type(
            CardTypeTemplate::new("Creature")
                .attribute("Attack", 1)
                .attribute("Health", 3),
        )
        .card_type(
            CardTypeTemplate::new("Token")
                .attribute("Attack", 1)
                .attribute("Health", 1),
        )
        .card_type(CardTypeTemplate::new("Spell").destroy_after_triggering_effect())
        .card(CardInstance::new(SQUIRE, "Squire", "Creature"))
        .card(CardInstance::new(FROG, "Frog", "Token"))
}

pub(crate) fn test_config() -> EngineConfig {
    EngineConfig {
        rng_seed: Some(7),
        ..EngineConfig::default()
    }
}

pub(crate) fn enters_board() -> Trigger {
    Trigger::CardZoneTransition {
        direction: Direction::ENTER,
        zone: "Board".into(),
    }
}

pub(crate) fn leaves_board() -> Trigger {
    Trigger::CardZoneTransition {
        direction: Direction::LEAVE,
        zone: "Board".into(),
    }
}

fn ids(raw: &[u32]) -> Vec<CardId> {
    raw.iter().copied().map(CardId::from_raw).collect()
}

/// A started two-player match.
pub(crate) struct Table {
    pub engine: Match<RecordingTransport>,
    pub alice: PlayerId,
    pub bob: PlayerId,
    pub now: Instant,
}

impl Table {
    /// Decks list cards bottom to top.
    pub fn new(catalog: CatalogBuilder, config: EngineConfig, alice: &[u32], bob: &[u32]) -> Self {
        let catalog = catalog.build().expect("fixture catalog");
        let mut engine = Match::new(Arc::new(catalog), config, RecordingTransport::new());
        let alice = engine
            .register_player("Alice", ALICE, &ids(alice))
            .expect("register alice");
        let bob = engine
            .register_player("Bob", BOB, &ids(bob))
            .expect("register bob");
        let now = Instant::now();
        engine.start_game(now).expect("start game");
        Self {
            engine,
            alice,
            bob,
            now,
        }
    }

    /// Move the top `count` deck cards onto the board; returns the board afterwards.
    pub fn put_on_board(&mut self, player: PlayerId, count: usize) -> Vec<LiveCardId> {
        self.engine
            .move_cards(player, "Deck", "Board", count)
            .expect("move to board");
        self.board(player)
    }

    pub fn board(&self, player: PlayerId) -> Vec<LiveCardId> {
        self.live_in(player, "Board")
    }

    pub fn live_in(&self, player: PlayerId, zone: &str) -> Vec<LiveCardId> {
        self.engine
            .state()
            .player(player)
            .and_then(|state| state.zone(zone))
            .map(|zone| zone.live_cards().to_vec())
            .unwrap_or_default()
    }

    pub fn zone_cards(&self, player: PlayerId, zone: &str) -> Vec<CardId> {
        self.engine
            .state()
            .player(player)
            .and_then(|state| state.zone(zone))
            .map(|zone| zone.card_ids().to_vec())
            .unwrap_or_default()
    }

    pub fn card_attr(&self, card: LiveCardId, attribute: &str) -> i32 {
        self.engine
            .state()
            .live_card(card)
            .and_then(|live| live.attribute(attribute))
            .expect("card attribute")
    }

    pub fn player_attr(&self, player: PlayerId, attribute: &str) -> i32 {
        self.engine
            .state()
            .player(player)
            .and_then(|state| state.attribute(attribute))
            .expect("player attribute")
    }

    /// Messages of one kind delivered to a connection.
    pub fn sent_to(&self, connection: ConnectionId, name: &str) -> usize {
        self.engine
            .transport()
            .messages_for(connection)
            .iter()
            .filter(|message| message.name() == name)
            .count()
    }

    pub fn end_turn(&mut self) {
        self.engine.end_turn(self.now).expect("end turn");
    }
}
