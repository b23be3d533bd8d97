//! The authoritative match.
//!
//! [`Match`] owns everything one game needs: the shared catalog, the entity
//! store, the resolution session, the destruction queue, and the outbound
//! transport. Its operations are spread over several modules:
//!
//! ```text
//! engine.rs      - construction, intent dispatch, messaging helpers
//! executor.rs    - target resolution and action application
//! attributes.rs  - cascading attribute writes
//! lifecycle.rs   - zone moves, spawn, kill, transform, destruction
//! resolution.rs  - trigger firing and target selection
//! turn.rs        - registration, turn sequencing, clock
//! ```
//!
//! Everything runs on the caller's thread. Each public entry point finishes
//! its whole trigger cascade before returning.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::decision::{IntentOutcome, RejectReason};
use crate::executor::EngineError;
use crate::game_state::GameState;
use crate::ids::{LiveCardId, PlayerId};
use crate::lifecycle::DestructionQueue;
use crate::net::{ClientIntent, ServerMessage, Transport};
use crate::resolution::{ResolutionSession, SessionState};
use crate::snapshot::GameSnapshot;
use crate::spawn::{SequentialSpawner, SpawnFactory};
use crate::triggers::TriggerEvent;
use crate::turn::PendingDiscard;

/// One running (or not yet started) match.
pub struct Match<T: Transport> {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) config: EngineConfig,
    pub(crate) game: GameState,
    pub(crate) session: ResolutionSession,
    pub(crate) destructions: DestructionQueue,
    pub(crate) pending_discard: Option<PendingDiscard>,
    pub(crate) turn_deadline: Option<Instant>,
    pub(crate) cascade_depth: usize,
    pub(crate) rng: StdRng,
    pub(crate) spawner: Box<dyn SpawnFactory + Send>,
    pub(crate) transport: T,
}

impl<T: Transport> Match<T> {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig, transport: T) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            catalog,
            config,
            game: GameState::new(),
            session: ResolutionSession::new(),
            destructions: DestructionQueue::default(),
            pending_discard: None,
            turn_deadline: None,
            cascade_depth: 0,
            rng,
            spawner: Box::new(SequentialSpawner::new()),
            transport,
        }
    }

    /// Replace the spawn factory. Only meaningful before any card is spawned.
    pub fn with_spawner(mut self, spawner: impl SpawnFactory + Send + 'static) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.game
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    /// Firings waiting for the current selection to resolve.
    pub fn queued_firings(&self) -> usize {
        self.session.queued()
    }

    /// Cards killed and not yet physically destroyed.
    pub fn pending_destructions(&self) -> Vec<LiveCardId> {
        self.destructions.cards()
    }

    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> GameSnapshot {
        GameSnapshot::for_viewer(&self.game, viewer)
    }

    // ========================================================================
    // Intent Dispatch
    // ========================================================================

    /// Handle one intent from a registered player.
    ///
    /// Registration goes through [`Match::register_player`] instead, since it
    /// needs the connection rather than a player.
    pub fn handle_intent(
        &mut self,
        player: PlayerId,
        intent: ClientIntent,
        now: Instant,
    ) -> Result<IntentOutcome, EngineError> {
        debug!(%player, ?intent, "intent");
        let outcome = match intent {
            ClientIntent::Register { .. } => {
                warn!(%player, "duplicate registration ignored");
                return Ok(IntentOutcome::Rejected(RejectReason::AlreadyRegistered));
            }
            ClientIntent::PlayCard { card } => self.play_card(player, card)?,
            ClientIntent::StopTurn => self.stop_turn(player, now)?,
            ClientIntent::MoveCards { from, to, count } => {
                self.request_move(player, &from, &to, count as usize)?
            }
            ClientIntent::SelectTarget { choice } => self.select_target(player, choice)?,
            ClientIntent::DiscardCards { cards } => self.discard_cards(player, &cards, now)?,
        };
        if let IntentOutcome::Rejected(reason) = outcome {
            warn!(%player, %reason, "intent rejected");
        }
        Ok(outcome)
    }

    /// Report that a card was attacked.
    pub fn card_attacked(&mut self, card: LiveCardId) -> Result<(), EngineError> {
        if self.game.live_card(card).is_none() {
            return Err(EngineError::UnknownLiveCard(card));
        }
        self.trigger_effect(&TriggerEvent::CardAttacked, card)?;
        self.broadcast_state();
        Ok(())
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Send to one player if they are connected.
    pub(crate) fn send_to(&mut self, player: PlayerId, message: ServerMessage) {
        let Some(state) = self.game.player(player) else {
            return;
        };
        if !state.is_connected {
            return;
        }
        let connection = state.connection;
        self.transport.send(connection, &message);
    }

    /// Send the same message to every connected player.
    pub(crate) fn broadcast(&mut self, message: ServerMessage) {
        let connections: Vec<_> = self
            .game
            .connected_players()
            .map(|player| player.connection)
            .collect();
        for connection in connections {
            self.transport.send(connection, &message);
        }
    }

    /// Send each connected player a message carrying their own view of the state.
    pub(crate) fn broadcast_per_viewer(
        &mut self,
        build: impl Fn(GameSnapshot) -> ServerMessage,
    ) {
        let viewers: Vec<_> = self
            .game
            .connected_players()
            .map(|player| (player.id, player.connection))
            .collect();
        for (viewer, connection) in viewers {
            let message = build(self.snapshot_for(Some(viewer)));
            self.transport.send(connection, &message);
        }
    }

    pub(crate) fn broadcast_state(&mut self) {
        self.broadcast_per_viewer(|snapshot| ServerMessage::StateUpdated { snapshot });
    }
}
