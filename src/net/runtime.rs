//! Host-side loop around a [`Match`].
//!
//! Pulls inbound messages from an [`Inbox`], maps connections to players,
//! dispatches intents, drives the turn clock, and decides when the match is
//! over.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::decision::{IntentOutcome, RejectReason};
use crate::engine::Match;
use crate::executor::EngineError;
use crate::game_state::MatchStatus;
use crate::ids::{CardId, ConnectionId, PlayerId};

use super::{ClientIntent, Transport};

/// Incoming messages consumed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Intent {
        connection: ConnectionId,
        intent: ClientIntent,
    },
    Disconnected {
        connection: ConnectionId,
    },
}

/// What a receive produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Message(InboundMessage),
    /// The deadline passed first.
    TimedOut,
    /// No more messages will arrive.
    Closed,
}

/// Synchronous inbox for inbound messages.
pub trait Inbox {
    /// Block until a message arrives, `deadline` passes, or the inbox closes.
    /// `None` waits without a deadline.
    fn recv_until(&mut self, deadline: Option<Instant>) -> Received;
}

/// Inbox fed by another thread through a channel.
pub struct ChannelInbox {
    receiver: Receiver<InboundMessage>,
}

impl ChannelInbox {
    pub fn new(receiver: Receiver<InboundMessage>) -> Self {
        Self { receiver }
    }
}

impl Inbox for ChannelInbox {
    fn recv_until(&mut self, deadline: Option<Instant>) -> Received {
        match deadline {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match self.receiver.recv_timeout(timeout) {
                    Ok(message) => Received::Message(message),
                    Err(RecvTimeoutError::Timeout) => Received::TimedOut,
                    Err(RecvTimeoutError::Disconnected) => Received::Closed,
                }
            }
            None => match self.receiver.recv() {
                Ok(message) => Received::Message(message),
                Err(_) => Received::Closed,
            },
        }
    }
}

/// Inbox replaying a fixed list of messages, then closing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInbox {
    messages: VecDeque<InboundMessage>,
}

impl ScriptedInbox {
    pub fn new(messages: impl IntoIterator<Item = InboundMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
        }
    }
}

impl Inbox for ScriptedInbox {
    fn recv_until(&mut self, _deadline: Option<Instant>) -> Received {
        match self.messages.pop_front() {
            Some(message) => Received::Message(message),
            None => Received::Closed,
        }
    }
}

/// Runs one match against an inbox.
pub struct MatchServer<I: Inbox, T: Transport> {
    inbox: I,
    engine: Match<T>,
    players: HashMap<ConnectionId, PlayerId>,
}

impl<I: Inbox, T: Transport> MatchServer<I, T> {
    pub fn new(inbox: I, engine: Match<T>) -> Self {
        Self {
            inbox,
            engine,
            players: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &Match<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Match<T> {
        &mut self.engine
    }

    pub fn into_engine(self) -> Match<T> {
        self.engine
    }

    pub fn player_for(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.players.get(&connection).copied()
    }

    /// Serve until the inbox closes or the match ends.
    ///
    /// Engine errors are logged and the loop keeps going; a failed cascade
    /// leaves whatever it already applied in place.
    pub fn run(&mut self) {
        loop {
            if matches!(self.engine.state().turn.status, MatchStatus::Ended { .. }) {
                return;
            }
            match self.inbox.recv_until(self.engine.turn_deadline()) {
                Received::Message(message) => {
                    if let Err(err) = self.handle(message, Instant::now()) {
                        error!(%err, "message handling failed");
                    }
                }
                Received::TimedOut => {}
                Received::Closed => {
                    info!("inbox closed");
                    return;
                }
            }
            if let Err(err) = self.engine.tick(Instant::now()) {
                error!(%err, "turn clock failed");
            }
            self.check_defeat();
        }
    }

    /// Handle one inbound message at `now`.
    pub fn handle(
        &mut self,
        message: InboundMessage,
        now: Instant,
    ) -> Result<IntentOutcome, EngineError> {
        let outcome = match message {
            InboundMessage::Intent {
                connection,
                intent: ClientIntent::Register { name, deck },
            } => self.register(connection, &name, &deck, now)?,
            InboundMessage::Intent { connection, intent } => {
                let Some(player) = self.player_for(connection) else {
                    warn!(connection = connection.0, "intent from unregistered connection");
                    return Ok(IntentOutcome::Rejected(RejectReason::UnknownConnection));
                };
                self.engine.handle_intent(player, intent, now)?
            }
            InboundMessage::Disconnected { connection } => {
                if let Some(player) = self.player_for(connection) {
                    self.engine.disconnect_player(player);
                    self.end_if_abandoned();
                }
                IntentOutcome::Applied
            }
        };
        self.check_defeat();
        Ok(outcome)
    }

    fn register(
        &mut self,
        connection: ConnectionId,
        name: &str,
        deck: &[CardId],
        now: Instant,
    ) -> Result<IntentOutcome, EngineError> {
        if self.players.contains_key(&connection) {
            return Ok(IntentOutcome::Rejected(RejectReason::AlreadyRegistered));
        }
        let player = match self.engine.register_player(name, connection, deck) {
            Ok(player) => player,
            Err(err) => {
                warn!(connection = connection.0, %err, "registration refused");
                return Ok(IntentOutcome::Rejected(RejectReason::RegistrationRefused));
            }
        };
        self.players.insert(connection, player);

        if self.players.len() == self.engine.config().players_per_match {
            self.engine.start_game(now)?;
        }
        Ok(IntentOutcome::Applied)
    }

    /// End the match once a player's defeat attribute is at or below zero.
    ///
    /// The winner is the only player left above zero, if there is exactly one.
    fn check_defeat(&mut self) {
        if !self.engine.state().is_running() {
            return;
        }
        let Some(attribute) = self.engine.config().defeat_attribute.clone() else {
            return;
        };
        let players = &self.engine.state().players;
        let (defeated, standing): (Vec<_>, Vec<_>) = players
            .iter()
            .partition(|player| player.attribute(&attribute).is_some_and(|value| value <= 0));
        if defeated.is_empty() {
            return;
        }
        let winner = match standing.as_slice() {
            [only] => Some(only.id),
            _ => None,
        };
        self.engine.end_game(winner);
    }

    fn end_if_abandoned(&mut self) {
        let state = self.engine.state();
        if state.is_running() && state.connected_players().next().is_none() {
            info!("every player disconnected");
            self.engine.end_game(None);
        }
    }
}
