//! Outbound delivery seam.

use crate::ids::ConnectionId;

use super::ServerMessage;

/// Reliable single-recipient delivery provided by the hosting transport.
///
/// Broadcasts are built on top of this by the engine, which skips players
/// that are not connected.
pub trait Transport {
    fn send(&mut self, connection: ConnectionId, message: &ServerMessage);
}

/// Transport that keeps every message, for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    pub sent: Vec<(ConnectionId, ServerMessage)>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered to one connection, in order.
    pub fn messages_for(&self, connection: ConnectionId) -> Vec<&ServerMessage> {
        self.sent
            .iter()
            .filter(|(to, _)| *to == connection)
            .map(|(_, message)| message)
            .collect()
    }

    /// How many messages with the given name went out in total.
    pub fn count(&self, name: &str) -> usize {
        self.sent
            .iter()
            .filter(|(_, message)| message.name() == name)
            .count()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, connection: ConnectionId, message: &ServerMessage) {
        self.sent.push((connection, message.clone()));
    }
}
