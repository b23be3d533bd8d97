//! Wire-level message shapes and the transport seam.
//!
//! The engine never serializes anything itself: it hands typed
//! [`ServerMessage`]s to a [`Transport`] and receives typed [`ClientIntent`]s
//! from whatever decodes the wire format.

pub mod runtime;
pub mod transport;

pub use runtime::{ChannelInbox, Inbox, InboundMessage, MatchServer, Received, ScriptedInbox};
pub use transport::{RecordingTransport, Transport};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::ids::{CardId, LiveCardId, NetHandle, PlayerId};
use crate::snapshot::GameSnapshot;

/// What kind of object a target request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TargetKind {
    Player,
    Card,
}

/// A client's answer to a target request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TargetChoice {
    Player(PlayerId),
    Card(LiveCardId),
}

/// Messages from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum ClientIntent {
    Register { name: String, deck: Vec<CardId> },
    PlayCard { card: CardId },
    StopTurn,
    MoveCards { from: String, to: String, count: u32 },
    SelectTarget { choice: TargetChoice },
    DiscardCards { cards: Vec<CardId> },
}

/// Messages to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "type"))]
pub enum ServerMessage {
    PlayerRegistered {
        player: PlayerId,
        name: String,
        handle: NetHandle,
    },
    GameStarted {
        snapshot: GameSnapshot,
    },
    TurnStarted {
        player: PlayerId,
        turn_number: u32,
        snapshot: GameSnapshot,
    },
    TurnEnded {
        player: PlayerId,
        turn_number: u32,
    },
    StateUpdated {
        snapshot: GameSnapshot,
    },
    SelectTarget {
        kind: TargetKind,
        effect: String,
        source: LiveCardId,
    },
    SelectDiscard {
        count: usize,
    },
    CardSpawned {
        card: LiveCardId,
        design: CardId,
        owner: PlayerId,
        zone: String,
    },
    CardKilled {
        card: LiveCardId,
    },
    CardDestroyed {
        card: LiveCardId,
    },
    CardTransformed {
        old: LiveCardId,
        new: LiveCardId,
        design: CardId,
    },
    GameEnded {
        winner: Option<PlayerId>,
    },
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::PlayerRegistered { .. } => "PlayerRegistered",
            ServerMessage::GameStarted { .. } => "GameStarted",
            ServerMessage::TurnStarted { .. } => "TurnStarted",
            ServerMessage::TurnEnded { .. } => "TurnEnded",
            ServerMessage::StateUpdated { .. } => "StateUpdated",
            ServerMessage::SelectTarget { .. } => "SelectTarget",
            ServerMessage::SelectDiscard { .. } => "SelectDiscard",
            ServerMessage::CardSpawned { .. } => "CardSpawned",
            ServerMessage::CardKilled { .. } => "CardKilled",
            ServerMessage::CardDestroyed { .. } => "CardDestroyed",
            ServerMessage::CardTransformed { .. } => "CardTransformed",
            ServerMessage::GameEnded { .. } => "GameEnded",
        }
    }
}

#[cfg(all(test, feature = "serialization"))]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_shape() {
        let intent: ClientIntent = serde_json::from_str(
            r#"{ "type": "SelectTarget", "choice": { "Card": 12 } }"#,
        )
        .expect("intent should parse");
        assert_eq!(
            intent,
            ClientIntent::SelectTarget {
                choice: TargetChoice::Card(LiveCardId(12)),
            }
        );
    }

    #[test]
    fn test_message_is_tagged() {
        let json = serde_json::to_string(&ServerMessage::SelectDiscard { count: 2 })
            .expect("message should serialize");
        assert_eq!(json, r#"{"type":"SelectDiscard","count":2}"#);
    }
}
