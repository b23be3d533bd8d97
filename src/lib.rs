pub mod attributes;
pub mod catalog;
pub mod config;
pub mod decision;
pub mod engine;
pub mod executor;
pub mod game_state;
pub mod ids;
pub mod lifecycle;
pub mod live_card;
pub mod net;
pub mod player;
pub mod resolution;
pub mod snapshot;
pub mod spawn;
pub mod triggers;
pub mod turn;
pub mod zone;

#[cfg(test)]
mod tests;

pub use catalog::{
    AttributeDefinition, CardAction, CardInstance, CardTarget, CardTypeTemplate, Catalog,
    CatalogBuilder, CatalogError, EffectInstance, EffectTarget, GameAction, GeneralAction,
    Magnitude, PlayerAction, PlayerSubset, PlayerTarget, ResourceCost, RuleCategory,
    RuleDefinition, RuleKind, ScheduledAction, ZoneDefinition,
};
pub use config::EngineConfig;
pub use decision::{IntentOutcome, RejectReason};
pub use engine::Match;
pub use executor::EngineError;
pub use game_state::{GameState, MatchStatus, TurnState};
pub use ids::{CardId, ConnectionId, LiveCardId, NetHandle, PlayerId};
pub use lifecycle::{DestructionQueue, DestructionReason};
pub use live_card::LiveCard;
pub use net::{
    ClientIntent, InboundMessage, Inbox, MatchServer, RecordingTransport, ServerMessage,
    TargetChoice, TargetKind, Transport,
};
pub use player::{LastPlayed, PlayerState};
pub use resolution::{PendingEffect, ResolutionSession, SessionState};
pub use snapshot::{GameSnapshot, LiveCardSnapshot, PlayerSnapshot, ZoneSnapshot};
pub use spawn::{SequentialSpawner, SpawnFactory};
pub use triggers::{
    ComparisonOp, Condition, Direction, PlayerSource, Trigger, TriggerEvent, TurnCountMode,
    TurnPhase,
};
pub use turn::PendingDiscard;
pub use zone::{Zone, ZoneContents, ZoneKind};
