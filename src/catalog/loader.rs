//! JSON catalog loading.
//!
//! The authoring tool writes a single document shaped like [`CatalogSource`];
//! this module only deserializes it and hands it to [`CatalogBuilder`].

use serde::{Deserialize, Serialize};

use super::{
    AttributeDefinition, CardInstance, CardTypeTemplate, Catalog, CatalogBuilder, CatalogError,
    RuleDefinition, ScheduledAction, ZoneDefinition,
};

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    pub definitions: Vec<RuleDefinition>,
    pub card_types: Vec<CardTypeTemplate>,
    pub cards: Vec<CardInstance>,
    pub player_attributes: Vec<AttributeDefinition>,
    pub zones: Vec<ZoneDefinition>,
    pub game_start_actions: Vec<ScheduledAction>,
    pub turn_start_actions: Vec<ScheduledAction>,
    pub turn_end_actions: Vec<ScheduledAction>,
}

impl CatalogSource {
    pub fn into_builder(self) -> CatalogBuilder {
        CatalogBuilder {
            definitions: self.definitions,
            card_types: self.card_types,
            cards: self.cards,
            player_attributes: self.player_attributes,
            zones: self.zones,
            game_start_actions: self.game_start_actions,
            turn_start_actions: self.turn_start_actions,
            turn_end_actions: self.turn_end_actions,
        }
    }
}

impl Catalog {
    /// Parse and validate a JSON catalog document.
    pub fn from_json(text: &str) -> Result<Catalog, CatalogError> {
        let source: CatalogSource =
            serde_json::from_str(text).map_err(|err| CatalogError::Parse(err.to_string()))?;
        source.into_builder().build()
    }
}
