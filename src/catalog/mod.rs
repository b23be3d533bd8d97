//! Rule catalog.
//!
//! Game-wide, immutable definitions loaded once per match: rule definitions,
//! card-type templates, card designs, the player attribute schema, the zone
//! layout and the scheduled game/turn actions. A [`Catalog`] is only ever
//! produced by [`CatalogBuilder::build`], which validates every cross
//! reference, so the engine can treat a missing entry as a data bug.
//!
//! The catalog is shared read-only (`Arc<Catalog>`) between every match that
//! uses it and is passed into the engine explicitly.

pub mod card;
pub mod definition;
pub mod effect;
#[cfg(feature = "serialization")]
pub mod loader;
pub mod rules;

pub use card::{AttributeDefinition, CardInstance, CardTypeTemplate, ResourceCost};
pub use definition::{
    CardAction, GeneralAction, PlayerAction, RuleCategory, RuleDefinition, RuleKind,
};
pub use effect::{CardTarget, EffectInstance, EffectTarget, Magnitude, PlayerTarget};
#[cfg(feature = "serialization")]
pub use loader::CatalogSource;
pub use rules::{GameAction, PlayerSubset, ScheduledAction, ZoneDefinition};

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ids::CardId;
use crate::triggers::{ConditionSubject, Trigger, TurnCountMode};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while assembling or loading a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two entries of the same kind share a key.
    Duplicate { kind: &'static str, name: String },
    /// An effect names a rule definition that does not exist.
    UnknownDefinition { owner: String, definition: String },
    /// A card design names a card type that does not exist.
    UnknownCardType { card: String, card_type: String },
    /// A rule or action names a card design that does not exist.
    UnknownCard { owner: String, card: String },
    /// A rule or action names a zone that is not in the zone layout.
    UnknownZone { owner: String, zone: String },
    /// The effect's target shape does not fit its definition's category.
    IllegalTarget { owner: String, definition: String },
    /// A condition variant is not legal for the trigger or target shape.
    IllegalCondition { owner: String, definition: String },
    /// The definition's action needs a magnitude and the effect has none.
    MissingMagnitude { owner: String, definition: String },
    /// A random magnitude with `min > max`.
    InvalidMagnitude { owner: String, min: i32, max: i32 },
    /// `TurnCount { Every, 0 }`.
    InvalidTurnCount { owner: String },
    /// Malformed configuration text.
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Duplicate { kind, name } => write!(f, "Duplicate {kind} '{name}'"),
            CatalogError::UnknownDefinition { owner, definition } => {
                write!(f, "{owner}: unknown effect definition '{definition}'")
            }
            CatalogError::UnknownCardType { card, card_type } => {
                write!(f, "{card}: unknown card type '{card_type}'")
            }
            CatalogError::UnknownCard { owner, card } => {
                write!(f, "{owner}: unknown card '{card}'")
            }
            CatalogError::UnknownZone { owner, zone } => {
                write!(f, "{owner}: unknown zone '{zone}'")
            }
            CatalogError::IllegalTarget { owner, definition } => {
                write!(f, "{owner}: target shape does not fit '{definition}'")
            }
            CatalogError::IllegalCondition { owner, definition } => {
                write!(f, "{owner}: condition not allowed for '{definition}'")
            }
            CatalogError::MissingMagnitude { owner, definition } => {
                write!(f, "{owner}: '{definition}' needs a magnitude")
            }
            CatalogError::InvalidMagnitude { owner, min, max } => {
                write!(f, "{owner}: random magnitude {min}..={max} is empty")
            }
            CatalogError::InvalidTurnCount { owner } => {
                write!(f, "{owner}: turn count trigger every 0 turns")
            }
            CatalogError::Parse(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

// ============================================================================
// Catalog
// ============================================================================

/// Validated, read-only rule data for a match.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: HashMap<String, RuleDefinition>,
    card_types: HashMap<String, CardTypeTemplate>,
    cards: BTreeMap<CardId, CardInstance>,
    card_names: HashMap<String, CardId>,
    player_attributes: Vec<AttributeDefinition>,
    zones: Vec<ZoneDefinition>,
    game_start_actions: Vec<ScheduledAction>,
    turn_start_actions: Vec<ScheduledAction>,
    turn_end_actions: Vec<ScheduledAction>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn definition(&self, name: &str) -> Option<&RuleDefinition> {
        self.definitions.get(name)
    }

    pub fn card_type(&self, name: &str) -> Option<&CardTypeTemplate> {
        self.card_types.get(name)
    }

    pub fn card(&self, id: CardId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub fn card_by_name(&self, name: &str) -> Option<&CardInstance> {
        self.card_names.get(name).and_then(|id| self.cards.get(id))
    }

    /// Card design together with its type template.
    pub fn card_with_type(&self, id: CardId) -> Option<(&CardInstance, &CardTypeTemplate)> {
        let card = self.cards.get(&id)?;
        let card_type = self.card_types.get(&card.card_type)?;
        Some((card, card_type))
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardInstance> {
        self.cards.values()
    }

    /// True if `name` is a permanent rule definition.
    pub fn is_permanent(&self, name: &str) -> bool {
        self.definitions
            .get(name)
            .is_some_and(|definition| definition.category() == RuleCategory::Permanent)
    }

    pub fn player_attributes(&self) -> &[AttributeDefinition] {
        &self.player_attributes
    }

    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|zone| zone.name == name)
    }

    pub fn game_start_actions(&self) -> &[ScheduledAction] {
        &self.game_start_actions
    }

    pub fn turn_start_actions(&self) -> &[ScheduledAction] {
        &self.turn_start_actions
    }

    pub fn turn_end_actions(&self) -> &[ScheduledAction] {
        &self.turn_end_actions
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects catalog entries and validates them into a [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    definitions: Vec<RuleDefinition>,
    card_types: Vec<CardTypeTemplate>,
    cards: Vec<CardInstance>,
    player_attributes: Vec<AttributeDefinition>,
    zones: Vec<ZoneDefinition>,
    game_start_actions: Vec<ScheduledAction>,
    turn_start_actions: Vec<ScheduledAction>,
    turn_end_actions: Vec<ScheduledAction>,
}

impl CatalogBuilder {
    pub fn definition(mut self, definition: RuleDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn card_type(mut self, card_type: CardTypeTemplate) -> Self {
        self.card_types.push(card_type);
        self
    }

    pub fn card(mut self, card: CardInstance) -> Self {
        self.cards.push(card);
        self
    }

    pub fn player_attribute(mut self, name: impl Into<String>, base_value: i32) -> Self {
        self.player_attributes
            .push(AttributeDefinition::new(name, base_value));
        self
    }

    pub fn zone(mut self, zone: ZoneDefinition) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn game_start_action(mut self, action: ScheduledAction) -> Self {
        self.game_start_actions.push(action);
        self
    }

    pub fn turn_start_action(mut self, action: ScheduledAction) -> Self {
        self.turn_start_actions.push(action);
        self
    }

    pub fn turn_end_action(mut self, action: ScheduledAction) -> Self {
        self.turn_end_actions.push(action);
        self
    }

    /// Validate every cross reference and produce the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog {
            player_attributes: self.player_attributes,
            game_start_actions: self.game_start_actions,
            turn_start_actions: self.turn_start_actions,
            turn_end_actions: self.turn_end_actions,
            ..Catalog::default()
        };

        let mut zone_names = HashSet::new();
        for zone in self.zones {
            if !zone_names.insert(zone.name.clone()) {
                return Err(CatalogError::Duplicate {
                    kind: "zone",
                    name: zone.name,
                });
            }
            catalog.zones.push(zone);
        }

        let mut attribute_names = HashSet::new();
        for attribute in &catalog.player_attributes {
            if !attribute_names.insert(attribute.name.as_str()) {
                return Err(CatalogError::Duplicate {
                    kind: "player attribute",
                    name: attribute.name.clone(),
                });
            }
        }

        for definition in self.definitions {
            if catalog.definitions.contains_key(&definition.name) {
                return Err(CatalogError::Duplicate {
                    kind: "definition",
                    name: definition.name,
                });
            }
            catalog
                .definitions
                .insert(definition.name.clone(), definition);
        }

        for card_type in self.card_types {
            if catalog.card_types.contains_key(&card_type.name) {
                return Err(CatalogError::Duplicate {
                    kind: "card type",
                    name: card_type.name,
                });
            }
            catalog.card_types.insert(card_type.name.clone(), card_type);
        }

        for card in self.cards {
            if catalog.cards.contains_key(&card.id) {
                return Err(CatalogError::Duplicate {
                    kind: "card id",
                    name: card.id.to_string(),
                });
            }
            if catalog.card_names.contains_key(&card.name) {
                return Err(CatalogError::Duplicate {
                    kind: "card name",
                    name: card.name,
                });
            }
            if !catalog.card_types.contains_key(&card.card_type) {
                return Err(CatalogError::UnknownCardType {
                    card: card.name,
                    card_type: card.card_type,
                });
            }
            catalog.card_names.insert(card.name.clone(), card.id);
            catalog.cards.insert(card.id, card);
        }

        for definition in catalog.definitions.values() {
            validate_definition(&catalog, definition)?;
        }
        for card_type in catalog.card_types.values() {
            for effect in &card_type.effects {
                validate_effect(&catalog, &card_type.name, effect)?;
            }
        }
        for card in catalog.cards.values() {
            for effect in &card.effects {
                validate_effect(&catalog, &card.name, effect)?;
            }
        }
        for scheduled in catalog
            .game_start_actions
            .iter()
            .chain(&catalog.turn_start_actions)
            .chain(&catalog.turn_end_actions)
        {
            for zone in scheduled.action.zones() {
                require_zone(&catalog, "scheduled action", zone)?;
            }
        }

        Ok(catalog)
    }
}

fn require_zone(catalog: &Catalog, owner: &str, zone: &str) -> Result<(), CatalogError> {
    if catalog.zone(zone).is_none() {
        return Err(CatalogError::UnknownZone {
            owner: owner.to_string(),
            zone: zone.to_string(),
        });
    }
    Ok(())
}

fn require_card(catalog: &Catalog, owner: &str, card: &str) -> Result<(), CatalogError> {
    if catalog.card_by_name(card).is_none() {
        return Err(CatalogError::UnknownCard {
            owner: owner.to_string(),
            card: card.to_string(),
        });
    }
    Ok(())
}

fn validate_definition(catalog: &Catalog, definition: &RuleDefinition) -> Result<(), CatalogError> {
    match &definition.kind {
        RuleKind::TargetsPlayer {
            action: PlayerAction::MoveCards { from, to },
        } => {
            require_zone(catalog, &definition.name, from)?;
            require_zone(catalog, &definition.name, to)
        }
        RuleKind::TargetsCard {
            action: CardAction::Transform { into },
            target_card_type,
        } => {
            require_card(catalog, &definition.name, into)?;
            validate_target_card_type(catalog, definition, target_card_type.as_deref())
        }
        RuleKind::TargetsCard {
            target_card_type, ..
        } => validate_target_card_type(catalog, definition, target_card_type.as_deref()),
        RuleKind::General {
            action: GeneralAction::CreateToken { card },
        } => require_card(catalog, &definition.name, card),
        RuleKind::Permanent | RuleKind::TargetsPlayer { .. } => Ok(()),
    }
}

fn validate_target_card_type(
    catalog: &Catalog,
    definition: &RuleDefinition,
    target_card_type: Option<&str>,
) -> Result<(), CatalogError> {
    match target_card_type {
        Some(card_type) if catalog.card_type(card_type).is_none() => {
            Err(CatalogError::UnknownCardType {
                card: definition.name.clone(),
                card_type: card_type.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn validate_effect(
    catalog: &Catalog,
    owner: &str,
    effect: &EffectInstance,
) -> Result<(), CatalogError> {
    let definition =
        catalog
            .definition(&effect.definition)
            .ok_or_else(|| CatalogError::UnknownDefinition {
                owner: owner.to_string(),
                definition: effect.definition.clone(),
            })?;

    let target_subject = match (definition.category(), effect.target) {
        (RuleCategory::Permanent | RuleCategory::General, EffectTarget::None) => None,
        (RuleCategory::TargetsPlayer, EffectTarget::Player(_)) => Some(ConditionSubject::Player),
        (RuleCategory::TargetsCard, EffectTarget::Card(_)) => Some(ConditionSubject::Card),
        _ => {
            return Err(CatalogError::IllegalTarget {
                owner: owner.to_string(),
                definition: definition.name.clone(),
            });
        }
    };

    let illegal_condition = || CatalogError::IllegalCondition {
        owner: owner.to_string(),
        definition: definition.name.clone(),
    };

    let trigger_subject = effect.trigger.condition_subject();
    if effect
        .trigger_conditions
        .iter()
        .any(|condition| condition.subject() != trigger_subject)
    {
        return Err(illegal_condition());
    }
    match target_subject {
        Some(subject) => {
            if effect
                .target_conditions
                .iter()
                .any(|condition| condition.subject() != subject)
            {
                return Err(illegal_condition());
            }
        }
        None if !effect.target_conditions.is_empty() => return Err(illegal_condition()),
        None => {}
    }

    match effect.magnitude {
        None if definition.needs_magnitude() => {
            return Err(CatalogError::MissingMagnitude {
                owner: owner.to_string(),
                definition: definition.name.clone(),
            });
        }
        Some(Magnitude::Random { min, max }) if min > max => {
            return Err(CatalogError::InvalidMagnitude {
                owner: owner.to_string(),
                min,
                max,
            });
        }
        _ => {}
    }

    if let Trigger::TurnCount {
        mode: TurnCountMode::Every,
        n: 0,
    } = effect.trigger
    {
        return Err(CatalogError::InvalidTurnCount {
            owner: owner.to_string(),
        });
    }

    Ok(())
}
