use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::ids::{CardId, ConnectionId, LiveCardId, NetHandle, PlayerId};
use crate::zone::Zone;

/// The last card a player played this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPlayed {
    pub card: CardId,
    /// Live instance, while it is still spawned.
    pub live: Option<LiveCardId>,
}

/// Server-owned state of one player. Clients never mutate it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub net_handle: NetHandle,
    pub connection: ConnectionId,
    pub is_connected: bool,
    pub name: String,
    pub attributes: HashMap<String, i32>,
    pub zones: Vec<Zone>,
    pub last_card_played: Option<LastPlayed>,
}

impl PlayerState {
    /// Create a player with the catalog's attribute schema and zone layout.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        connection: ConnectionId,
        catalog: &Catalog,
    ) -> Self {
        let attributes = catalog
            .player_attributes()
            .iter()
            .map(|attribute| (attribute.name.clone(), attribute.base_value))
            .collect();
        let zones = catalog.zones().iter().map(Zone::from_definition).collect();
        Self {
            id,
            net_handle: NetHandle(u32::from(id.0)),
            connection,
            is_connected: true,
            name: name.into(),
            attributes,
            zones,
            last_card_played: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<i32> {
        self.attributes.get(name).copied()
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.name == name)
    }

    pub fn zone_mut(&mut self, name: &str) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|zone| zone.name == name)
    }

    /// Name of the zone holding a live card.
    pub fn zone_of_live(&self, card: LiveCardId) -> Option<&str> {
        self.zones
            .iter()
            .find(|zone| zone.contains_live(card))
            .map(|zone| zone.name.as_str())
    }

    /// Number of cards in the named zone (0 if it does not exist).
    pub fn zone_len(&self, name: &str) -> usize {
        self.zone(name).map_or(0, Zone::len)
    }

    /// Live cards across all dynamic zones, in zone-list order.
    pub fn live_cards(&self) -> impl Iterator<Item = LiveCardId> + '_ {
        self.zones
            .iter()
            .flat_map(|zone| zone.live_cards().iter().copied())
    }

    /// Check whether the player can pay every cost.
    pub fn can_pay(&self, costs: &[crate::catalog::ResourceCost]) -> bool {
        costs.iter().all(|cost| {
            self.attribute(&cost.attribute)
                .is_some_and(|available| available >= cost.amount)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CardInstance, CardTypeTemplate, ZoneDefinition};

    fn catalog() -> Catalog {
        Catalog::builder()
            .player_attribute("Life", 20)
            .player_attribute("Mana", 0)
            .zone(ZoneDefinition::static_zone("Deck", true))
            .zone(ZoneDefinition::dynamic_zone("Board"))
            .card_type(CardTypeTemplate::new("Creature"))
            .card(CardInstance::new(1, "Squire", "Creature"))
            .build()
            .expect("catalog")
    }

    #[test]
    fn test_new_player_uses_schema() {
        let player = PlayerState::new(PlayerId(0), "Alice", ConnectionId(10), &catalog());
        assert_eq!(player.attribute("Life"), Some(20));
        assert_eq!(player.attribute("Mana"), Some(0));
        assert_eq!(player.attribute("Gold"), None);
        assert_eq!(player.zones.len(), 2);
        assert!(player.is_connected);
    }

    #[test]
    fn test_can_pay_requires_every_cost() {
        let mut player = PlayerState::new(PlayerId(0), "Alice", ConnectionId(10), &catalog());
        player.attributes.insert("Mana".into(), 3);
        let card = CardInstance::new(2, "Knight", "Creature")
            .cost("Mana", 3)
            .cost("Life", 1);
        assert!(player.can_pay(&card.costs));
        let too_expensive = CardInstance::new(3, "Giant", "Creature").cost("Mana", 4);
        assert!(!player.can_pay(&too_expensive.costs));
        let unknown = CardInstance::new(4, "Oddity", "Creature").cost("Gold", 1);
        assert!(!player.can_pay(&unknown.costs));
    }
}
