//! Trigger and target evaluation.
//!
//! Pure functions over borrowed state: whether an effect's trigger conditions
//! hold for its source card, and whether a candidate target satisfies the
//! effect's target conditions.

use crate::catalog::{Catalog, EffectInstance};
use crate::game_state::GameState;
use crate::ids::{LiveCardId, PlayerId};
use crate::live_card::LiveCard;
use crate::player::PlayerState;

use super::PlayerSource;
use super::condition::{CardSubject, all_hold_for_card, all_hold_for_player};
use super::Trigger;

/// Read-only view handed to the evaluators.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub game: &'a GameState,
    pub catalog: &'a Catalog,
}

impl<'a> TriggerContext<'a> {
    pub fn new(game: &'a GameState, catalog: &'a Catalog) -> Self {
        Self { game, catalog }
    }

    /// Connected players a player-side trigger fans its conditions out over.
    fn candidates(&self, source: PlayerSource, owner: PlayerId) -> impl Iterator<Item = &'a PlayerState> {
        self.game.connected_players().filter(move |player| match source {
            PlayerSource::Owner => player.id == owner,
            PlayerSource::AnyOpponent => player.id != owner,
            PlayerSource::AnyPlayer => true,
        })
    }
}

/// Check whether an effect's trigger conditions hold for its source card.
///
/// Player-side triggers pass if at least one candidate player satisfies every
/// condition; for `PlayerPlayedCard` the conditions look at the last card the
/// candidate played, and a candidate that played nothing fails. Card-side
/// triggers evaluate every condition against the source card itself.
pub fn is_valid_trigger(effect: &EffectInstance, source: LiveCardId, ctx: &TriggerContext) -> bool {
    let Some(card) = ctx.game.live_card(source) else {
        return false;
    };
    let conditions = &effect.trigger_conditions;

    match (&effect.trigger, effect.trigger.player_source()) {
        (Trigger::PlayerPlayedCard { .. }, Some(source_filter)) => ctx
            .candidates(source_filter, card.owner)
            .any(|candidate| {
                ctx.game
                    .last_played_subject(ctx.catalog, candidate.id)
                    .is_some_and(|subject| all_hold_for_card(conditions, &subject, ctx.catalog))
            }),
        (_, Some(source_filter)) => ctx
            .candidates(source_filter, card.owner)
            .any(|candidate| all_hold_for_player(conditions, candidate)),
        (_, None) => ctx
            .game
            .card_subject(ctx.catalog, source)
            .is_some_and(|subject| all_hold_for_card(conditions, &subject, ctx.catalog)),
    }
}

/// Re-run an effect's target conditions against a player.
pub fn is_valid_player_target(effect: &EffectInstance, target: &PlayerState) -> bool {
    all_hold_for_player(&effect.target_conditions, target)
}

/// Re-run an effect's target conditions against a card.
pub fn is_valid_card_target(
    effect: &EffectInstance,
    target: &CardSubject<'_>,
    catalog: &Catalog,
) -> bool {
    all_hold_for_card(&effect.target_conditions, target, catalog)
}

/// Whether a live card can be affected by the effect at all.
///
/// Dead cards never can. Unless the effect is unavoidable, a card carrying the
/// configured untargetable permanent effect is also out of reach.
pub fn can_be_target_of_effect(
    effect: &EffectInstance,
    target: &LiveCard,
    subject: &CardSubject<'_>,
    catalog: &Catalog,
    untargetable_effect: Option<&str>,
) -> bool {
    if !target.alive {
        return false;
    }
    match untargetable_effect {
        Some(name) if !effect.unavoidable => !subject.has_permanent_effect(name, catalog),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        CardAction, CardInstance, CardTarget, CardTypeTemplate, RuleDefinition, ZoneDefinition,
    };
    use crate::game_state::MatchStatus;
    use crate::ids::{CardId, ConnectionId};
    use crate::player::LastPlayed;
    use crate::triggers::{ComparisonOp, Condition, TurnPhase};

    fn catalog() -> Catalog {
        Catalog::builder()
            .player_attribute("Life", 20)
            .zone(ZoneDefinition::dynamic_zone("Board"))
            .definition(RuleDefinition::card(
                "Buff",
                CardAction::AddCounter {
                    attribute: "Attack".into(),
                },
            ))
            .definition(RuleDefinition::permanent("Ward"))
            .card_type(CardTypeTemplate::new("Creature").attribute("Attack", 1))
            .card(CardInstance::new(1, "Squire", "Creature").subtype("Human"))
            .card(
                CardInstance::new(2, "Warden", "Creature").effect(EffectInstance::new(
                    "Ward",
                    Trigger::CardAttacked,
                )),
            )
            .build()
            .expect("catalog")
    }

    fn game(catalog: &Catalog) -> GameState {
        let mut game = GameState::new();
        for (index, name) in ["Alice", "Bob"].into_iter().enumerate() {
            game.players.push(PlayerState::new(
                PlayerId(index as u8),
                name,
                ConnectionId(index as u64),
                catalog,
            ));
        }
        game.turn.status = MatchStatus::Running;
        let (card, card_type) = catalog.card_with_type(CardId(1)).expect("squire");
        game.insert_live_card(LiveCard::spawn(LiveCardId(1), card, card_type, PlayerId(0)));
        if let Some(board) = game.players[0].zone_mut("Board") {
            board.push_live(LiveCardId(1));
        }
        game
    }

    fn life_below(value: i32) -> Condition {
        Condition::PlayerAttributeCompare {
            op: ComparisonOp::LessThan,
            attribute: "Life".into(),
            value,
        }
    }

    fn lifecycle_effect(source: PlayerSource) -> EffectInstance {
        EffectInstance::new(
            "Buff",
            Trigger::PlayerLifecycle {
                phase: TurnPhase::TurnStart,
                source,
            },
        )
        .targeting_card(CardTarget::ThisCard)
        .with_value(1)
    }

    #[test]
    fn test_any_player_fires_if_one_candidate_passes() {
        let catalog = catalog();
        let mut game = game(&catalog);
        game.players[1].attributes.insert("Life".into(), 5);
        let ctx = TriggerContext::new(&game, &catalog);

        let effect = lifecycle_effect(PlayerSource::AnyPlayer).with_trigger_condition(life_below(10));
        assert!(is_valid_trigger(&effect, LiveCardId(1), &ctx));

        let owner_only = lifecycle_effect(PlayerSource::Owner).with_trigger_condition(life_below(10));
        assert!(!is_valid_trigger(&owner_only, LiveCardId(1), &ctx));
    }

    #[test]
    fn test_disconnected_players_are_not_candidates() {
        let catalog = catalog();
        let mut game = game(&catalog);
        game.players[1].attributes.insert("Life".into(), 5);
        game.players[1].is_connected = false;
        let ctx = TriggerContext::new(&game, &catalog);
        let effect = lifecycle_effect(PlayerSource::AnyOpponent).with_trigger_condition(life_below(10));
        assert!(!is_valid_trigger(&effect, LiveCardId(1), &ctx));
    }

    #[test]
    fn test_one_failing_condition_blocks_candidate() {
        let catalog = catalog();
        let mut game = game(&catalog);
        game.players[1].attributes.insert("Life".into(), 5);
        let ctx = TriggerContext::new(&game, &catalog);
        let effect = lifecycle_effect(PlayerSource::AnyOpponent)
            .with_trigger_condition(life_below(10))
            .with_trigger_condition(life_below(3));
        assert!(!is_valid_trigger(&effect, LiveCardId(1), &ctx));
    }

    #[test]
    fn test_played_card_conditions_use_last_played() {
        let catalog = catalog();
        let mut game = game(&catalog);
        let effect = EffectInstance::new(
            "Buff",
            Trigger::PlayerPlayedCard {
                card_type: "Creature".into(),
                source: PlayerSource::Owner,
            },
        )
        .targeting_card(CardTarget::ThisCard)
        .with_value(1)
        .with_trigger_condition(Condition::CardHasSubtype {
            named: "Human".into(),
            negate: false,
        });

        assert!(!is_valid_trigger(
            &effect,
            LiveCardId(1),
            &TriggerContext::new(&game, &catalog)
        ));

        game.players[0].last_card_played = Some(LastPlayed {
            card: CardId(1),
            live: None,
        });
        assert!(is_valid_trigger(
            &effect,
            LiveCardId(1),
            &TriggerContext::new(&game, &catalog)
        ));
    }

    #[test]
    fn test_missing_card_attribute_fails_closed() {
        let catalog = catalog();
        let game = game(&catalog);
        let subject = game.card_subject(&catalog, LiveCardId(1)).expect("subject");
        let effect = EffectInstance::new("Buff", Trigger::CardAttacked)
            .targeting_card(CardTarget::TargetCard)
            .with_value(1)
            .with_target_condition(Condition::CardAttributeCompare {
                op: ComparisonOp::GreaterThanOrEqual,
                attribute: "Defense".into(),
                value: 0,
            });
        assert!(!is_valid_card_target(&effect, &subject, &catalog));
    }

    #[test]
    fn test_untargetable_respects_unavoidable() {
        let catalog = catalog();
        let mut game = game(&catalog);
        let (card, card_type) = catalog.card_with_type(CardId(2)).expect("warden");
        game.insert_live_card(LiveCard::spawn(LiveCardId(2), card, card_type, PlayerId(1)));
        let live = game.live_card(LiveCardId(2)).expect("live");
        let subject = game.card_subject(&catalog, LiveCardId(2)).expect("subject");

        let avoidable = EffectInstance::new("Buff", Trigger::CardAttacked)
            .targeting_card(CardTarget::TargetCard)
            .with_value(1);
        let unavoidable = avoidable.clone().unavoidable();
        assert!(!can_be_target_of_effect(&avoidable, live, &subject, &catalog, Some("Ward")));
        assert!(can_be_target_of_effect(&unavoidable, live, &subject, &catalog, Some("Ward")));
        assert!(can_be_target_of_effect(&avoidable, live, &subject, &catalog, None));
    }
}
