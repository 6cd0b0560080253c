//! Entry hazards

use sleuth_inference::Reason;
use sleuth_parser::{BoxedParser, InferenceParser, Inferred, ParserName, Step, Unordered};
use sleuth_protocol::{Event, EventTag, PokemonIdent, to_id};

use super::{lacks, names};
use crate::BattleContext;
use crate::tracking::TrackedBattle;
use crate::types::{PokemonState, SideCondition};

const BOOTS: &str = "heavydutyboots";
const MAGIC_GUARD: &str = "magicguard";

fn is_rock_damage(event: &Event, target: &PokemonIdent) -> bool {
    event.tag == EventTag::Damage
        && names(event, 0, target)
        && event.keyword("from") == Some("Stealth Rock")
}

/// Whether a revealed item or ability already rules the damage out
fn revealed_blocker(poke: &PokemonState) -> bool {
    let item = poke.known_item.as_deref().filter(|_| !poke.item_consumed).map(to_id);
    let ability = poke.known_ability.as_deref().map(to_id);
    item.as_deref() == Some(BOOTS) || ability.as_deref() == Some(MAGIC_GUARD)
}

/// Stealth Rock damage to a pokemon entering the field.
///
/// Heavy-Duty Boots and Magic Guard prevent it. While either is still
/// possible for `target`, seeing the damage rules both out and not seeing it
/// means one of them is there. Otherwise the damage is mandatory.
pub fn stealth_rock<'p>(
    ctx: &BattleContext<'_>,
    target: &PokemonIdent,
) -> Option<BoxedParser<'p, TrackedBattle, ()>> {
    let side = ctx.state.get_side(target.player)?;
    if !side.has_condition(SideCondition::StealthRock) {
        return None;
    }
    let poke = ctx.state.pokemon(target)?;
    if revealed_blocker(poke) {
        return None;
    }

    let item = poke.item.filter(|_| !poke.item_consumed);
    let mut blockers: Vec<Reason> = [
        lacks(&ctx.beliefs, item, BOOTS),
        lacks(&ctx.beliefs, poke.ability, MAGIC_GUARD),
    ]
    .into_iter()
    .flatten()
    .collect();

    let name = ParserName::lazy({
        let target = target.clone();
        move || format!("stealth rock on {target}")
    });
    let target = target.clone();

    if blockers.is_empty() {
        let parser = Unordered::event(
            name,
            &[EventTag::Damage],
            move |event| is_rock_damage(event, &target),
            |_| (),
        );
        return Some(parser.expected().boxed());
    }

    let governing = match blockers.len() {
        1 => blockers.remove(0),
        _ => Reason::and(blockers),
    };
    let parser = InferenceParser::new(
        name,
        governing,
        move |ctx: &mut BattleContext<'_>, governing: &Reason| match ctx.try_peek() {
            Some(event) if is_rock_damage(event, &target) => {
                ctx.dispatch()?;
                Ok(Step::Accepted(Inferred::new(governing.clone(), ())))
            }
            _ => Ok(Step::Declined),
        },
    );
    Some(parser.boxed())
}

/// Every hazard parser for `target` entering its own side
pub fn on_entry<'p>(
    ctx: &BattleContext<'_>,
    target: &PokemonIdent,
) -> Vec<BoxedParser<'p, TrackedBattle, ()>> {
    stealth_rock(ctx, target).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use sleuth_parser::{ParserContext, ParserError, all};
    use sleuth_protocol::Player;

    use super::*;
    use crate::Dex;

    const DEX: &str = r#"{
        "species": {
            "gyarados": { "abilities": ["intimidate", "moxie"] },
            "clefable": { "abilities": ["magicguard", "unaware"] }
        },
        "items": ["leftovers", "heavydutyboots"]
    }"#;

    fn switch(species: &str) -> Event {
        Event::new(EventTag::Switch)
            .arg(format!("p2a: {species}"))
            .arg(species)
            .arg("100/100")
    }

    fn rock(species: &str) -> Event {
        Event::new(EventTag::Damage)
            .arg(format!("p2a: {species}"))
            .arg("88/100")
            .kwarg("from", "Stealth Rock")
    }

    /// Context positioned just after `species` switched in on a side with
    /// Stealth Rock
    fn context(events: &[Event], rocks: bool) -> ParserContext<'_, TrackedBattle> {
        let mut battle = TrackedBattle::new(Dex::from_json(DEX).unwrap());
        battle.set_perspective(Player::P1);
        if rocks {
            battle
                .get_or_create_side(Player::P2, "Bob")
                .add_condition(SideCondition::StealthRock);
        }
        let mut ctx = ParserContext::new(events, battle);
        ctx.dispatch().unwrap();
        ctx
    }

    fn run(ctx: &mut BattleContext<'_>, target: &PokemonIdent) -> Result<Vec<()>, ParserError> {
        let parsers = on_entry(ctx, target);
        all(ctx, parsers, None)
    }

    #[test]
    fn test_damage_rules_out_boots() {
        let events = vec![switch("Gyarados"), rock("Gyarados")];
        let mut ctx = context(&events, true);
        let target = PokemonIdent::new(Player::P2, "Gyarados");

        run(&mut ctx, &target).unwrap();

        let poke = ctx.state.pokemon(&target).unwrap();
        assert_eq!(poke.hp_current, 88);
        assert_eq!(ctx.beliefs.known(poke.item.unwrap()), Some("leftovers"));
    }

    #[test]
    fn test_missing_damage_means_boots() {
        let events = vec![switch("Gyarados"), Event::new(EventTag::Turn).arg("2")];
        let mut ctx = context(&events, true);
        let target = PokemonIdent::new(Player::P2, "Gyarados");

        run(&mut ctx, &target).unwrap();

        let poke = ctx.state.pokemon(&target).unwrap();
        assert_eq!(ctx.beliefs.known(poke.item.unwrap()), Some("heavydutyboots"));
        assert_eq!(ctx.position(), 1);
    }

    #[test]
    fn test_two_possible_blockers_are_deferred() {
        let events = vec![switch("Clefable")];
        let mut ctx = context(&events, true);
        let target = PokemonIdent::new(Player::P2, "Clefable");

        run(&mut ctx, &target).unwrap();
        assert_eq!(ctx.beliefs.deferred().len(), 1);

        let (item, ability) = {
            let poke = ctx.state.pokemon(&target).unwrap();
            (poke.item.unwrap(), poke.ability.unwrap())
        };
        ctx.beliefs.narrow(item, ["leftovers"]).unwrap();

        assert_eq!(ctx.beliefs.known(ability), Some("magicguard"));
    }

    #[test]
    fn test_no_rocks_no_parser() {
        let events = vec![switch("Gyarados")];
        let ctx = context(&events, false);
        let target = PokemonIdent::new(Player::P2, "Gyarados");

        assert!(stealth_rock(&ctx, &target).is_none());
    }

    #[test]
    fn test_revealed_boots_no_parser() {
        let events = vec![switch("Gyarados")];
        let mut ctx = context(&events, true);
        let target = PokemonIdent::new(Player::P2, "Gyarados");
        ctx.state
            .pokemon_mut(&target)
            .unwrap()
            .record_item("Heavy-Duty Boots");

        assert!(stealth_rock(&ctx, &target).is_none());
    }

    #[test]
    fn test_known_pokemon_must_take_damage() {
        let events = vec![
            Event::new(EventTag::Switch)
                .arg("p1a: Pikachu")
                .arg("Pikachu")
                .arg("100/100"),
            Event::new(EventTag::Turn).arg("2"),
        ];
        let mut battle = TrackedBattle::new(Dex::from_json(DEX).unwrap());
        battle.set_perspective(Player::P1);
        battle
            .get_or_create_side(Player::P1, "Alice")
            .add_condition(SideCondition::StealthRock);
        let mut ctx = ParserContext::new(&events, battle);
        ctx.dispatch().unwrap();
        let target = PokemonIdent::new(Player::P1, "Pikachu");

        assert!(matches!(
            run(&mut ctx, &target),
            Err(ParserError::ExpectedEffect { .. })
        ));
    }
}
