//! End-of-turn effects

use sleuth_inference::Reason;
use sleuth_parser::{BoxedParser, InferenceParser, Inferred, ParserName, Step, Unordered};
use sleuth_protocol::{EffectKind, Event, EventTag, PokemonIdent, to_id};

use super::{has, names};
use crate::BattleContext;
use crate::tracking::TrackedBattle;

fn is_leftovers_heal(event: &Event, holder: &PokemonIdent) -> bool {
    event.tag == EventTag::Heal
        && names(event, 0, holder)
        && event
            .from_effect()
            .is_some_and(|effect| effect.kind == EffectKind::Item && effect.id() == "leftovers")
}

/// Leftovers healing `holder`.
///
/// Seeing the heal proves the item. Residual effects run as an optional
/// group, so not seeing it says nothing (the holder may be at full HP).
pub fn leftovers<'p>(
    ctx: &BattleContext<'_>,
    holder: &PokemonIdent,
) -> Option<BoxedParser<'p, TrackedBattle, ()>> {
    let poke = ctx.state.pokemon(holder)?;
    if poke.item_consumed {
        return None;
    }

    let name = ParserName::lazy({
        let holder = holder.clone();
        move || format!("{holder} leftovers")
    });
    let holder = holder.clone();

    if poke.item.is_none() {
        // Our own side: the item is not a possibility set
        let parser = Unordered::event(
            name,
            &[EventTag::Heal],
            move |event| is_leftovers_heal(event, &holder),
            |_| (),
        );
        return Some(parser.boxed());
    }

    let governing = has(&ctx.beliefs, poke.item, "leftovers")?;
    let parser = InferenceParser::new(
        name,
        governing,
        move |ctx: &mut BattleContext<'_>, governing: &Reason| match ctx.try_peek() {
            Some(event) if is_leftovers_heal(event, &holder) => {
                ctx.dispatch()?;
                Ok(Step::Accepted(Inferred::new(governing.clone(), ())))
            }
            _ => Ok(Step::Declined),
        },
    );
    Some(parser.boxed())
}

/// Burn or poison damage to `holder`, when it carries such a status
pub fn status_damage<'p>(
    ctx: &BattleContext<'_>,
    holder: &PokemonIdent,
) -> Option<BoxedParser<'p, TrackedBattle, ()>> {
    let poke = ctx.state.pokemon(holder)?;
    let source = poke.status?.residual_source()?;

    let name = ParserName::lazy({
        let holder = holder.clone();
        move || format!("{holder} {source} damage")
    });
    let holder = holder.clone();
    let parser = Unordered::event(
        name,
        &[EventTag::Damage],
        move |event| {
            names(event, 0, &holder) && event.keyword("from").map(to_id).as_deref() == Some(source)
        },
        |_| (),
    );
    Some(parser.boxed())
}

/// Every residual parser for `holder`
pub fn on_residual<'p>(
    ctx: &BattleContext<'_>,
    holder: &PokemonIdent,
) -> Vec<BoxedParser<'p, TrackedBattle, ()>> {
    [leftovers(ctx, holder), status_damage(ctx, holder)]
        .into_iter()
        .flatten()
        .collect()
}
