//! Abilities that announce themselves when their holder enters

use sleuth_inference::Reason;
use sleuth_parser::{
    AcceptLatch, BoxedParser, InferenceParser, Inferred, ParserName, Step, Unordered,
};
use sleuth_protocol::{EffectKind, Event, EventTag, PokemonIdent, to_id};

use super::{has, names};
use crate::BattleContext;
use crate::tracking::TrackedBattle;

/// Whether `event` says it came from `source`'s Intimidate
fn carries_intimidate(event: &Event, source: &PokemonIdent) -> bool {
    let from_intimidate = event.from_effect().is_some_and(|effect| {
        effect.kind == EffectKind::Ability && effect.id() == "intimidate"
    });
    from_intimidate
        && event
            .of_ident()
            .is_some_and(|of| of.player == source.player && of.name == source.name)
}

/// Intimidate activating as `source` enters.
///
/// Usually shows up as `-ability|<source>|Intimidate|boost` followed by the
/// opposing pokemon's `-unboost` (or a `-fail`/`-immune`). The reaction can
/// also carry the activation alone, as `[from] ability: Intimidate|[of]
/// <source>`. The announcement and the reaction share one latch so the
/// activation commits once whichever shows first. Only built while
/// Intimidate is still a candidate for a concealed ability; its absence then
/// rules Intimidate out.
pub fn intimidate<'p>(
    ctx: &BattleContext<'_>,
    source: &PokemonIdent,
) -> Vec<BoxedParser<'p, TrackedBattle, ()>> {
    let Some(poke) = ctx.state.pokemon(source) else {
        return Vec::new();
    };
    let Some(governing) = has(&ctx.beliefs, poke.ability, "intimidate") else {
        return Vec::new();
    };
    let activation = AcceptLatch::new();

    let announce = {
        let name = ParserName::lazy({
            let source = source.clone();
            move || format!("{source} intimidate")
        });
        let source = source.clone();
        let activation = activation.clone();
        InferenceParser::new(
            name,
            governing,
            move |ctx: &mut BattleContext<'_>, governing: &Reason| {
                // The reaction already carried the activation
                if activation.is_accepted() {
                    return Ok(Step::Accepted(Inferred::new(governing.clone(), ())));
                }
                let Some(event) = ctx.try_verify(&[EventTag::Ability]) else {
                    return Ok(Step::Declined);
                };
                let ability = event.get(1).map(to_id);
                if !names(event, 0, &source) || ability.as_deref() != Some("intimidate") {
                    return Ok(Step::Declined);
                }
                if !activation.try_accept() {
                    return Ok(Step::Declined);
                }
                ctx.dispatch()?;
                Ok(Step::Accepted(Inferred::new(governing.clone(), ())))
            },
        )
    };

    let reaction = {
        let name = ParserName::lazy({
            let source = source.clone();
            move || format!("{source} intimidate reaction")
        });
        let source = source.clone();
        let opposing = source.player.opponent();
        Unordered::new(name, move |ctx: &mut BattleContext<'_>| {
            let Some(event) =
                ctx.try_verify(&[EventTag::Unboost, EventTag::Fail, EventTag::Immune])
            else {
                return Ok(Step::Declined);
            };
            if !event.ident(0).is_ok_and(|target| target.player == opposing) {
                return Ok(Step::Declined);
            }
            let carried = carries_intimidate(event, &source);
            if !activation.is_accepted() && !(carried && activation.try_accept()) {
                return Ok(Step::Declined);
            }
            ctx.dispatch()?;
            Ok(Step::Accepted(()))
        })
    };

    vec![announce.boxed(), reaction.boxed()]
}

/// Every on-entry ability parser for `source`
pub fn on_start<'p>(
    ctx: &BattleContext<'_>,
    source: &PokemonIdent,
) -> Vec<BoxedParser<'p, TrackedBattle, ()>> {
    intimidate(ctx, source)
}
