//! Decision points recognized in the event stream
//!
//! [`step`] is handed to [`Driver::run`](sleuth_parser::Driver::run): it
//! looks at the current event and, when it opens a decision point, runs the
//! parsers for every effect that may follow. Events no decision point claims
//! get their baseline handling from the driver.

use sleuth_parser::{ParserError, Stage, some, staged};
use sleuth_protocol::{EffectKind, Event, EventTag, PokemonIdent};

use crate::BattleContext;
use crate::effects::{abilities, hazards, names, residual};
use crate::types::Status;

/// A pokemon entering the field.
///
/// Hazards resolve first. If they knock the pokemon out nothing else
/// happens for it; otherwise its on-start abilities follow. A second switch
/// arriving before those abilities have shown (both leads entering at the
/// start of the battle) is handled as its own switch-in first.
pub fn switch_in(ctx: &mut BattleContext<'_>) -> Result<(), ParserError> {
    let Some(event) = ctx.try_verify(&[EventTag::Switch, EventTag::Drag]) else {
        return Ok(());
    };
    let target = event.ident(0)?;
    ctx.dispatch()?;
    tracing::debug!(pokemon = %target, "switch-in decision point");

    let hazard_target = target.clone();
    let faint_target = target.clone();
    let stages = vec![
        Stage::all().entry_with_after(
            "hazards",
            move |ctx| hazards::on_entry(ctx, &hazard_target),
            move |ctx| fainted_on_entry(ctx, &faint_target),
        ),
        Stage::all()
            .entry("on-start abilities", move |ctx| {
                abilities::on_start(ctx, &target)
            })
            .filter(|ctx| {
                if ctx.try_verify(&[EventTag::Switch, EventTag::Drag]).is_some() {
                    switch_in(ctx)?;
                }
                Ok(())
            }),
    ];
    staged(ctx, stages)
}

/// Consume the faint of `target` if it comes next, and report whether the
/// pokemon is out
fn fainted_on_entry(ctx: &mut BattleContext<'_>, target: &PokemonIdent) -> Result<bool, ParserError> {
    if let Some(event) = ctx.try_verify(&[EventTag::Faint])
        && names(event, 0, target)
    {
        ctx.dispatch()?;
        return Ok(true);
    }
    Ok(ctx
        .state
        .pokemon(target)
        .is_none_or(|poke| !poke.is_alive()))
}

/// End-of-turn effects on the active pokemon. Any subset may show.
pub fn residual(ctx: &mut BattleContext<'_>) -> Result<(), ParserError> {
    let view: &BattleContext<'_> = ctx;
    let parsers: Vec<_> = view
        .state
        .active_idents()
        .iter()
        .flat_map(|ident| residual::on_residual(view, ident))
        .collect();
    some(ctx, parsers, None)?;
    Ok(())
}

/// Heal or damage coming from an end-of-turn source
fn is_residual(event: &Event) -> bool {
    if !matches!(event.tag, EventTag::Heal | EventTag::Damage) {
        return false;
    }
    let Some(effect) = event.from_effect() else {
        return false;
    };
    match effect.kind {
        EffectKind::Item => effect.id() == "leftovers",
        EffectKind::Other => {
            Status::from_protocol(&effect.name).is_some_and(|status| status.deals_residual_damage())
        }
        EffectKind::Ability | EffectKind::Move => false,
    }
}

/// Open whatever decision point starts at the current event
pub fn step(ctx: &mut BattleContext<'_>) -> Result<(), ParserError> {
    let Some(event) = ctx.try_peek() else {
        return Ok(());
    };
    match event.tag {
        EventTag::Switch | EventTag::Drag => switch_in(ctx),
        _ if is_residual(event) => residual(ctx),
        _ => Ok(()),
    }
}
