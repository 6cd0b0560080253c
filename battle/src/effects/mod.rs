//! Parsers for individual battle effects
//!
//! Each constructor looks at the tracked state when the decision point
//! starts and returns the parser for an effect that may follow, or nothing
//! when the effect cannot happen. Effects that depend on a concealed ability
//! or item become inference parsers over that pokemon's possibility sets.

pub mod abilities;
pub mod hazards;
pub mod residual;

use sleuth_inference::{PossibilityArena, Reason, SetId};
use sleuth_protocol::{Event, PokemonIdent};

/// Whether argument `index` of `event` names `ident` (position ignored)
pub(crate) fn names(event: &Event, index: usize, ident: &PokemonIdent) -> bool {
    event
        .ident(index)
        .is_ok_and(|found| found.player == ident.player && found.name == ident.name)
}

/// "The concealed value of `set` is not `blocker`". `None` when the set
/// never allowed `blocker` to begin with.
pub(crate) fn lacks(beliefs: &PossibilityArena, set: Option<SetId>, blocker: &str) -> Option<Reason> {
    let id = set?;
    let possible = beliefs.get(id).ok()?;
    if !possible.iter().any(|value| value == blocker) {
        return None;
    }
    let others: Vec<String> = possible
        .iter()
        .filter(|value| *value != blocker)
        .cloned()
        .collect();
    Some(Reason::fact(id, others))
}

/// "The concealed value of `set` is `value`". `None` when that was already
/// ruled out.
pub(crate) fn has(beliefs: &PossibilityArena, set: Option<SetId>, value: &str) -> Option<Reason> {
    let id = set?;
    let possible = beliefs.get(id).ok()?;
    possible
        .iter()
        .any(|candidate| candidate == value)
        .then(|| Reason::fact(id, [value]))
}
