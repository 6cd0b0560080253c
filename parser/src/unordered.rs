//! Unordered matching of independent effects against one event stream
//!
//! A decision point hands the engine a set of candidate parsers. Each sweep
//! offers the current event to every pending parser in registration order;
//! the first one that consumes or accepts ends the sweep, so two parsers
//! never claim the same event. When a full sweep moves nothing the optional
//! filter gets the event, and if it does not take it either the group
//! resolves.
//!
//! A parser that consumed and answered `Pending` is committed: it is stepped
//! alone until it accepts, and giving up afterwards is fatal.

use crate::{BoxedParser, ParserContext, ParserError, Step};

/// Callback that handles events no pending parser claimed
pub type FilterFn<'f, S> = dyn FnMut(&mut ParserContext<'_, S>) -> Result<(), ParserError> + 'f;

/// Resolution rule for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Every parser should accept; leftovers are rejected
    All,
    /// Any subset may accept; leftovers are dropped
    Some,
}

struct Slot<'p, S, T> {
    index: usize,
    parser: BoxedParser<'p, S, T>,
    /// Events consumed so far; nonzero means the parser has committed
    consumed: usize,
}

enum Sweep {
    Accepted,
    Advanced,
    /// Some parser answered `Pending` without consuming
    Stalled,
    Idle,
}

/// Run parsers until every one accepted or nothing else can make progress.
///
/// Parsers still pending at that point are finalized through
/// [`UnorderedParser::reject`](crate::UnorderedParser::reject), which fails
/// for mandatory effects. Results come back in registration order; dropped
/// parsers contribute none.
pub fn all<S, T>(
    ctx: &mut ParserContext<'_, S>,
    parsers: Vec<BoxedParser<'_, S, T>>,
    filter: Option<&mut FilterFn<'_, S>>,
) -> Result<Vec<T>, ParserError> {
    run_group(ctx, parsers, filter, GroupMode::All)
}

/// Like [`all`], but for effects of unknown cardinality: whatever has not
/// accepted when progress stops is dropped without finalization.
pub fn some<S, T>(
    ctx: &mut ParserContext<'_, S>,
    parsers: Vec<BoxedParser<'_, S, T>>,
    filter: Option<&mut FilterFn<'_, S>>,
) -> Result<Vec<T>, ParserError> {
    run_group(ctx, parsers, filter, GroupMode::Some)
}

/// Pick the first parser that takes the current event.
///
/// A parser that consumes and answers `Pending` has committed the branch and
/// is stepped alone until it resolves; giving up after that is
/// [`DeclinedAfterConsuming`](ParserError::DeclinedAfterConsuming). If nobody
/// matches the result is empty and the cursor has not moved; losing parsers
/// are never finalized.
pub fn one_of<S, T>(
    ctx: &mut ParserContext<'_, S>,
    parsers: Vec<BoxedParser<'_, S, T>>,
) -> Result<Vec<T>, ParserError> {
    for mut parser in parsers {
        let before = ctx.position();
        let step = parser.step(ctx)?;
        let consumed = ctx.position() - before;
        match step {
            Step::Accepted(value) => {
                tracing::debug!(parser = %parser.name(), consumed, "branch selected");
                return Ok(vec![value]);
            }
            Step::Declined if consumed > 0 => {
                return Err(ParserError::DeclinedAfterConsuming {
                    name: parser.name(),
                    consumed,
                });
            }
            Step::Pending if consumed > 0 => return finish_branch(ctx, parser, consumed),
            Step::Pending | Step::Declined => {}
        }
    }
    Ok(Vec::new())
}

fn finish_branch<S, T>(
    ctx: &mut ParserContext<'_, S>,
    mut parser: BoxedParser<'_, S, T>,
    mut consumed: usize,
) -> Result<Vec<T>, ParserError> {
    let limit = ctx.config().deadlock_sweeps();
    let mut idle = 0;
    loop {
        let before = ctx.position();
        let step = parser.step(ctx)?;
        let advanced = ctx.position() - before;
        consumed += advanced;
        match step {
            Step::Accepted(value) => return Ok(vec![value]),
            Step::Declined => {
                return Err(ParserError::DeclinedAfterConsuming {
                    name: parser.name(),
                    consumed,
                });
            }
            Step::Pending if advanced > 0 => idle = 0,
            Step::Pending if ctx.is_exhausted() => {
                return Err(ParserError::DeclinedAfterConsuming {
                    name: parser.name(),
                    consumed,
                });
            }
            Step::Pending => {
                idle += 1;
                if idle >= limit {
                    return Err(ParserError::Deadlock {
                        sweeps: idle,
                        pending: vec![parser.name()],
                    });
                }
            }
        }
    }
}

pub(crate) fn run_group<S, T>(
    ctx: &mut ParserContext<'_, S>,
    parsers: Vec<BoxedParser<'_, S, T>>,
    mut filter: Option<&mut FilterFn<'_, S>>,
    mode: GroupMode,
) -> Result<Vec<T>, ParserError> {
    let mut pending: Vec<Slot<'_, S, T>> = parsers
        .into_iter()
        .enumerate()
        .map(|(index, parser)| Slot {
            index,
            parser,
            consumed: 0,
        })
        .collect();
    let mut results = Vec::with_capacity(pending.len());
    let limit = ctx.config().deadlock_sweeps();
    let mut idle_sweeps = 0;

    while !pending.is_empty() {
        // A parser that has started consuming owns the stream until it
        // resolves.
        let committed = pending.iter().position(|slot| slot.consumed > 0);
        let outcome = match committed {
            Some(i) => step_committed(ctx, &mut pending, i, &mut results)?,
            None => sweep(ctx, &mut pending, &mut results)?,
        };
        if matches!(outcome, Sweep::Accepted | Sweep::Advanced) {
            idle_sweeps = 0;
            continue;
        }

        // Every pending parser saw this event and left it alone.
        if committed.is_none() {
            let before = ctx.position();
            if let Some(filter) = filter.as_mut() {
                filter(ctx)?;
            }
            if ctx.position() != before {
                idle_sweeps = 0;
                continue;
            }
        }

        if ctx.is_exhausted() {
            break;
        }
        match outcome {
            Sweep::Stalled => {
                idle_sweeps += 1;
                if idle_sweeps >= limit {
                    return Err(ParserError::Deadlock {
                        sweeps: idle_sweeps,
                        pending: pending.iter().map(|slot| slot.parser.name()).collect(),
                    });
                }
            }
            _ => break,
        }
    }

    if let Some(slot) = pending.iter().find(|slot| slot.consumed > 0) {
        return Err(ParserError::DeclinedAfterConsuming {
            name: slot.parser.name(),
            consumed: slot.consumed,
        });
    }

    if mode == GroupMode::All {
        for slot in &mut pending {
            tracing::debug!(parser = %slot.parser.name(), "finalizing unmatched parser");
            slot.parser.reject(ctx)?;
        }
    }

    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, value)| value).collect())
}

fn sweep<S, T>(
    ctx: &mut ParserContext<'_, S>,
    pending: &mut Vec<Slot<'_, S, T>>,
    results: &mut Vec<(usize, T)>,
) -> Result<Sweep, ParserError> {
    let mut stalled = false;
    for i in 0..pending.len() {
        let before = ctx.position();
        let step = pending[i].parser.step(ctx)?;
        let consumed = ctx.position() - before;
        match step {
            Step::Accepted(value) => {
                let slot = pending.remove(i);
                tracing::debug!(parser = %slot.parser.name(), consumed, "parser accepted");
                results.push((slot.index, value));
                return Ok(Sweep::Accepted);
            }
            Step::Pending if consumed > 0 => {
                pending[i].consumed = consumed;
                tracing::debug!(parser = %pending[i].parser.name(), consumed, "parser committed");
                return Ok(Sweep::Advanced);
            }
            Step::Pending => stalled = true,
            Step::Declined if consumed > 0 => {
                return Err(ParserError::DeclinedAfterConsuming {
                    name: pending[i].parser.name(),
                    consumed,
                });
            }
            Step::Declined => {}
        }
    }
    Ok(if stalled { Sweep::Stalled } else { Sweep::Idle })
}

/// Step the parser that already consumed part of its effect, alone
fn step_committed<S, T>(
    ctx: &mut ParserContext<'_, S>,
    pending: &mut Vec<Slot<'_, S, T>>,
    i: usize,
    results: &mut Vec<(usize, T)>,
) -> Result<Sweep, ParserError> {
    let before = ctx.position();
    let step = pending[i].parser.step(ctx)?;
    let advanced = ctx.position() - before;
    pending[i].consumed += advanced;
    match step {
        Step::Accepted(value) => {
            let slot = pending.remove(i);
            tracing::debug!(parser = %slot.parser.name(), consumed = slot.consumed, "parser accepted");
            results.push((slot.index, value));
            Ok(Sweep::Accepted)
        }
        Step::Pending if advanced > 0 => Ok(Sweep::Advanced),
        Step::Pending => Ok(Sweep::Stalled),
        Step::Declined => Err(ParserError::DeclinedAfterConsuming {
            name: pending[i].parser.name(),
            consumed: pending[i].consumed,
        }),
    }
}
