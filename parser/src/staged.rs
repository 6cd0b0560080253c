//! Decision points whose effects happen in fixed phases
//!
//! Within a stage effects are unordered; stages themselves run in order. An
//! entry builds its parsers only when its stage starts, so it sees whatever
//! earlier stages changed. After a stage resolves, its entries' `after` hooks
//! run and any of them may end the decision point early (the switched-in
//! pokemon fainted to hazards, say).

use crate::unordered::run_group;
use crate::{BoxedParser, FilterFn, GroupMode, ParserContext, ParserError};

type Thunk<'p, S> = Box<dyn FnOnce(&mut ParserContext<'_, S>) -> Vec<BoxedParser<'p, S, ()>> + 'p>;
type After<'p, S> = Box<dyn FnOnce(&mut ParserContext<'_, S>) -> Result<bool, ParserError> + 'p>;

struct StageEntry<'p, S> {
    key: String,
    thunk: Thunk<'p, S>,
    after: Option<After<'p, S>>,
}

/// One phase of a staged decision point
pub struct Stage<'p, S> {
    mode: GroupMode,
    entries: Vec<StageEntry<'p, S>>,
    filter: Option<Box<FilterFn<'p, S>>>,
}

impl<'p, S> Stage<'p, S> {
    /// Stage whose unmatched parsers are finalized
    pub fn all() -> Self {
        Self::with_mode(GroupMode::All)
    }

    /// Stage whose unmatched parsers are dropped
    pub fn some() -> Self {
        Self::with_mode(GroupMode::Some)
    }

    fn with_mode(mode: GroupMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            filter: None,
        }
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn entry(
        mut self,
        key: impl Into<String>,
        thunk: impl FnOnce(&mut ParserContext<'_, S>) -> Vec<BoxedParser<'p, S, ()>> + 'p,
    ) -> Self {
        self.entries.push(StageEntry {
            key: key.into(),
            thunk: Box::new(thunk),
            after: None,
        });
        self
    }

    /// Add an entry plus a hook run once the stage resolves. The hook
    /// returns `true` to skip every later stage.
    pub fn entry_with_after(
        mut self,
        key: impl Into<String>,
        thunk: impl FnOnce(&mut ParserContext<'_, S>) -> Vec<BoxedParser<'p, S, ()>> + 'p,
        after: impl FnOnce(&mut ParserContext<'_, S>) -> Result<bool, ParserError> + 'p,
    ) -> Self {
        self.entries.push(StageEntry {
            key: key.into(),
            thunk: Box::new(thunk),
            after: Some(Box::new(after)),
        });
        self
    }

    pub fn filter(
        mut self,
        filter: impl FnMut(&mut ParserContext<'_, S>) -> Result<(), ParserError> + 'p,
    ) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }
}

/// Run `stages` in order, stopping early when an `after` hook asks to
pub fn staged<S>(ctx: &mut ParserContext<'_, S>, stages: Vec<Stage<'_, S>>) -> Result<(), ParserError> {
    for (index, stage) in stages.into_iter().enumerate() {
        let Stage {
            mode,
            entries,
            mut filter,
        } = stage;

        let mut parsers = Vec::new();
        let mut hooks = Vec::new();
        for entry in entries {
            tracing::trace!(stage = index, key = %entry.key, "building stage entry");
            parsers.extend((entry.thunk)(ctx));
            if let Some(after) = entry.after {
                hooks.push((entry.key, after));
            }
        }

        run_group(ctx, parsers, filter.as_deref_mut(), mode)?;

        let mut exit = false;
        for (key, after) in hooks {
            if after(ctx)? {
                tracing::debug!(stage = index, key = %key, "ending decision point early");
                exit = true;
            }
        }
        if exit {
            break;
        }
    }
    Ok(())
}
