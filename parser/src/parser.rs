//! Candidate parsers offered to the unordered engine

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use sleuth_protocol::{Event, EventTag};

use crate::{Dispatch, ParserContext, ParserError};

/// Outcome of offering the current event to a parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Committed. The engine removes the parser, so this happens at most once.
    Accepted(T),
    /// Still expecting more. After consuming events this counts as progress;
    /// without consuming it is a stall and feeds the deadlock guard.
    Pending,
    /// Nothing here for this parser. Must not have moved the cursor.
    Declined,
}

impl<T> Step<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Accepted(value) => Step::Accepted(f(value)),
            Step::Pending => Step::Pending,
            Step::Declined => Step::Declined,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Step::Accepted(_))
    }
}

/// One expected effect at a decision point.
///
/// `step` is called once per sweep with the cursor on the current unconsumed
/// event. It inspects that event (and may consume it and any following ones)
/// and reports whether it committed. A parser must decide in bounded work;
/// declining without touching the cursor is how it says "not me".
pub trait UnorderedParser<S> {
    type Output;

    fn name(&self) -> String;

    fn step(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<Step<Self::Output>, ParserError>;

    /// Called when an ALL group resolves without this parser accepting.
    /// The default silently drops it: its effect was optional.
    fn reject(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<(), ParserError> {
        let _ = ctx;
        Ok(())
    }
}

pub type BoxedParser<'p, S, T> = Box<dyn UnorderedParser<S, Output = T> + 'p>;

type Body<'p, S, T> =
    Box<dyn FnMut(&mut ParserContext<'_, S>) -> Result<Step<T>, ParserError> + 'p>;
type OnReject<'p, S> =
    Box<dyn FnMut(&mut ParserContext<'_, S>, &str) -> Result<(), ParserError> + 'p>;

/// Parser name, either fixed or computed when first needed
pub enum ParserName<'p> {
    Fixed(String),
    Lazy(Box<dyn Fn() -> String + 'p>),
}

impl<'p> ParserName<'p> {
    pub fn lazy(f: impl Fn() -> String + 'p) -> Self {
        ParserName::Lazy(Box::new(f))
    }

    pub fn resolve(&self) -> String {
        match self {
            ParserName::Fixed(name) => name.clone(),
            ParserName::Lazy(f) => f(),
        }
    }
}

impl From<&str> for ParserName<'_> {
    fn from(name: &str) -> Self {
        ParserName::Fixed(name.to_string())
    }
}

impl From<String> for ParserName<'_> {
    fn from(name: String) -> Self {
        ParserName::Fixed(name)
    }
}

impl fmt::Debug for ParserName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.resolve())
    }
}

/// Closure-backed parser
pub struct Unordered<'p, S, T> {
    name: ParserName<'p>,
    body: Body<'p, S, T>,
    on_reject: Option<OnReject<'p, S>>,
}

impl<'p, S, T> Unordered<'p, S, T> {
    pub fn new(
        name: impl Into<ParserName<'p>>,
        body: impl FnMut(&mut ParserContext<'_, S>) -> Result<Step<T>, ParserError> + 'p,
    ) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
            on_reject: None,
        }
    }

    /// Hook run if an ALL group resolves without this parser; receives the
    /// parser's name
    pub fn on_reject(
        mut self,
        hook: impl FnMut(&mut ParserContext<'_, S>, &str) -> Result<(), ParserError> + 'p,
    ) -> Self {
        self.on_reject = Some(Box::new(hook));
        self
    }

    /// Make the effect mandatory: never accepting is an
    /// [`ExpectedEffect`](ParserError::ExpectedEffect) error
    pub fn expected(self) -> Self {
        self.on_reject(|_, name| Err(ParserError::expected_effect(name)))
    }

    pub fn boxed(self) -> BoxedParser<'p, S, T>
    where
        S: 'p,
        T: 'p,
    {
        Box::new(self)
    }
}

impl<'p, S: Dispatch, T> Unordered<'p, S, T> {
    /// Accept a single event carrying one of `tags` that satisfies
    /// `matches`, applying its baseline effect through [`Dispatch`]
    pub fn event(
        name: impl Into<ParserName<'p>>,
        tags: &[EventTag],
        matches: impl Fn(&Event) -> bool + 'p,
        output: impl Fn(&Event) -> T + 'p,
    ) -> Self {
        let tags = tags.to_vec();
        Self::new(name, move |ctx| match ctx.try_verify(&tags) {
            Some(event) if matches(event) => {
                ctx.dispatch()?;
                Ok(Step::Accepted(output(event)))
            }
            _ => Ok(Step::Declined),
        })
    }
}

impl<S, T> UnorderedParser<S> for Unordered<'_, S, T> {
    type Output = T;

    fn name(&self) -> String {
        self.name.resolve()
    }

    fn step(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<Step<T>, ParserError> {
        (self.body)(ctx)
    }

    fn reject(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<(), ParserError> {
        let name = self.name.resolve();
        match self.on_reject.as_mut() {
            Some(hook) => hook(ctx, &name),
            None => {
                tracing::debug!(parser = %name, "optional effect dropped");
                Ok(())
            }
        }
    }
}

/// Shared one-shot commitment.
///
/// Several cooperating sub-effects that together make up one acceptance hold
/// clones of the same latch; only the first `try_accept` across all of them
/// returns true.
#[derive(Debug, Clone, Default)]
pub struct AcceptLatch(Rc<Cell<bool>>);

impl AcceptLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_accept(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn is_accepted(&self) -> bool {
        self.0.get()
    }
}
