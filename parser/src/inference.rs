//! Parsers whose success or failure is evidence about concealed state

use sleuth_inference::Reason;

use crate::{BoxedParser, ParserContext, ParserError, ParserName, Step, UnorderedParser};

/// What an inference body reports when it recognizes its effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inferred<T> {
    /// Committed as true once the parser accepts
    pub reason: Reason,
    pub output: T,
}

impl<T> Inferred<T> {
    pub fn new(reason: Reason, output: T) -> Self {
        Self { reason, output }
    }
}

type InferenceBody<'p, S, T> = Box<
    dyn FnMut(&mut ParserContext<'_, S>, &Reason) -> Result<Step<Inferred<T>>, ParserError> + 'p,
>;

/// Effect that happens only if `governing` holds.
///
/// Accepting asserts the reason the body returns, usually `governing`
/// itself or one disjunct of it. If an ALL group resolves without the effect
/// having appeared, `governing` is rejected; an `And` with several open
/// members is parked until later evidence decides it. A governing reason
/// already known to be false makes the parser decline without running the
/// body.
pub struct InferenceParser<'p, S, T> {
    name: ParserName<'p>,
    governing: Reason,
    body: InferenceBody<'p, S, T>,
}

impl<'p, S, T> InferenceParser<'p, S, T> {
    pub fn new(
        name: impl Into<ParserName<'p>>,
        governing: Reason,
        body: impl FnMut(&mut ParserContext<'_, S>, &Reason) -> Result<Step<Inferred<T>>, ParserError>
        + 'p,
    ) -> Self {
        Self {
            name: name.into(),
            governing,
            body: Box::new(body),
        }
    }

    pub fn governing(&self) -> &Reason {
        &self.governing
    }

    pub fn boxed(self) -> BoxedParser<'p, S, T>
    where
        S: 'p,
        T: 'p,
    {
        Box::new(self)
    }
}

impl<S, T> UnorderedParser<S> for InferenceParser<'_, S, T> {
    type Output = T;

    fn name(&self) -> String {
        self.name.resolve()
    }

    fn step(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<Step<T>, ParserError> {
        if self.governing.can_hold(&ctx.beliefs).is_false() {
            return Ok(Step::Declined);
        }
        match (self.body)(ctx, &self.governing)? {
            Step::Accepted(Inferred { reason, output }) => {
                tracing::debug!(parser = %self.name.resolve(), %reason, "effect observed");
                reason.assert(&mut ctx.beliefs)?;
                Ok(Step::Accepted(output))
            }
            Step::Pending => Ok(Step::Pending),
            Step::Declined => Ok(Step::Declined),
        }
    }

    fn reject(&mut self, ctx: &mut ParserContext<'_, S>) -> Result<(), ParserError> {
        tracing::debug!(
            parser = %self.name.resolve(),
            reason = %self.governing,
            "effect absent"
        );
        self.governing.reject_or_defer(&mut ctx.beliefs)?;
        Ok(())
    }
}
