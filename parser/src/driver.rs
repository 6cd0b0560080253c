use anyhow::Result;
use sleuth_inference::PossibilityArena;

use crate::{Dispatch, InconsistencyLog, ParserContext, ParserError};

/// Owns a session and runs decision points against it.
///
/// The first fatal error desynchronizes the session: the tracked state no
/// longer matches the stream, so every later call fails immediately with
/// [`ParserError::Desynchronized`].
pub struct Driver<'e, S> {
    ctx: ParserContext<'e, S>,
    desync: Option<(usize, String)>,
}

impl<'e, S> Driver<'e, S> {
    pub fn new(ctx: ParserContext<'e, S>) -> Self {
        Self { ctx, desync: None }
    }

    pub fn context(&self) -> &ParserContext<'e, S> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ParserContext<'e, S> {
        &mut self.ctx
    }

    pub fn is_desynchronized(&self) -> bool {
        self.desync.is_some()
    }

    /// Run one decision point
    pub fn decide<R>(
        &mut self,
        name: &str,
        decision: impl FnOnce(&mut ParserContext<'e, S>) -> Result<R, ParserError>,
    ) -> Result<R> {
        if let Some((position, cause)) = &self.desync {
            return Err(ParserError::Desynchronized {
                position: *position,
                cause: cause.clone(),
            }
            .into());
        }

        let start = self.ctx.position();
        match decision(&mut self.ctx) {
            Ok(value) => Ok(value),
            Err(err) => {
                let position = self.ctx.position();
                tracing::error!(decision = name, start, position, error = %err, "session desynchronized");
                self.desync = Some((position, err.to_string()));
                Err(anyhow::Error::new(err)
                    .context(format!("decision point {name} failed (started at event {start})")))
            }
        }
    }

    pub fn into_parts(self) -> (S, PossibilityArena, InconsistencyLog) {
        self.ctx.into_parts()
    }
}

impl<S: Dispatch> Driver<'_, S> {
    /// Feed the whole stream through `step`.
    ///
    /// `step` recognizes decision points at the current event; when it makes
    /// no progress the event gets its baseline handling instead.
    pub fn run(
        &mut self,
        mut step: impl FnMut(&mut ParserContext<'_, S>) -> Result<(), ParserError>,
    ) -> Result<()> {
        while !self.ctx.is_exhausted() {
            let before = self.ctx.position();
            self.decide("step", |ctx| step(ctx))?;
            if self.ctx.position() == before {
                self.decide("dispatch", |ctx| ctx.dispatch().map(|_| ()))?;
            }
        }
        tracing::info!(
            events = self.ctx.position(),
            inconsistencies = self.ctx.log.entries().len(),
            "stream replayed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sleuth_protocol::EventTag;

    use super::*;
    use crate::context::tests::{Recorder, ev};
    use crate::{Step, Unordered, all};

    #[test]
    fn test_run_dispatches_unclaimed_events() {
        let events = vec![ev(EventTag::Turn), ev(EventTag::Damage), ev(EventTag::Turn)];
        let mut driver = Driver::new(ParserContext::new(&events, Recorder::default()));

        driver.run(|_| Ok(())).unwrap();

        let (recorder, _, log) = driver.into_parts();
        assert_eq!(recorder.applied.len(), 3);
        assert!(log.is_empty());
    }

    #[test]
    fn test_run_with_decision_points() {
        let events = vec![
            ev(EventTag::Switch),
            ev(EventTag::Damage),
            ev(EventTag::Turn),
        ];
        let mut driver = Driver::new(ParserContext::new(&events, Recorder::default()));

        driver
            .run(|ctx| {
                if ctx.try_dispatch(&[EventTag::Switch])?.is_some() {
                    let hazard = Unordered::event("hazard", &[EventTag::Damage], |_| true, |_| ())
                        .expected()
                        .boxed();
                    all(ctx, vec![hazard], None)?;
                }
                Ok(())
            })
            .unwrap();

        assert!(driver.context().is_exhausted());
        assert!(!driver.is_desynchronized());
    }

    #[test]
    fn test_fatal_error_desynchronizes() {
        let events = vec![ev(EventTag::Switch), ev(EventTag::Turn)];
        let mut driver = Driver::new(ParserContext::new(&events, Recorder::default()));

        let err = driver
            .decide("switch", |ctx| {
                ctx.dispatch()?;
                let hazard = Unordered::event("stealth rock", &[EventTag::Damage], |_| true, |_| ())
                    .expected()
                    .boxed();
                all(ctx, vec![hazard], None)
            })
            .unwrap_err();

        assert!(driver.is_desynchronized());
        assert!(format!("{err:#}").contains("stealth rock"));

        let err = driver.decide("turn", |ctx| ctx.dispatch().map(|_| ())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParserError>(),
            Some(ParserError::Desynchronized { position: 1, .. })
        ));
        assert_eq!(driver.context().position(), 1);
    }

    #[test]
    fn test_inconsistency_does_not_desynchronize() {
        let events = vec![ev(EventTag::CureStatus)];
        let mut driver = Driver::new(ParserContext::new(&events, Recorder::default()));

        driver.run(|_| Ok(())).unwrap();

        assert!(!driver.is_desynchronized());
        assert_eq!(driver.context().log.entries().len(), 1);
    }

    #[test]
    fn test_decide_returns_value() {
        let events = vec![ev(EventTag::Heal)];
        let mut driver = Driver::new(ParserContext::new(&events, Recorder::default()));

        let healed = driver
            .decide("residual", |ctx| {
                let parser = Unordered::new("leftovers", |ctx: &mut ParserContext<'_, Recorder>| {
                    Ok(match ctx.try_dispatch(&[EventTag::Heal])? {
                        Some(_) => Step::Accepted(true),
                        None => Step::Declined,
                    })
                });
                all(ctx, vec![parser.boxed()], None)
            })
            .unwrap();

        assert_eq!(healed, vec![true]);
    }
}
