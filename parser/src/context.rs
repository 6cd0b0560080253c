//! Parser context threaded through every decision point

use sleuth_inference::PossibilityArena;
use sleuth_protocol::{Event, EventTag};

use crate::{Cursor, EngineConfig, InconsistencyLog, ParserError};

/// Baseline handling of an event when no more specific interpretation
/// claims it.
///
/// Implemented by the external battle state, usually as one exhaustive
/// `match` over [`EventTag`].
pub trait Dispatch {
    fn dispatch(
        &mut self,
        event: &Event,
        beliefs: &mut PossibilityArena,
        log: &mut InconsistencyLog,
    ) -> Result<(), ParserError>;
}

/// Everything a parser body may read or mutate.
///
/// The cursor is private so that position only moves through
/// [`consume`](Self::consume) and [`dispatch`](Self::dispatch).
pub struct ParserContext<'e, S> {
    cursor: Cursor<'e>,
    config: EngineConfig,
    /// Externally-owned battle state
    pub state: S,
    pub beliefs: PossibilityArena,
    pub log: InconsistencyLog,
}

impl<'e, S> ParserContext<'e, S> {
    pub fn new(events: &'e [Event], state: S) -> Self {
        Self {
            cursor: Cursor::new(events),
            config: EngineConfig::default(),
            state,
            beliefs: PossibilityArena::new(),
            log: InconsistencyLog::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an arena that already holds sets for this session
    pub fn with_beliefs(mut self, beliefs: PossibilityArena) -> Self {
        self.beliefs = beliefs;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    pub fn peek(&mut self) -> Result<&'e Event, ParserError> {
        self.cursor.peek()
    }

    pub fn try_peek(&mut self) -> Option<&'e Event> {
        self.cursor.try_peek()
    }

    pub fn consume(&mut self) -> Result<&'e Event, ParserError> {
        self.cursor.consume()
    }

    pub fn verify(&mut self, tags: &[EventTag]) -> Result<&'e Event, ParserError> {
        self.cursor.verify(tags)
    }

    pub fn try_verify(&mut self, tags: &[EventTag]) -> Option<&'e Event> {
        self.cursor.try_verify(tags)
    }

    /// Record a soft inconsistency at the current position
    pub fn inconsistency(&mut self, message: impl Into<String>) {
        self.log.set_position(self.cursor.position());
        self.log.record(message);
    }

    /// Invoke `body` until one invocation consumes nothing
    pub fn event_loop(
        &mut self,
        mut body: impl FnMut(&mut Self) -> Result<(), ParserError>,
    ) -> Result<(), ParserError> {
        loop {
            let before = self.position();
            body(self)?;
            if self.position() == before {
                return Ok(());
            }
        }
    }

    pub fn into_parts(self) -> (S, PossibilityArena, InconsistencyLog) {
        (self.state, self.beliefs, self.log)
    }
}

impl<'e, S: Dispatch> ParserContext<'e, S> {
    /// Apply the baseline effect of the current event and consume it
    pub fn dispatch(&mut self) -> Result<&'e Event, ParserError> {
        let event = self.cursor.peek()?;
        self.log.set_position(self.cursor.position());
        self.state.dispatch(event, &mut self.beliefs, &mut self.log)?;
        self.cursor.consume()
    }

    /// Dispatch the current event if it carries one of `tags`
    pub fn try_dispatch(&mut self, tags: &[EventTag]) -> Result<Option<&'e Event>, ParserError> {
        if self.try_verify(tags).is_none() {
            return Ok(None);
        }
        self.dispatch().map(Some)
    }
}
