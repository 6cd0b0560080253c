//! Forward-only view over a decoded event stream

use sleuth_protocol::{Event, EventTag};

use crate::ParserError;

/// Position into an event slice.
///
/// The position only ever increases. `peek` can be repeated freely; `consume`
/// requires a peek since the last consume so that nothing is skipped unseen.
#[derive(Debug, Clone)]
pub struct Cursor<'e> {
    events: &'e [Event],
    position: usize,
    peeked: bool,
}

impl<'e> Cursor<'e> {
    pub fn new(events: &'e [Event]) -> Self {
        Self {
            events,
            position: 0,
            peeked: false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.events.len()
    }

    /// The current event, or `None` at end of stream
    pub fn try_peek(&mut self) -> Option<&'e Event> {
        let event = self.events.get(self.position)?;
        self.peeked = true;
        Some(event)
    }

    pub fn peek(&mut self) -> Result<&'e Event, ParserError> {
        self.try_peek().ok_or(ParserError::EndOfStream {
            position: self.position,
        })
    }

    /// Advance past the event returned by the last peek
    pub fn consume(&mut self) -> Result<&'e Event, ParserError> {
        if !self.peeked {
            return Err(ParserError::ConsumeWithoutPeek {
                position: self.position,
            });
        }
        let event = self.events.get(self.position).ok_or(ParserError::EndOfStream {
            position: self.position,
        })?;
        tracing::trace!(position = self.position, %event, "consumed");
        self.position += 1;
        self.peeked = false;
        Ok(event)
    }

    /// Peek and require the current event to carry one of `tags`
    pub fn verify(&mut self, tags: &[EventTag]) -> Result<&'e Event, ParserError> {
        let actual = self.try_peek();
        match actual {
            Some(event) if tags.contains(&event.tag) => Ok(event),
            _ => Err(ParserError::ProtocolMismatch {
                position: self.position,
                expected: tags.to_vec(),
                actual: actual.map(|event| event.tag),
            }),
        }
    }

    /// Like [`verify`](Self::verify) but `None` on mismatch or end of stream
    pub fn try_verify(&mut self, tags: &[EventTag]) -> Option<&'e Event> {
        self.try_peek().filter(|event| tags.contains(&event.tag))
    }
}
