//! Non-fatal inconsistency records

/// An observed fact that disagreed with a weakly-held belief
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    /// Stream position of the event being handled
    pub position: usize,
    pub message: String,
}

/// Sink for soft inconsistencies.
///
/// Recording never fails and never stops reconstruction; each entry is also
/// emitted as a `tracing` warning.
#[derive(Debug, Clone, Default)]
pub struct InconsistencyLog {
    position: usize,
    entries: Vec<Inconsistency>,
}

impl InconsistencyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(position = self.position, "{message}");
        self.entries.push(Inconsistency {
            position: self.position,
            message,
        });
    }

    pub fn entries(&self) -> &[Inconsistency] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
