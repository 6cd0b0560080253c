use sleuth_inference::InferenceError;
use sleuth_protocol::{EventTag, ProtocolError};
use thiserror::Error;

/// Fatal failures of a decision point.
///
/// Every variant aborts the current decision point; the driver then treats
/// the whole session as desynchronized. Recoverable oddities go to the
/// [`InconsistencyLog`](crate::InconsistencyLog) instead.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Unexpected end of event stream at position {position}")]
    EndOfStream { position: usize },

    #[error(
        "Protocol mismatch at position {position}: expected {}, got {}",
        tag_list(.expected),
        .actual.map_or("end of stream", |tag| tag.as_str())
    )]
    ProtocolMismatch {
        position: usize,
        expected: Vec<EventTag>,
        actual: Option<EventTag>,
    },

    #[error("Consumed event at position {position} without peeking it first")]
    ConsumeWithoutPeek { position: usize },

    #[error("Expected effect never happened: {name}")]
    ExpectedEffect { name: String },

    #[error("Parser {name} declined after consuming {consumed} event(s)")]
    DeclinedAfterConsuming { name: String, consumed: usize },

    #[error("No progress after {sweeps} sweeps; still pending: {}", .pending.join(", "))]
    Deadlock { sweeps: usize, pending: Vec<String> },

    #[error("Session desynchronized at position {position}: {cause}")]
    Desynchronized { position: usize, cause: String },

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Handler failed: {0}")]
    Handler(String),
}

impl ParserError {
    pub fn expected_effect(name: impl Into<String>) -> Self {
        ParserError::ExpectedEffect { name: name.into() }
    }
}

fn tag_list(tags: &[EventTag]) -> String {
    let names: Vec<&str> = tags.iter().map(EventTag::as_str).collect();
    format!("[{}]", names.join(", "))
}
