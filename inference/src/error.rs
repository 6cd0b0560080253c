use thiserror::Error;

use crate::SetId;

/// Fatal inference failures. Each one means an inference rule is wrong or the
/// observed stream disagrees with the mechanics model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Overnarrowed {label}: {current} has nothing left after {operation} {requested}")]
    Overnarrow {
        label: String,
        operation: &'static str,
        current: String,
        requested: String,
    },

    #[error("Contradiction: cannot {attempted} {reason}, it is already {state}")]
    Contradiction {
        reason: String,
        attempted: &'static str,
        state: &'static str,
    },

    #[error("Ambiguous reject of {reason}: {undetermined} children are still undetermined")]
    AmbiguousReject { reason: String, undetermined: usize },

    #[error("Ambiguous assert of {reason}: {undetermined} children are still undetermined")]
    AmbiguousAssert { reason: String, undetermined: usize },

    #[error("Unknown possibility set {0}")]
    UnknownSet(SetId),
}
