//! Forward-only parser combinators for battle logs whose effects arrive in
//! an order the observer cannot predict.
//!
//! ```text
//!            events ─► Cursor ─► ParserContext ◄── Dispatch (battle state)
//!                                     │
//!        ┌───────────────┬────────────┼──────────────┐
//!      all/some        one_of       staged        Driver
//!        │                                          │
//!   UnorderedParser ── InferenceParser ──► PossibilityArena
//! ```
//!
//! A decision point builds one parser per effect that may follow (a switch
//! may be followed by hazard damage, an on-entry ability, a held item) and
//! hands them to a group. The group offers each event to the pending parsers
//! until none of them can use it. Effects that only some hidden variant of
//! the opponent's team could cause are [`InferenceParser`]s: seeing them
//! narrows what the opponent might be holding, and not seeing them narrows it
//! the other way.

mod config;
mod context;
mod cursor;
mod diagnostics;
mod driver;
mod error;
mod inference;
mod parser;
mod staged;
mod unordered;

pub use config::EngineConfig;
pub use context::{Dispatch, ParserContext};
pub use cursor::Cursor;
pub use diagnostics::{Inconsistency, InconsistencyLog};
pub use driver::Driver;
pub use error::ParserError;
pub use inference::{InferenceParser, Inferred};
pub use parser::{AcceptLatch, BoxedParser, ParserName, Step, Unordered, UnorderedParser};
pub use staged::{Stage, staged};
pub use unordered::{FilterFn, GroupMode, all, one_of, some};
