//! Structured battle protocol events.
//!
//! Events arrive already decoded: a closed [`EventTag`], an ordered argument
//! list, and a keyword-argument record. Nothing in this crate reads raw
//! protocol text; it only gives the rest of the workspace a typed view of the
//! stream.

use thiserror::Error;

mod event;
mod ident;
mod tests;

pub use event::{Event, EventTag};
pub use ident::{EffectKind, EffectRef, HpStatus, Player, PokemonIdent, to_id};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("{tag} event is missing argument {index}")]
    MissingArgument { tag: EventTag, index: usize },

    #[error("Invalid pokemon identifier: {0}")]
    InvalidIdent(String),

    #[error("Invalid HP status: {0}")]
    InvalidHpStatus(String),
}
