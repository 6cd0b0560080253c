//! Singles battle tracking on top of the sleuth parser engine.
//!
//! This crate gives the engine something to reconstruct: a tracked battle
//! that applies the baseline effect of every event, plus a small set of effect
//! parsers whose presence or absence in the stream narrows what the opponent
//! might be running.
//!
//! # Overview
//!
//! ```text
//! sleuth-protocol (events)
//!        │
//!        ▼
//! sleuth-parser (cursor, groups, driver) ◄── sleuth-inference (beliefs)
//!        │
//!        ▼
//! sleuth-battle (tracked state + effects) ← THIS CRATE
//! ```
//!
//! # Main Types
//!
//! - [`TrackedBattle`] - observed battle state; implements
//!   [`Dispatch`](sleuth_parser::Dispatch)
//! - [`Dex`] - candidate abilities per species and the item pool
//! - [`decisions`] - decision points recognized in the stream
//! - [`effects`] - parsers for individual hazards, abilities and residuals
//!
//! # Example Usage
//!
//! ```ignore
//! use sleuth_battle::{Dex, TrackedBattle, decisions};
//! use sleuth_parser::{Driver, ParserContext};
//! use sleuth_protocol::Player;
//!
//! let mut battle = TrackedBattle::new(Dex::from_json(&dex_json)?);
//! battle.set_perspective(Player::P1);
//!
//! let mut driver = Driver::new(ParserContext::new(&events, battle));
//! driver.run(decisions::step)?;
//!
//! let (battle, beliefs, log) = driver.into_parts();
//! ```

pub mod decisions;
pub mod dex;
pub mod effects;
pub mod tracking;
pub mod types;

use sleuth_parser::ParserContext;

/// Parser context over a tracked battle
pub type BattleContext<'e> = ParserContext<'e, TrackedBattle>;

// Re-export main types at crate root for convenience
pub use dex::{Dex, SpeciesData};
pub use tracking::{TrackedBattle, candidates, player_to_index};
pub use types::{PokemonState, SideCondition, SideState, Status};

// Re-export commonly used protocol types
pub use sleuth_protocol::{Player, PokemonIdent};
