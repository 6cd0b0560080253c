//! Belief tracking over concealed attributes.
//!
//! Every concealed attribute of every unit (an opponent's ability, its held
//! item, whether it carries some move) is a [`PossibilitySet`] of remaining
//! candidates. All sets are owned by one [`PossibilityArena`] and addressed by
//! [`SetId`], so the [`Reason`] trees built on top of them hold plain ids and
//! never alias the sets themselves.
//!
//! ```text
//! Reason::And([fact(ability, {intimidate}), fact(item, !{boots})])
//!        │ can_hold / assert / reject
//!        ▼
//! PossibilityArena ── SetId ──> PossibilitySet { "intimidate", "moxie" }
//! ```
//!
//! Reasons evaluate to a tri-state [`Truth`]. Committing a reason narrows or
//! removes candidates; every commit is all-or-nothing.

mod arena;
mod error;
mod possibility;
mod reason;

pub use arena::{PossibilityArena, SetId};
pub use error::InferenceError;
pub use possibility::PossibilitySet;
pub use reason::{Reason, Truth};
