//! Battle state tracking from protocol events

mod battle;
mod updater;

pub use battle::{TrackedBattle, candidates, player_to_index};
