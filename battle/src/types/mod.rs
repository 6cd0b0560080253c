//! Domain types for battle state tracking

mod conditions;
mod pokemon;
mod side;
mod status;

pub use conditions::SideCondition;
pub use pokemon::PokemonState;
pub use side::SideState;
pub use status::Status;
