//! Side (player) state

use std::collections::BTreeMap;

use sleuth_protocol::Player;

use super::conditions::SideCondition;
use super::pokemon::PokemonState;

/// One player's side of a singles battle
#[derive(Debug, Clone)]
pub struct SideState {
    pub player: Player,
    pub username: String,

    /// Pokemon in the order they were first seen
    pub pokemon: Vec<PokemonState>,

    /// Index into `pokemon` of the one on the field
    pub active_index: Option<usize>,

    /// Side conditions with their layer counts
    pub conditions: BTreeMap<SideCondition, u8>,
}

impl SideState {
    pub fn new(player: Player, username: impl Into<String>) -> Self {
        Self {
            player,
            username: username.into(),
            pokemon: Vec::new(),
            active_index: None,
            conditions: BTreeMap::new(),
        }
    }

    pub fn active_pokemon(&self) -> Option<&PokemonState> {
        self.active_index.and_then(|idx| self.pokemon.get(idx))
    }

    pub fn active_pokemon_mut(&mut self) -> Option<&mut PokemonState> {
        self.active_index.and_then(|idx| self.pokemon.get_mut(idx))
    }

    /// Switch the pokemon at `index` in, switching out whoever was active
    pub fn set_active(&mut self, index: usize) {
        if let Some(old) = self.active_pokemon_mut() {
            old.on_switch_out();
        }
        self.active_index = Some(index);
        if let Some(new) = self.pokemon.get_mut(index) {
            new.on_switch_in();
        }
    }

    /// Clear the active slot if it holds the pokemon at `index`
    pub fn clear_active(&mut self, index: usize) {
        if self.active_index == Some(index) {
            self.active_index = None;
        }
    }

    pub fn alive_count(&self) -> usize {
        self.pokemon.iter().filter(|p| p.is_alive()).count()
    }

    pub fn all_fainted(&self) -> bool {
        !self.pokemon.is_empty() && self.pokemon.iter().all(|p| p.fainted)
    }

    /// Find a Pokemon by identifier name (nickname or species)
    pub fn find_pokemon(&self, name: &str) -> Option<usize> {
        self.pokemon
            .iter()
            .position(|p| p.name == name || p.species == name)
    }

    pub fn find_pokemon_mut(&mut self, name: &str) -> Option<&mut PokemonState> {
        self.pokemon
            .iter_mut()
            .find(|p| p.name == name || p.species == name)
    }

    pub fn has_condition(&self, condition: SideCondition) -> bool {
        self.conditions.contains_key(&condition)
    }

    /// Layers of `condition` (0 if absent)
    pub fn condition_layers(&self, condition: SideCondition) -> u8 {
        self.conditions.get(&condition).copied().unwrap_or(0)
    }

    /// Add a condition or one more layer of it.
    /// Returns false if it was already at its maximum.
    pub fn add_condition(&mut self, condition: SideCondition) -> bool {
        let layers = self.conditions.entry(condition).or_insert(0);
        if *layers >= condition.max_layers() {
            return false;
        }
        *layers += 1;
        true
    }

    pub fn remove_condition(&mut self, condition: SideCondition) -> bool {
        self.conditions.remove(&condition).is_some()
    }

    pub fn hazards(&self) -> impl Iterator<Item = (SideCondition, u8)> + '_ {
        self.conditions
            .iter()
            .filter(|(condition, _)| condition.is_hazard())
            .map(|(condition, layers)| (*condition, *layers))
    }
}
