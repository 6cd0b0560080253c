//! TrackedBattle - main battle state tracking struct

use sleuth_inference::{PossibilityArena, SetId};
use sleuth_protocol::{Player, PokemonIdent};

use crate::dex::Dex;
use crate::types::{PokemonState, SideState};

/// A singles battle reconstructed from the event stream.
///
/// Holds what has been observed. What has only been inferred lives in the
/// [`PossibilityArena`] next to it; opponent pokemon point into the arena
/// through their `ability` and `item` set ids.
#[derive(Debug, Clone)]
pub struct TrackedBattle {
    pub dex: Dex,

    // === Battle metadata ===
    pub generation: u8,
    pub tier: String,

    /// Current turn number (0 = not started)
    pub turn: u32,

    pub(crate) sides: [Option<SideState>; 2],

    /// Which player we are; the other side's hidden attributes are tracked
    /// as possibilities
    perspective: Option<Player>,

    // === Outcome ===
    pub ended: bool,
    pub winner: Option<String>,
    pub tie: bool,
}

impl TrackedBattle {
    pub fn new(dex: Dex) -> Self {
        Self {
            dex,
            generation: 9,
            tier: String::new(),
            turn: 0,
            sides: [None, None],
            perspective: None,
            ended: false,
            winner: None,
            tie: false,
        }
    }

    pub fn set_perspective(&mut self, player: Player) {
        self.perspective = Some(player);
    }

    pub fn perspective(&self) -> Option<Player> {
        self.perspective
    }

    /// Whether `player`'s abilities and items are hidden from us
    pub fn is_concealed(&self, player: Player) -> bool {
        self.perspective != Some(player)
    }

    pub fn me(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p))
    }

    pub fn opponent(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p.opponent()))
    }

    pub fn get_side(&self, player: Player) -> Option<&SideState> {
        self.sides[player_to_index(player)].as_ref()
    }

    pub fn get_side_mut(&mut self, player: Player) -> Option<&mut SideState> {
        self.sides[player_to_index(player)].as_mut()
    }

    pub fn get_or_create_side(&mut self, player: Player, username: &str) -> &mut SideState {
        let side = self.sides[player_to_index(player)]
            .get_or_insert_with(|| SideState::new(player, username));
        if side.username.is_empty() {
            side.username = username.to_string();
        }
        side
    }

    pub fn sides(&self) -> impl Iterator<Item = &SideState> {
        self.sides.iter().flatten()
    }

    /// Find a Pokemon by protocol identifier
    pub fn pokemon(&self, ident: &PokemonIdent) -> Option<&PokemonState> {
        let side = self.get_side(ident.player)?;
        side.find_pokemon(&ident.name).map(|idx| &side.pokemon[idx])
    }

    pub fn pokemon_mut(&mut self, ident: &PokemonIdent) -> Option<&mut PokemonState> {
        self.get_side_mut(ident.player)?.find_pokemon_mut(&ident.name)
    }

    /// Active pokemon of `player` with its identifier
    pub fn active(&self, player: Player) -> Option<(PokemonIdent, &PokemonState)> {
        let poke = self.get_side(player)?.active_pokemon()?;
        Some((PokemonIdent::new(player, poke.name.clone()), poke))
    }

    /// Identifiers of every active pokemon, P1 first
    pub fn active_idents(&self) -> Vec<PokemonIdent> {
        [Player::P1, Player::P2]
            .into_iter()
            .filter_map(|player| self.active(player).map(|(ident, _)| ident))
            .collect()
    }

    /// Open possibility sets for a newly seen pokemon of a concealed side
    pub(crate) fn seed_possibilities(
        &self,
        poke: &mut PokemonState,
        player: Player,
        beliefs: &mut PossibilityArena,
    ) {
        if !self.is_concealed(player) {
            return;
        }
        let label = format!("{player}: {}", poke.name);
        poke.ability = self.dex.abilities(&poke.species).map(|abilities| {
            beliefs.insert(format!("{label} ability"), abilities.iter().cloned())
        });
        let items = self.dex.items();
        if !items.is_empty() {
            poke.item = Some(beliefs.insert(format!("{label} item"), items.iter().cloned()));
        }
        tracing::debug!(
            pokemon = %label,
            ability = ?poke.ability,
            item = ?poke.item,
            "seeded possibilities"
        );
    }

    pub fn is_active(&self) -> bool {
        self.turn > 0 && !self.ended
    }
}

impl Default for TrackedBattle {
    fn default() -> Self {
        Self::new(Dex::default())
    }
}

pub fn player_to_index(player: Player) -> usize {
    match player {
        Player::P1 => 0,
        Player::P2 => 1,
    }
}

/// Candidate values still open for `set`, or empty when there is no set
pub fn candidates(beliefs: &PossibilityArena, set: Option<SetId>) -> Vec<String> {
    set.and_then(|id| beliefs.get(id).ok())
        .map(|possible| possible.iter().cloned().collect())
        .unwrap_or_default()
}
