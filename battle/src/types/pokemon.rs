//! Pokemon state types

use sleuth_inference::SetId;
use sleuth_protocol::HpStatus;

use super::status::Status;

/// Pokemon state during battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonState {
    /// Name used in identifiers (nickname, or species when there is none)
    pub name: String,

    /// Species including forme, e.g. "Rotom-Wash"
    pub species: String,

    pub level: u8,

    // === HP ===
    /// Current HP (percentage for the opponent, exact for our own side)
    pub hp_current: u32,

    /// Maximum HP (only known for our own side)
    pub hp_max: Option<u32>,

    // === Status ===
    pub status: Option<Status>,
    pub fainted: bool,
    pub active: bool,

    // === Revealed information ===
    pub known_moves: Vec<String>,
    pub known_ability: Option<String>,
    pub known_item: Option<String>,
    pub item_consumed: bool,

    // === Concealed information ===
    /// Candidate abilities, for pokemon whose ability is hidden from us
    pub ability: Option<SetId>,

    /// Candidate held items, for pokemon whose item is hidden from us
    pub item: Option<SetId>,
}

impl PokemonState {
    pub fn new(name: impl Into<String>, species: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            level,
            hp_current: 100,
            hp_max: None,
            status: None,
            fainted: false,
            active: false,
            known_moves: Vec::new(),
            known_ability: None,
            known_item: None,
            item_consumed: false,
            ability: None,
            item: None,
        }
    }

    /// Build from the details argument of a switch ("Gyarados, L84, M")
    pub fn from_details(name: impl Into<String>, details: &str) -> Self {
        let mut parts = details.split(", ");
        let species = parts.next().unwrap_or_default();
        let level = parts
            .find_map(|part| part.strip_prefix('L'))
            .and_then(|level| level.parse().ok())
            .unwrap_or(100);
        Self::new(name, species, level)
    }

    /// HP as a percentage (0-100)
    pub fn hp_percent(&self) -> u32 {
        match self.hp_max {
            Some(0) => 0,
            Some(max) => (self.hp_current * 100) / max,
            None => self.hp_current,
        }
    }

    pub fn record_move(&mut self, move_name: &str) {
        if !self.known_moves.iter().any(|known| known == move_name) {
            self.known_moves.push(move_name.to_string());
        }
    }

    pub fn record_ability(&mut self, ability: &str) {
        self.known_ability = Some(ability.to_string());
    }

    pub fn record_item(&mut self, item: &str) {
        self.known_item = Some(item.to_string());
        self.item_consumed = false;
    }

    pub fn consume_item(&mut self) {
        self.item_consumed = true;
    }

    pub fn apply_hp_status(&mut self, hp_status: &HpStatus) {
        self.hp_current = hp_status.current;
        if let Some(max) = hp_status.max {
            self.hp_max = Some(max);
        }

        match hp_status.status.as_deref() {
            Some("fnt") => {
                self.fainted = true;
                self.status = None;
            }
            Some(code) => self.status = Status::from_protocol(code),
            // A bare HP value says nothing about status
            None => {}
        }
    }

    pub fn on_switch_in(&mut self) {
        self.active = true;
    }

    pub fn on_switch_out(&mut self) {
        self.active = false;
    }

    pub fn is_alive(&self) -> bool {
        !self.fainted && self.hp_current > 0
    }
}
