//! Identifiers embedded in event arguments

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of a two-player battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("p1") {
            Some(Player::P1)
        } else if s.starts_with("p2") {
            Some(Player::P2)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p2a: Gengar")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PokemonIdent {
    pub player: Player,
    /// Active slot letter, absent for benched references like "p2: Gengar"
    pub position: Option<char>,
    pub name: String,
}

impl PokemonIdent {
    pub fn new(player: Player, name: impl Into<String>) -> Self {
        Self {
            player,
            position: Some('a'),
            name: name.into(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let player = Player::parse(pos_part)?;
        let position = pos_part.chars().nth(2);

        Some(PokemonIdent {
            player,
            position,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for PokemonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}{}: {}", self.player, pos, self.name),
            None => write!(f, "{}: {}", self.player, self.name),
        }
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpStatus {
    pub current: u32,
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let hp_part = parts.next()?;
        let status = parts.next().map(str::to_string);

        match hp_part.split_once('/') {
            Some((current, max)) => Some(HpStatus {
                current: current.parse().ok()?,
                max: Some(max.parse().ok()?),
                status,
            }),
            None => Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            }),
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.current == 0 || self.status.as_deref() == Some("fnt")
    }
}

/// Category prefix of an effect reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Ability,
    Item,
    Move,
    Other,
}

/// Effect reference such as `ability: Intimidate` or `item: Leftovers`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectRef {
    pub kind: EffectKind,
    pub name: String,
}

impl EffectRef {
    pub fn parse(s: &str) -> Self {
        let (kind, name) = match s.split_once(": ") {
            Some(("ability", name)) => (EffectKind::Ability, name),
            Some(("item", name)) => (EffectKind::Item, name),
            Some(("move", name)) => (EffectKind::Move, name),
            _ => (EffectKind::Other, s),
        };
        Self {
            kind,
            name: name.to_string(),
        }
    }

    /// Lowercase alphanumeric form used as a possibility value
    pub fn id(&self) -> String {
        to_id(&self.name)
    }
}

/// Normalize a display name into its lookup id ("Flash Fire" -> "flashfire")
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
