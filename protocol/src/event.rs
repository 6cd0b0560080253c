//! Event tags and the event record itself

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;
use crate::ident::{EffectRef, HpStatus, PokemonIdent};

/// Protocol message kind.
///
/// The set is closed so every handler that matches on it is checked for
/// exhaustiveness at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventTag {
    // === Initialization ===
    #[serde(rename = "init")]
    Init,
    #[serde(rename = "player")]
    Player,
    #[serde(rename = "teamsize")]
    TeamSize,
    #[serde(rename = "gametype")]
    GameType,
    #[serde(rename = "gen")]
    Gen,
    #[serde(rename = "tier")]
    Tier,
    #[serde(rename = "rule")]
    Rule,
    #[serde(rename = "start")]
    Start,

    // === Progress ===
    #[serde(rename = "request")]
    Request,
    #[serde(rename = "turn")]
    Turn,
    #[serde(rename = "upkeep")]
    Upkeep,
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "tie")]
    Tie,

    // === Major actions ===
    #[serde(rename = "move")]
    Move,
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "drag")]
    Drag,
    #[serde(rename = "detailschange")]
    DetailsChange,
    #[serde(rename = "cant")]
    Cant,
    #[serde(rename = "faint")]
    Faint,

    // === Minor actions ===
    #[serde(rename = "-fail")]
    Fail,
    #[serde(rename = "-immune")]
    Immune,
    #[serde(rename = "-miss")]
    Miss,
    #[serde(rename = "-damage")]
    Damage,
    #[serde(rename = "-heal")]
    Heal,
    #[serde(rename = "-sethp")]
    SetHp,
    #[serde(rename = "-status")]
    Status,
    #[serde(rename = "-curestatus")]
    CureStatus,
    #[serde(rename = "-cureteam")]
    CureTeam,
    #[serde(rename = "-boost")]
    Boost,
    #[serde(rename = "-unboost")]
    Unboost,
    #[serde(rename = "-weather")]
    Weather,
    #[serde(rename = "-sidestart")]
    SideStart,
    #[serde(rename = "-sideend")]
    SideEnd,
    #[serde(rename = "-start")]
    VolatileStart,
    #[serde(rename = "-end")]
    VolatileEnd,
    #[serde(rename = "-crit")]
    Crit,
    #[serde(rename = "-supereffective")]
    SuperEffective,
    #[serde(rename = "-resisted")]
    Resisted,
    #[serde(rename = "-item")]
    Item,
    #[serde(rename = "-enditem")]
    EndItem,
    #[serde(rename = "-ability")]
    Ability,
    #[serde(rename = "-endability")]
    EndAbility,
    #[serde(rename = "-transform")]
    Transform,
    #[serde(rename = "-formechange")]
    FormeChange,
    #[serde(rename = "-activate")]
    Activate,
    #[serde(rename = "-hint")]
    Hint,
    #[serde(rename = "-message")]
    Message,
}

impl EventTag {
    /// Parse a wire spelling such as `"switch"` or `"-damage"`
    pub fn parse(s: &str) -> Option<Self> {
        let tag = match s {
            "init" => EventTag::Init,
            "player" => EventTag::Player,
            "teamsize" => EventTag::TeamSize,
            "gametype" => EventTag::GameType,
            "gen" => EventTag::Gen,
            "tier" => EventTag::Tier,
            "rule" => EventTag::Rule,
            "start" => EventTag::Start,
            "request" => EventTag::Request,
            "turn" => EventTag::Turn,
            "upkeep" => EventTag::Upkeep,
            "win" => EventTag::Win,
            "tie" => EventTag::Tie,
            "move" => EventTag::Move,
            "switch" => EventTag::Switch,
            "drag" => EventTag::Drag,
            "detailschange" => EventTag::DetailsChange,
            "cant" => EventTag::Cant,
            "faint" => EventTag::Faint,
            "-fail" => EventTag::Fail,
            "-immune" => EventTag::Immune,
            "-miss" => EventTag::Miss,
            "-damage" => EventTag::Damage,
            "-heal" => EventTag::Heal,
            "-sethp" => EventTag::SetHp,
            "-status" => EventTag::Status,
            "-curestatus" => EventTag::CureStatus,
            "-cureteam" => EventTag::CureTeam,
            "-boost" => EventTag::Boost,
            "-unboost" => EventTag::Unboost,
            "-weather" => EventTag::Weather,
            "-sidestart" => EventTag::SideStart,
            "-sideend" => EventTag::SideEnd,
            "-start" => EventTag::VolatileStart,
            "-end" => EventTag::VolatileEnd,
            "-crit" => EventTag::Crit,
            "-supereffective" => EventTag::SuperEffective,
            "-resisted" => EventTag::Resisted,
            "-item" => EventTag::Item,
            "-enditem" => EventTag::EndItem,
            "-ability" => EventTag::Ability,
            "-endability" => EventTag::EndAbility,
            "-transform" => EventTag::Transform,
            "-formechange" => EventTag::FormeChange,
            "-activate" => EventTag::Activate,
            "-hint" => EventTag::Hint,
            "-message" => EventTag::Message,
            _ => return None,
        };
        Some(tag)
    }

    /// Wire spelling of this tag
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::Init => "init",
            EventTag::Player => "player",
            EventTag::TeamSize => "teamsize",
            EventTag::GameType => "gametype",
            EventTag::Gen => "gen",
            EventTag::Tier => "tier",
            EventTag::Rule => "rule",
            EventTag::Start => "start",
            EventTag::Request => "request",
            EventTag::Turn => "turn",
            EventTag::Upkeep => "upkeep",
            EventTag::Win => "win",
            EventTag::Tie => "tie",
            EventTag::Move => "move",
            EventTag::Switch => "switch",
            EventTag::Drag => "drag",
            EventTag::DetailsChange => "detailschange",
            EventTag::Cant => "cant",
            EventTag::Faint => "faint",
            EventTag::Fail => "-fail",
            EventTag::Immune => "-immune",
            EventTag::Miss => "-miss",
            EventTag::Damage => "-damage",
            EventTag::Heal => "-heal",
            EventTag::SetHp => "-sethp",
            EventTag::Status => "-status",
            EventTag::CureStatus => "-curestatus",
            EventTag::CureTeam => "-cureteam",
            EventTag::Boost => "-boost",
            EventTag::Unboost => "-unboost",
            EventTag::Weather => "-weather",
            EventTag::SideStart => "-sidestart",
            EventTag::SideEnd => "-sideend",
            EventTag::VolatileStart => "-start",
            EventTag::VolatileEnd => "-end",
            EventTag::Crit => "-crit",
            EventTag::SuperEffective => "-supereffective",
            EventTag::Resisted => "-resisted",
            EventTag::Item => "-item",
            EventTag::EndItem => "-enditem",
            EventTag::Ability => "-ability",
            EventTag::EndAbility => "-endability",
            EventTag::Transform => "-transform",
            EventTag::FormeChange => "-formechange",
            EventTag::Activate => "-activate",
            EventTag::Hint => "-hint",
            EventTag::Message => "-message",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded protocol event.
///
/// Keyword arguments are stored without their brackets, so `[from] item:
/// Leftovers` becomes the pair `("from", "item: Leftovers")`. Flag-style
/// keywords such as `[silent]` map to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub tag: EventTag,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,
}

impl Event {
    pub fn new(tag: EventTag) -> Self {
        Self {
            tag,
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Attach a keyword argument
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Positional argument that must be present
    pub fn require(&self, index: usize) -> Result<&str, ProtocolError> {
        self.get(index).ok_or(ProtocolError::MissingArgument {
            tag: self.tag,
            index,
        })
    }

    pub fn keyword(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).map(String::as_str)
    }

    pub fn has_keyword(&self, key: &str) -> bool {
        self.kwargs.contains_key(key)
    }

    /// Parse the pokemon identifier at `index`
    pub fn ident(&self, index: usize) -> Result<PokemonIdent, ProtocolError> {
        let raw = self.require(index)?;
        PokemonIdent::parse(raw).ok_or_else(|| ProtocolError::InvalidIdent(raw.to_string()))
    }

    /// Parse the HP status at `index`, if present
    pub fn hp_status(&self, index: usize) -> Result<Option<HpStatus>, ProtocolError> {
        match self.get(index) {
            None => Ok(None),
            Some(raw) => HpStatus::parse(raw)
                .map(Some)
                .ok_or_else(|| ProtocolError::InvalidHpStatus(raw.to_string())),
        }
    }

    /// The `[from]` effect, e.g. `ability: Intimidate`
    pub fn from_effect(&self) -> Option<EffectRef> {
        self.keyword("from").map(EffectRef::parse)
    }

    /// The `[of]` pokemon, if it names one
    pub fn of_ident(&self) -> Option<PokemonIdent> {
        self.keyword("of").and_then(PokemonIdent::parse)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}", self.tag)?;
        for arg in &self.args {
            write!(f, "|{arg}")?;
        }
        for (key, value) in &self.kwargs {
            if value.is_empty() {
                write!(f, "|[{key}]")?;
            } else {
                write!(f, "|[{key}] {value}")?;
            }
        }
        Ok(())
    }
}
