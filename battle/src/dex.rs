//! Static game data used to seed possibility sets

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sleuth_protocol::to_id;

/// Per-species data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    /// Abilities the species can have, as ids
    #[serde(default)]
    pub abilities: Vec<String>,
}

/// What the opponent could possibly be running.
///
/// ```json
/// {
///   "species": { "gyarados": { "abilities": ["intimidate", "moxie"] } },
///   "items": ["leftovers", "heavydutyboots", "choiceband"]
/// }
/// ```
///
/// Keys and values are normalized to ids on load, so the file may use
/// display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dex {
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesData>,

    /// Item pool shared by every species
    #[serde(default)]
    pub items: Vec<String>,
}

impl Dex {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Dex = serde_json::from_str(json).context("invalid dex json")?;
        Ok(raw.normalized())
    }

    fn normalized(self) -> Self {
        let species = self
            .species
            .into_iter()
            .map(|(name, data)| {
                let abilities = data.abilities.iter().map(|a| to_id(a)).collect();
                (to_id(&name), SpeciesData { abilities })
            })
            .collect();
        let items = self.items.iter().map(|item| to_id(item)).collect();
        Self { species, items }
    }

    /// Candidate abilities for `species` (any spelling), if it is known
    pub fn abilities(&self, species: &str) -> Option<&[String]> {
        let data = self.species.get(&to_id(species)).or_else(|| {
            // Formes fall back to their base species ("Rotom-Wash" -> "rotom")
            let base = species.split('-').next()?;
            self.species.get(&to_id(base))
        })?;
        (!data.abilities.is_empty()).then_some(data.abilities.as_slice())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}
