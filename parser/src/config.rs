use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for the combinator engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive sweeps without progress before a group is declared
    /// deadlocked. Zero is treated as one.
    pub deadlock_sweeps: usize,
}

impl EngineConfig {
    /// Load from a JSON object; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid engine config")
    }

    pub fn deadlock_sweeps(&self) -> usize {
        self.deadlock_sweeps.max(1)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadlock_sweeps: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(EngineConfig::default().deadlock_sweeps(), 32);
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json(r#"{"deadlock_sweeps": 4}"#).unwrap();
        assert_eq!(config.deadlock_sweeps(), 4);

        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_zero_is_clamped() {
        let config = EngineConfig { deadlock_sweeps: 0 };
        assert_eq!(config.deadlock_sweeps(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(EngineConfig::from_json(r#"{"deadlock_sweeps": "many"}"#).is_err());
    }
}
