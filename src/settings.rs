//! Runner settings
//!
//! Which level to play, the match seed and how long the headless runner may
//! play before giving up. Stored as JSON; every field has a default so partial
//! files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::LevelKind;

/// Runner settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Level preset (physics scale and AI tier)
    #[serde(with = "level_name")]
    pub level: LevelKind,
    /// Match seed; a random one is drawn when absent
    pub seed: Option<u64>,
    /// Simulated seconds before the runner stops an unfinished match
    pub max_match_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: LevelKind::Beach,
            seed: None,
            max_match_seconds: 600.0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Seed to play with, drawing one if none was configured
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Levels are written by name, read case-insensitively
mod level_name {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::sim::LevelKind;

    pub fn serialize<S: Serializer>(level: &LevelKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(level.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<LevelKind, D::Error> {
        let name = String::deserialize(d)?;
        LevelKind::from_str(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown level '{name}'")))
    }
}
