//! Species catalog and preset loading.
//!
//! Built-in presets cover the four island species; RON files can override
//! any of them at load time, so balance tweaks never require a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::agent::{AgentConfig, Disposition};
use crate::loot::DropTable;

/// Item IDs for creature drops.
pub mod drops {
    use wildkin_common::ItemTypeId;

    /// Raw meat, dropped by most animals.
    pub const RAW_MEAT: ItemTypeId = ItemTypeId::new(1);
    /// Animal pelt.
    pub const PELT: ItemTypeId = ItemTypeId::new(2);
    /// Ivory tusk.
    pub const IVORY: ItemTypeId = ItemTypeId::new(3);
}

/// Error types for preset loading.
#[derive(Debug, Error)]
pub enum PresetError {
    /// Preset file could not be read
    #[error("failed to read preset file: {0}")]
    Io(#[from] std::io::Error),
    /// Preset file did not parse
    #[error("malformed preset file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Result type for preset operations.
pub type PresetResult<T> = Result<T, PresetError>;

/// Creature species that can appear in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Skittish herd animal
    Deer,
    /// Pack predator, hostile on sight
    Wolf,
    /// Small, quick, harmless
    Rabbit,
    /// Massive, placid until struck
    Elephant,
}

impl Species {
    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Deer => "Deer",
            Self::Wolf => "Wolf",
            Self::Rabbit => "Rabbit",
            Self::Elephant => "Elephant",
        }
    }

    /// Get all species.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Deer, Self::Wolf, Self::Rabbit, Self::Elephant]
    }

    /// Built-in behavior preset for this species.
    #[must_use]
    pub fn preset(self) -> AgentConfig {
        match self {
            Self::Deer => AgentConfig::new(Disposition::Passive)
                .with_speeds(2.5, 7.0)
                .with_detection_range(18.0)
                .with_max_health(40.0)
                .with_drop(DropTable::new(drops::RAW_MEAT, 1, 3)),
            Self::Wolf => AgentConfig::new(Disposition::Aggressive)
                .with_speeds(2.0, 6.5)
                .with_detection_range(15.0)
                .with_attack(2.0, 12.0, 1.2)
                .with_max_health(60.0)
                .with_drop(DropTable::new(drops::PELT, 1, 2)),
            Self::Rabbit => AgentConfig::new(Disposition::Passive)
                .with_speeds(1.5, 5.0)
                .with_detection_range(10.0)
                .with_max_health(15.0)
                .with_wander_radius(12.0)
                .with_drop(DropTable::new(drops::RAW_MEAT, 1, 1)),
            Self::Elephant => AgentConfig::new(Disposition::Neutral)
                .with_speeds(1.8, 5.5)
                .with_detection_range(12.0)
                .with_attack(3.0, 25.0, 2.0)
                .with_max_health(200.0)
                .with_wander_radius(25.0)
                .with_drop(DropTable::new(drops::IVORY, 1, 2)),
        }
    }
}

/// One species override entry in a preset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesPreset {
    /// Species being configured.
    pub species: Species,
    /// Replacement config; omitted fields fall back to defaults.
    pub config: AgentConfig,
}

/// Parses species overrides from RON source.
pub fn load_presets_str(source: &str) -> PresetResult<Vec<SpeciesPreset>> {
    Ok(ron::from_str(source)?)
}

/// Loads species overrides from a RON file.
pub fn load_presets_file(path: &Path) -> PresetResult<Vec<SpeciesPreset>> {
    let source = std::fs::read_to_string(path)?;
    load_presets_str(&source)
}
