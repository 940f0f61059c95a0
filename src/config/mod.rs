//! Configuration loading and validation.

use crate::error::Error;
use crate::model::{BuildPreset, WeaponProfile};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Enemy level used when a caller does not pass one.
pub const DEFAULT_ENEMY_LEVEL: u32 = 25;

/// Supported enemy level range (the bot rejected anything outside it).
pub const MIN_ENEMY_LEVEL: u32 = 1;
pub const MAX_ENEMY_LEVEL: u32 = 100;

/// Default lifetime of a memoized breakdown.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;

/// Default window for the firing timeline.
pub const DEFAULT_TIMELINE_SECONDS: f64 = 30.0;

/// Longest firing timeline; every shot in the window is kept in memory.
pub const MAX_TIMELINE_SECONDS: f64 = 3600.0;

/// Burst DPS drop between two snapshots that counts as a regression.
pub const REGRESSION_THRESHOLD: f64 = 0.05;

/// Maximum size in bytes for a config file.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

/// How an enemy level maps to a defense value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseConvention {
    /// `level * 2`
    Doubled,
    /// `level * 2 + 10`
    #[default]
    DoubledPlusTen,
}

impl DefenseConvention {
    pub fn defense_for_level(self, level: u32) -> u32 {
        match self {
            DefenseConvention::Doubled => level * 2,
            DefenseConvention::DoubledPlusTen => level * 2 + 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalcConfig {
    #[serde(default)]
    pub defense_convention: DefenseConvention,
    #[serde(default = "default_enemy_level")]
    pub default_enemy_level: u32,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Extra weapons merged into the built-in catalog.
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,
    /// Extra builds merged into the built-in catalog.
    #[serde(default)]
    pub builds: Vec<BuildPreset>,
}

fn default_enemy_level() -> u32 {
    DEFAULT_ENEMY_LEVEL
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            defense_convention: DefenseConvention::default(),
            default_enemy_level: DEFAULT_ENEMY_LEVEL,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            weapons: Vec::new(),
            builds: Vec::new(),
        }
    }
}

impl CalcConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let size = fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(Error::Config(format!(
                "config file too large: {} bytes (max {})",
                size, MAX_CONFIG_FILE_BYTES
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let cfg: CalcConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), Error> {
        if !(MIN_ENEMY_LEVEL..=MAX_ENEMY_LEVEL).contains(&self.default_enemy_level) {
            return Err(Error::Config(format!(
                "default_enemy_level must be within {}..={}, got {}",
                MIN_ENEMY_LEVEL, MAX_ENEMY_LEVEL, self.default_enemy_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let cfg = CalcConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.defense_convention, DefenseConvention::DoubledPlusTen);
        assert_eq!(cfg.default_enemy_level, DEFAULT_ENEMY_LEVEL);
        assert_eq!(cfg.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(cfg.weapons.is_empty() && cfg.builds.is_empty());
    }

    #[test]
    fn parses_custom_weapons_and_builds() {
        let cfg = CalcConfig::from_toml_str(
            r#"
defense_convention = "doubled"
default_enemy_level = 40

[[weapons]]
name = "Test Rifle"
class = "rifle"
base_damage = 100.0
fire_rate = 10.0
magazine = 30
reload_time = 2.2

[[builds]]
name = "Test Build"
weapon = "Test Rifle"
attack_power_percent = 50.0
playstyles = ["balanced"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.defense_convention, DefenseConvention::Doubled);
        assert_eq!(cfg.default_enemy_level, 40);
        assert_eq!(cfg.weapons[0].headshot_multiplier, 2.0);
        assert_eq!(cfg.builds[0].stats.attack_power_percent, 50.0);
        assert_eq!(cfg.builds[0].stats.crit_chance, 0.0);
    }

    #[test]
    fn rejects_out_of_range_default_level() {
        assert!(matches!(
            CalcConfig::from_toml_str("default_enemy_level = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn convention_mapping() {
        assert_eq!(DefenseConvention::Doubled.defense_for_level(30), 60);
        assert_eq!(DefenseConvention::DoubledPlusTen.defense_for_level(30), 70);
    }
}
