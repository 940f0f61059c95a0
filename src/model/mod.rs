//! Typed records: weapon profiles, build presets, encounter context and damage breakdowns.

use crate::config::{DefenseConvention, MAX_ENEMY_LEVEL, MIN_ENEMY_LEVEL};
use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HEADSHOT_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_WEAK_POINT_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    Sniper,
    Rifle,
    Smg,
    Shotgun,
    Pistol,
    Melee,
}

impl fmt::Display for WeaponClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeaponClass::Sniper => "sniper",
            WeaponClass::Rifle => "rifle",
            WeaponClass::Smg => "smg",
            WeaponClass::Shotgun => "shotgun",
            WeaponClass::Pistol => "pistol",
            WeaponClass::Melee => "melee",
        };
        f.write_str(s)
    }
}

/// Static descriptor of a weapon archetype.
/// Melee weapons use magazine 1 and reload 0, so sustained DPS equals burst DPS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    pub class: WeaponClass,
    /// Damage per shot before any modifier.
    pub base_damage: f64,
    /// Shots per second.
    pub fire_rate: f64,
    pub magazine: u32,
    /// Seconds; 0 for weapons that never reload.
    pub reload_time: f64,
    #[serde(default = "default_headshot_multiplier")]
    pub headshot_multiplier: f64,
    #[serde(default = "default_weak_point_multiplier")]
    pub weak_point_multiplier: f64,
}

fn default_headshot_multiplier() -> f64 {
    DEFAULT_HEADSHOT_MULTIPLIER
}

fn default_weak_point_multiplier() -> f64 {
    DEFAULT_WEAK_POINT_MULTIPLIER
}

impl WeaponProfile {
    pub fn new(
        name: impl Into<String>,
        class: WeaponClass,
        base_damage: f64,
        fire_rate: f64,
        magazine: u32,
        reload_time: f64,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            base_damage,
            fire_rate,
            magazine,
            reload_time,
            headshot_multiplier: DEFAULT_HEADSHOT_MULTIPLIER,
            weak_point_multiplier: DEFAULT_WEAK_POINT_MULTIPLIER,
        }
    }

    pub fn with_multipliers(mut self, headshot: f64, weak_point: f64) -> Self {
        self.headshot_multiplier = headshot;
        self.weak_point_multiplier = weak_point;
        self
    }

    /// Reject definitions the formulas cannot work with (custom weapons from config).
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CalcError::validation("weapon.name", "must not be empty"));
        }
        if !self.base_damage.is_finite() || self.base_damage < 0.0 {
            return Err(CalcError::validation(
                "weapon.base_damage",
                format!("must be a non-negative number, got {}", self.base_damage),
            ));
        }
        if !self.fire_rate.is_finite() || self.fire_rate <= 0.0 {
            return Err(CalcError::validation(
                "weapon.fire_rate",
                format!("must be positive, got {}", self.fire_rate),
            ));
        }
        if self.magazine < 1 {
            return Err(CalcError::validation("weapon.magazine", "must be at least 1"));
        }
        if !self.reload_time.is_finite() || self.reload_time < 0.0 {
            return Err(CalcError::validation(
                "weapon.reload_time",
                format!("must be non-negative, got {}", self.reload_time),
            ));
        }
        if !self.headshot_multiplier.is_finite() || self.headshot_multiplier < 1.0 {
            return Err(CalcError::validation(
                "weapon.headshot_multiplier",
                format!("must be at least 1.0, got {}", self.headshot_multiplier),
            ));
        }
        if !self.weak_point_multiplier.is_finite() || self.weak_point_multiplier < 1.0 {
            return Err(CalcError::validation(
                "weapon.weak_point_multiplier",
                format!("must be at least 1.0, got {}", self.weak_point_multiplier),
            ));
        }
        Ok(())
    }
}

/// Stat modifiers a build applies on top of its weapon. All values are percentages except penetration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildStats {
    pub attack_power_percent: f64,
    /// 0..=100.
    pub crit_chance: f64,
    /// Bonus over 1x: 100 doubles damage on crit.
    pub crit_damage_percent: f64,
    pub armor_penetration: f64,
}

impl BuildStats {
    pub fn validate(&self) -> Result<()> {
        non_negative("attack_power_percent", self.attack_power_percent)?;
        if !self.crit_chance.is_finite() || !(0.0..=100.0).contains(&self.crit_chance) {
            return Err(CalcError::validation(
                "crit_chance",
                format!("must be within 0..=100, got {}", self.crit_chance),
            ));
        }
        non_negative("crit_damage_percent", self.crit_damage_percent)?;
        non_negative("armor_penetration", self.armor_penetration)?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::validation(
            field,
            format!("must be a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

/// Playstyle tags used for recommendations. Parses English names and the community's Korean terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playstyle {
    Ranged,
    Melee,
    Balanced,
    Firepower,
    Speed,
}

impl Playstyle {
    pub const ALL: [Playstyle; 5] = [
        Playstyle::Ranged,
        Playstyle::Melee,
        Playstyle::Balanced,
        Playstyle::Firepower,
        Playstyle::Speed,
    ];

    pub fn korean(self) -> &'static str {
        match self {
            Playstyle::Ranged => "원거리",
            Playstyle::Melee => "근거리",
            Playstyle::Balanced => "균형",
            Playstyle::Firepower => "고화력",
            Playstyle::Speed => "스피드",
        }
    }
}

impl fmt::Display for Playstyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Playstyle::Ranged => "ranged",
            Playstyle::Melee => "melee",
            Playstyle::Balanced => "balanced",
            Playstyle::Firepower => "firepower",
            Playstyle::Speed => "speed",
        };
        f.write_str(s)
    }
}

impl FromStr for Playstyle {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        let key = crate::util::normalize_name(s).to_lowercase();
        Playstyle::ALL
            .into_iter()
            .find(|p| p.to_string() == key || p.korean() == key)
            .ok_or_else(|| {
                CalcError::validation(
                    "playstyle",
                    format!(
                        "unknown playstyle \"{}\" (expected one of: {})",
                        s.trim(),
                        Playstyle::ALL
                            .iter()
                            .map(|p| format!("{}/{}", p, p.korean()))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
            })
    }
}

/// A named weapon + stat combination representing a playstyle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPreset {
    pub name: String,
    /// Must resolve to a weapon in the same catalog.
    pub weapon: String,
    #[serde(flatten)]
    pub stats: BuildStats,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub playstyles: Vec<Playstyle>,
}

/// Variable inputs not baked into a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncounterContext {
    /// Level the defense was derived from, when it was.
    pub enemy_level: Option<u32>,
    pub defense: u32,
    pub is_headshot: bool,
    pub is_weak_point: bool,
}

impl EncounterContext {
    pub fn with_defense(defense: u32) -> Self {
        Self {
            enemy_level: None,
            defense,
            is_headshot: false,
            is_weak_point: false,
        }
    }

    /// Derive defense from an enemy level. Levels outside the supported range are rejected.
    pub fn from_level(level: u32, convention: DefenseConvention) -> Result<Self> {
        if !(MIN_ENEMY_LEVEL..=MAX_ENEMY_LEVEL).contains(&level) {
            return Err(CalcError::validation(
                "enemy_level",
                format!(
                    "must be within {}..={}, got {}",
                    MIN_ENEMY_LEVEL, MAX_ENEMY_LEVEL, level
                ),
            ));
        }
        Ok(Self {
            enemy_level: Some(level),
            defense: convention.defense_for_level(level),
            is_headshot: false,
            is_weak_point: false,
        })
    }

    pub fn headshot(mut self, on: bool) -> Self {
        self.is_headshot = on;
        self
    }

    pub fn weak_point(mut self, on: bool) -> Self {
        self.is_weak_point = on;
        self
    }
}

/// Everything computed for one (build, encounter) pair. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    /// Set when the breakdown came from a catalog build.
    pub build: Option<String>,
    pub weapon: String,
    pub stats: BuildStats,
    pub encounter: EncounterContext,
    pub fire_rate: f64,
    pub magazine: u32,
    pub reload_time: f64,
    /// After attack-power scaling.
    pub base_damage: f64,
    /// After positional multipliers, before defense.
    pub normal_hit: f64,
    pub critical_hit: f64,
    /// Defense left after armor penetration, never negative.
    pub effective_defense: f64,
    pub final_normal: f64,
    pub final_critical: f64,
    pub average_per_shot: f64,
    pub burst_dps: f64,
    pub sustained_dps: f64,
    pub magazine_damage: f64,
    pub time_to_empty: f64,
    pub total_cycle_time: f64,
}

impl DamageBreakdown {
    /// Build name if present, otherwise the weapon name.
    pub fn label(&self) -> &str {
        self.build.as_deref().unwrap_or(&self.weapon)
    }
}
