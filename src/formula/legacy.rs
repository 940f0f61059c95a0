//! Legacy stat-additive model.
//!
//! Kept as a separate, simplified mode: flat attack bonus and an equipment grade
//! multiplier, no magazine or positional modeling, and a defense curve at half
//! effectiveness. Never mixed with the canonical formulas.

use crate::error::{CalcError, EntryKind, Result};
use crate::model::EncounterContext;
use serde::{Deserialize, Serialize};

/// Each point of attack adds this much flat weapon power.
pub const ATTACK_TO_POWER: f64 = 0.1;

/// Defense counts at half weight in the legacy curve.
pub const LEGACY_DEFENSE_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Common,
    Rare,
    Legendary,
    Mythic,
}

impl Grade {
    pub fn multiplier(self) -> f64 {
        match self {
            Grade::Mythic => 1.3,
            Grade::Legendary => 1.15,
            Grade::Rare => 1.05,
            Grade::Common => 1.0,
        }
    }

    pub fn korean(self) -> &'static str {
        match self {
            Grade::Mythic => "신화",
            Grade::Legendary => "전설",
            Grade::Rare => "희귀",
            Grade::Common => "일반",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyStats {
    pub weapon_power: f64,
    pub attack: f64,
    pub crit_rate: f64,
    /// Bonus percent; 100 means double damage.
    pub crit_damage: f64,
    pub armor_pen: f64,
    /// Attacks per second.
    pub attack_speed: f64,
    pub grade: Grade,
}

impl LegacyStats {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("weapon_power", self.weapon_power),
            ("attack", self.attack),
            ("crit_damage", self.crit_damage),
            ("armor_pen", self.armor_pen),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CalcError::validation(
                    field,
                    format!("must be a non-negative number, got {}", v),
                ));
            }
        }
        if !self.crit_rate.is_finite() || !(0.0..=100.0).contains(&self.crit_rate) {
            return Err(CalcError::validation(
                "crit_rate",
                format!("must be within 0..=100, got {}", self.crit_rate),
            ));
        }
        if !self.attack_speed.is_finite() || self.attack_speed <= 0.0 {
            return Err(CalcError::validation(
                "attack_speed",
                format!("must be positive, got {}", self.attack_speed),
            ));
        }
        Ok(())
    }
}

/// Situational modifiers layered on a legacy calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyModifiers {
    /// Added to the build's own armor penetration.
    pub armor_pen: f64,
    /// Final damage multiplier.
    pub buff: f64,
}

impl Default for LegacyModifiers {
    fn default() -> Self {
        Self {
            armor_pen: 0.0,
            buff: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPreset {
    pub name: String,
    pub weapon: String,
    pub stats: LegacyStats,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyBreakdown {
    pub build: Option<String>,
    pub weapon: String,
    pub grade: Grade,
    pub enemy_level: Option<u32>,
    pub enemy_defense: u32,
    pub armor_penetration: f64,
    pub base_damage: f64,
    pub normal_damage: f64,
    pub crit_damage: f64,
    pub average_damage: f64,
    pub final_damage: f64,
    pub attack_speed: f64,
    pub dps: f64,
    pub crit_rate: f64,
    pub crit_multiplier: f64,
}

/// `(weapon_power + attack * 0.1) * grade multiplier`.
pub fn base_damage(stats: &LegacyStats) -> f64 {
    (stats.weapon_power + stats.attack * ATTACK_TO_POWER) * stats.grade.multiplier()
}

/// Returns `(normal, critical, average)`.
pub fn crit_damage(base: f64, stats: &LegacyStats) -> (f64, f64, f64) {
    let rate = stats.crit_rate / 100.0;
    let multiplier = stats.crit_damage / 100.0 + 1.0;
    let critical = base * multiplier;
    let average = (1.0 - rate) * base + rate * critical;
    (base, critical, average)
}

/// `damage * 100 / (100 + max(0, defense - pen) * 0.5)`.
pub fn apply_defense(damage: f64, enemy_defense: f64, armor_pen: f64) -> f64 {
    let actual = (enemy_defense - armor_pen).max(0.0);
    damage * (100.0 / (100.0 + actual * LEGACY_DEFENSE_WEIGHT))
}

pub fn evaluate(
    weapon: &str,
    stats: &LegacyStats,
    encounter: &EncounterContext,
    modifiers: &LegacyModifiers,
) -> Result<LegacyBreakdown> {
    stats.validate()?;
    if !modifiers.armor_pen.is_finite() || modifiers.armor_pen < 0.0 {
        return Err(CalcError::validation(
            "armor_pen",
            format!("must be a non-negative number, got {}", modifiers.armor_pen),
        ));
    }
    if !modifiers.buff.is_finite() || modifiers.buff < 0.0 {
        return Err(CalcError::validation(
            "buff",
            format!("must be a non-negative number, got {}", modifiers.buff),
        ));
    }
    let base = base_damage(stats);
    let (normal, critical, average) = crit_damage(base, stats);
    let armor_pen = stats.armor_pen + modifiers.armor_pen;
    let final_damage =
        apply_defense(average, f64::from(encounter.defense), armor_pen) * modifiers.buff;
    let dps = final_damage * stats.attack_speed;
    Ok(LegacyBreakdown {
        build: None,
        weapon: weapon.to_string(),
        grade: stats.grade,
        enemy_level: encounter.enemy_level,
        enemy_defense: encounter.defense,
        armor_penetration: armor_pen,
        base_damage: base,
        normal_damage: normal,
        crit_damage: critical,
        average_damage: average,
        final_damage,
        attack_speed: stats.attack_speed,
        dps,
        crit_rate: stats.crit_rate,
        crit_multiplier: stats.crit_damage / 100.0 + 1.0,
    })
}

fn preset(
    name: &str,
    weapon: &str,
    stats: LegacyStats,
    description: &str,
) -> LegacyPreset {
    LegacyPreset {
        name: name.to_string(),
        weapon: weapon.to_string(),
        stats,
        description: description.to_string(),
    }
}

/// Build table of the legacy calculator.
pub fn legacy_presets() -> Vec<LegacyPreset> {
    vec![
        preset(
            "M82A1 루퍼스 크리",
            "M82A1 저격총",
            LegacyStats {
                weapon_power: 280.0,
                attack: 350.0,
                crit_rate: 45.0,
                crit_damage: 150.0,
                armor_pen: 20.0,
                attack_speed: 0.8,
                grade: Grade::Mythic,
            },
            "원거리 스나이퍼 빌드 - 높은 단일 피해",
        ),
        preset(
            "데저트이글 백상아리 크리",
            "데저트이글",
            LegacyStats {
                weapon_power: 200.0,
                attack: 320.0,
                crit_rate: 50.0,
                crit_damage: 140.0,
                armor_pen: 15.0,
                attack_speed: 1.5,
                grade: Grade::Legendary,
            },
            "근거리 고속 공격 - 높은 DPS",
        ),
        preset(
            "신화검 탱커",
            "신화검",
            LegacyStats {
                weapon_power: 200.0,
                attack: 280.0,
                crit_rate: 15.0,
                crit_damage: 50.0,
                armor_pen: 10.0,
                attack_speed: 1.0,
                grade: Grade::Mythic,
            },
            "탱커 빌드 - 생존 중심, 낮은 피해",
        ),
        preset(
            "마법사 원소",
            "마법 반지",
            LegacyStats {
                weapon_power: 150.0,
                attack: 400.0,
                crit_rate: 20.0,
                crit_damage: 100.0,
                armor_pen: 5.0,
                attack_speed: 1.2,
                grade: Grade::Legendary,
            },
            "범위 마법 공격 - 광범위 피해",
        ),
        preset(
            "극대율 풀극",
            "신화검",
            LegacyStats {
                weapon_power: 240.0,
                attack: 420.0,
                crit_rate: 75.0,
                crit_damage: 200.0,
                armor_pen: 25.0,
                attack_speed: 1.1,
                grade: Grade::Mythic,
            },
            "극한 빌드 - 최고 DPS, 높은 위험도",
        ),
    ]
}

/// Look up a legacy preset by (trimmed) name.
pub fn find_preset<'a>(presets: &'a [LegacyPreset], name: &str) -> Result<&'a LegacyPreset> {
    let key = crate::util::normalize_name(name);
    presets.iter().find(|p| p.name == key).ok_or_else(|| {
        let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
        CalcError::NotFound {
            kind: EntryKind::LegacyBuild,
            name: name.to_string(),
            suggestions: crate::util::suggest(&key, names),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniper() -> LegacyStats {
        legacy_presets()[0].stats
    }

    #[test]
    fn base_damage_applies_grade() {
        // (280 + 35) * 1.3
        assert!((base_damage(&sniper()) - 409.5).abs() < 1e-9);
    }

    #[test]
    fn defense_counts_at_half_weight() {
        assert!((apply_defense(100.0, 100.0, 0.0) - 100.0 / 1.5).abs() < 1e-9);
        assert_eq!(apply_defense(100.0, 10.0, 20.0), 100.0);
    }

    #[test]
    fn full_evaluation_with_buff() {
        let enc = EncounterContext::with_defense(60);
        let plain = evaluate("M82A1 저격총", &sniper(), &enc, &LegacyModifiers::default()).unwrap();
        let base = 409.5;
        let avg = 0.55 * base + 0.45 * base * 2.5;
        assert!((plain.average_damage - avg).abs() < 1e-9);
        let expected_final = avg * 100.0 / (100.0 + 40.0 * 0.5);
        assert!((plain.final_damage - expected_final).abs() < 1e-9);
        assert!((plain.dps - expected_final * 0.8).abs() < 1e-9);
        assert!((plain.crit_multiplier - 2.5).abs() < 1e-12);

        let buffed = evaluate(
            "M82A1 저격총",
            &sniper(),
            &enc,
            &LegacyModifiers {
                armor_pen: 0.0,
                buff: 1.2,
            },
        )
        .unwrap();
        assert!((buffed.final_damage - plain.final_damage * 1.2).abs() < 1e-9);
    }

    #[test]
    fn unknown_legacy_build_is_not_found() {
        let presets = legacy_presets();
        let err = find_preset(&presets, "없는 빌드").unwrap_err();
        assert!(matches!(
            err,
            CalcError::NotFound { kind: EntryKind::LegacyBuild, ref name, .. } if name == "없는 빌드"
        ));
        assert!(find_preset(&presets, " 신화검 탱커 ").is_ok());
    }

    #[test]
    fn rejects_bad_attack_speed() {
        let mut s = sniper();
        s.attack_speed = 0.0;
        assert!(evaluate("x", &s, &EncounterContext::default(), &LegacyModifiers::default()).is_err());
    }

    #[test]
    fn rejects_negative_extra_penetration() {
        let modifiers = LegacyModifiers {
            armor_pen: -1000.0,
            buff: 1.0,
        };
        let err = evaluate("x", &sniper(), &EncounterContext::with_defense(60), &modifiers)
            .unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "armor_pen", .. }));
    }
}
