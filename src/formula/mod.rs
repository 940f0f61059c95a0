//! Damage formula engine: base damage, crit, positional multipliers, defense and DPS.
//!
//! Order of operations is fixed: attack-power scaling first, then crit variants,
//! then headshot/weak-point multipliers on both variants, then defense on both,
//! and DPS last from the post-defense values.

pub mod legacy;

use crate::error::{CalcError, Result};
use crate::model::{BuildStats, DamageBreakdown, EncounterContext, WeaponProfile};

/// DPS figures derived from post-defense damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpsFigures {
    pub average_per_shot: f64,
    /// Theoretical max ignoring magazine limits.
    pub burst_dps: f64,
    /// Reload dead time amortized over a full magazine.
    pub sustained_dps: f64,
    pub magazine_damage: f64,
    pub time_to_empty: f64,
    pub total_cycle_time: f64,
}

/// `base_damage * (1 + attack_power_percent / 100)`.
pub fn compute_base_damage(weapon: &WeaponProfile, attack_power_percent: f64) -> Result<f64> {
    if !attack_power_percent.is_finite() || attack_power_percent < 0.0 {
        return Err(CalcError::validation(
            "attack_power_percent",
            format!("must be a non-negative number, got {}", attack_power_percent),
        ));
    }
    Ok(weapon.base_damage * (1.0 + attack_power_percent / 100.0))
}

/// Returns `(normal, critical)`; critical = base * (1 + crit_damage_percent / 100).
pub fn compute_crit_variants(base_damage: f64, crit_damage_percent: f64) -> (f64, f64) {
    (base_damage, base_damage * (1.0 + crit_damage_percent / 100.0))
}

/// Headshot then weak point. Both may apply to the same hit and stack multiplicatively.
pub fn apply_positional_multiplier(
    damage: f64,
    is_headshot: bool,
    is_weak_point: bool,
    weapon: &WeaponProfile,
) -> f64 {
    let mut out = damage;
    if is_headshot {
        out *= weapon.headshot_multiplier;
    }
    if is_weak_point {
        out *= weapon.weak_point_multiplier;
    }
    out
}

/// Defense left after penetration, clamped at zero.
pub fn effective_defense(enemy_defense: f64, armor_penetration: f64) -> f64 {
    (enemy_defense - armor_penetration).max(0.0)
}

/// `damage * 100 / (100 + effective_defense)`. Defense 100 halves damage; never reaches zero.
pub fn apply_defense(damage: f64, enemy_defense: f64, armor_penetration: f64) -> f64 {
    let reduction = 100.0 / (100.0 + effective_defense(enemy_defense, armor_penetration));
    damage * reduction
}

pub fn compute_dps(
    weapon: &WeaponProfile,
    normal_damage: f64,
    crit_chance: f64,
    crit_damage: f64,
) -> DpsFigures {
    let crit_rate = crit_chance / 100.0;
    // Exact at the endpoints so 0% and 100% return the unblended value bit-for-bit.
    let average_per_shot = if crit_rate <= 0.0 {
        normal_damage
    } else if crit_rate >= 1.0 {
        crit_damage
    } else {
        normal_damage * (1.0 - crit_rate) + crit_damage * crit_rate
    };
    let magazine = f64::from(weapon.magazine);
    let burst_dps = average_per_shot * weapon.fire_rate;
    let time_to_empty = magazine / weapon.fire_rate;
    let total_cycle_time = time_to_empty + weapon.reload_time;
    let magazine_damage = average_per_shot * magazine;
    let sustained_dps = magazine_damage / total_cycle_time;
    DpsFigures {
        average_per_shot,
        burst_dps,
        sustained_dps,
        magazine_damage,
        time_to_empty,
        total_cycle_time,
    }
}

/// Run the whole pipeline for one weapon, stat set and encounter.
/// Inputs are validated first; on error nothing is computed.
pub fn evaluate(
    weapon: &WeaponProfile,
    stats: &BuildStats,
    encounter: &EncounterContext,
) -> Result<DamageBreakdown> {
    weapon.validate()?;
    stats.validate()?;

    let base_damage = compute_base_damage(weapon, stats.attack_power_percent)?;
    let (normal, critical) = compute_crit_variants(base_damage, stats.crit_damage_percent);
    let normal_hit = apply_positional_multiplier(
        normal,
        encounter.is_headshot,
        encounter.is_weak_point,
        weapon,
    );
    let critical_hit = apply_positional_multiplier(
        critical,
        encounter.is_headshot,
        encounter.is_weak_point,
        weapon,
    );
    let defense = f64::from(encounter.defense);
    let final_normal = apply_defense(normal_hit, defense, stats.armor_penetration);
    let final_critical = apply_defense(critical_hit, defense, stats.armor_penetration);
    let dps = compute_dps(weapon, final_normal, stats.crit_chance, final_critical);

    tracing::debug!(
        weapon = %weapon.name,
        defense = encounter.defense,
        burst_dps = dps.burst_dps,
        sustained_dps = dps.sustained_dps,
        "evaluated damage"
    );

    Ok(DamageBreakdown {
        build: None,
        weapon: weapon.name.clone(),
        stats: *stats,
        encounter: *encounter,
        fire_rate: weapon.fire_rate,
        magazine: weapon.magazine,
        reload_time: weapon.reload_time,
        base_damage,
        normal_hit,
        critical_hit,
        effective_defense: effective_defense(defense, stats.armor_penetration),
        final_normal,
        final_critical,
        average_per_shot: dps.average_per_shot,
        burst_dps: dps.burst_dps,
        sustained_dps: dps.sustained_dps,
        magazine_damage: dps.magazine_damage,
        time_to_empty: dps.time_to_empty,
        total_cycle_time: dps.total_cycle_time,
    })
}
