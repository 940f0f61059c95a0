//! Firing timeline: steps a weapon through fire and reload cycles over a fixed window.

use crate::model::DamageBreakdown;
use serde::Serialize;

/// Single shot in the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct ShotEvent {
    pub time_sec: f64,
    /// Shot index within the current magazine.
    pub round: u32,
    pub damage: f64,
}

/// Result of running the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineResult {
    pub window_sec: f64,
    pub shots: Vec<ShotEvent>,
    pub reloads: u32,
    pub total_damage: f64,
    /// `total_damage / window_sec`.
    pub window_dps: f64,
}

impl TimelineResult {
    pub fn shots_fired(&self) -> usize {
        self.shots.len()
    }
}

/// Fire from t=0 every `1 / fire_rate` seconds; once a magazine is empty, wait out
/// the reload before the next shot. Each shot deals the crit-averaged post-defense
/// damage. Shots at or after `window_sec` are not counted; a reload counts if it
/// starts inside the window.
pub fn simulate(b: &DamageBreakdown, window_sec: f64) -> TimelineResult {
    let mut shots = Vec::new();
    let mut reloads = 0u32;
    if window_sec <= 0.0 || b.fire_rate <= 0.0 || b.magazine == 0 {
        return TimelineResult {
            window_sec: window_sec.max(0.0),
            shots,
            reloads,
            total_damage: 0.0,
            window_dps: 0.0,
        };
    }

    const TIME_EPS: f64 = 1e-9;
    let interval = 1.0 / b.fire_rate;
    let empty_after = f64::from(b.magazine) * interval;
    let cycle_len = empty_after + b.reload_time;
    let mut cycle = 0u32;
    'cycles: loop {
        // Times derive from the cycle index so rounding does not accumulate.
        let start = f64::from(cycle) * cycle_len;
        for round in 0..b.magazine {
            let t = start + f64::from(round) * interval;
            if t >= window_sec - TIME_EPS {
                break 'cycles;
            }
            shots.push(ShotEvent {
                time_sec: t,
                round,
                damage: b.average_per_shot,
            });
        }
        if b.reload_time > 0.0 && start + empty_after < window_sec - TIME_EPS {
            reloads += 1;
        }
        cycle += 1;
    }

    let total_damage = shots.iter().map(|s| s.damage).sum::<f64>();
    TimelineResult {
        window_sec,
        window_dps: total_damage / window_sec,
        shots,
        reloads,
        total_damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::evaluate;
    use crate::model::{BuildStats, EncounterContext, WeaponClass, WeaponProfile};

    fn rifle_breakdown() -> DamageBreakdown {
        let w = WeaponProfile::new("Test Rifle", WeaponClass::Rifle, 100.0, 10.0, 30, 2.2);
        let s = BuildStats {
            attack_power_percent: 50.0,
            ..BuildStats::default()
        };
        evaluate(&w, &s, &EncounterContext::with_defense(0)).unwrap()
    }

    #[test]
    fn one_cycle_fires_a_full_magazine() {
        let b = rifle_breakdown();
        // 30 rounds at 10/s take 3.0s, then 2.2s reload: the next shot lands at 5.2s.
        let r = simulate(&b, 5.2);
        assert_eq!(r.shots_fired(), 30);
        assert_eq!(r.reloads, 1);
        assert!((r.total_damage - 4500.0).abs() < 1e-6);
        assert!((r.window_dps - b.sustained_dps).abs() < 1e-6);
    }

    #[test]
    fn long_window_approaches_sustained_dps() {
        let b = rifle_breakdown();
        let r = simulate(&b, 520.0);
        assert_eq!(r.shots_fired(), 3000);
        assert_eq!(r.reloads, 100);
        assert!((r.window_dps - b.sustained_dps).abs() / b.sustained_dps < 0.01);
        assert!(r.window_dps < b.burst_dps);
    }

    #[test]
    fn empty_window() {
        let r = simulate(&rifle_breakdown(), 0.0);
        assert_eq!(r.shots_fired(), 0);
        assert_eq!(r.window_dps, 0.0);
    }
}
