//! Ranking, aggregate statistics and head-to-head comparison over computed breakdowns.

use crate::error::CalcError;
use crate::model::DamageBreakdown;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Burst DPS desc, then sustained DPS desc, then label asc.
pub fn dps_order(a: &DamageBreakdown, b: &DamageBreakdown) -> Ordering {
    b.burst_dps
        .total_cmp(&a.burst_dps)
        .then_with(|| b.sustained_dps.total_cmp(&a.sustained_dps))
        .then_with(|| a.label().cmp(b.label()))
}

pub fn rank_by_dps(results: &mut [DamageBreakdown]) {
    results.sort_by(dps_order);
}

/// Numeric field of a breakdown that can be aggregated or compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BurstDps,
    SustainedDps,
    AveragePerShot,
    FinalNormal,
    FinalCritical,
    MagazineDamage,
    FireRate,
    CritChance,
    ArmorPenetration,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::BurstDps,
        Metric::SustainedDps,
        Metric::AveragePerShot,
        Metric::FinalNormal,
        Metric::FinalCritical,
        Metric::MagazineDamage,
        Metric::FireRate,
        Metric::CritChance,
        Metric::ArmorPenetration,
    ];

    /// Fixed metric set of a head-to-head comparison.
    pub const HEAD_TO_HEAD: [Metric; 5] = [
        Metric::BurstDps,
        Metric::AveragePerShot,
        Metric::FireRate,
        Metric::CritChance,
        Metric::ArmorPenetration,
    ];

    pub fn value(self, b: &DamageBreakdown) -> f64 {
        match self {
            Metric::BurstDps => b.burst_dps,
            Metric::SustainedDps => b.sustained_dps,
            Metric::AveragePerShot => b.average_per_shot,
            Metric::FinalNormal => b.final_normal,
            Metric::FinalCritical => b.final_critical,
            Metric::MagazineDamage => b.magazine_damage,
            Metric::FireRate => b.fire_rate,
            Metric::CritChance => b.stats.crit_chance,
            Metric::ArmorPenetration => b.stats.armor_penetration,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::BurstDps => "burst_dps",
            Metric::SustainedDps => "sustained_dps",
            Metric::AveragePerShot => "damage",
            Metric::FinalNormal => "final_normal",
            Metric::FinalCritical => "final_critical",
            Metric::MagazineDamage => "magazine_damage",
            Metric::FireRate => "fire_rate",
            Metric::CritChance => "crit_chance",
            Metric::ArmorPenetration => "armor_penetration",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        let key = match key.as_str() {
            "dps" => "burst_dps",
            "average_per_shot" => "damage",
            other => other,
        };
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| CalcError::validation("metric", format!("unknown metric \"{}\"", s.trim())))
    }
}

/// Aggregate statistics over one metric. All zeros for an empty input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation; 0 with fewer than two samples.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

pub fn statistics(results: &[DamageBreakdown], metric: Metric) -> Statistics {
    let mut values: Vec<f64> = results.iter().map(|b| metric.value(b)).collect();
    summarize(&mut values)
}

pub fn summarize(values: &mut [f64]) -> Statistics {
    let count = values.len();
    if count == 0 {
        return Statistics::default();
    }
    values.sort_by(f64::total_cmp);
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };
    let std_dev = if count < 2 {
        0.0
    } else {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
    };
    let min = values[0];
    let max = values[count - 1];
    Statistics {
        count,
        mean,
        median,
        std_dev,
        min,
        max,
        range: max - min,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    A,
    B,
    Even,
}

impl Winner {
    fn of(a: f64, b: f64) -> Self {
        match a.total_cmp(&b) {
            Ordering::Greater => Winner::A,
            Ordering::Less => Winner::B,
            Ordering::Equal => Winner::Even,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: Metric,
    pub a: f64,
    pub b: f64,
    /// `(a / b - 1) * 100`; 0 when `b` is zero.
    pub difference_percent: f64,
    pub winner: Winner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub a: String,
    pub b: String,
    pub metrics: Vec<MetricComparison>,
    pub a_wins: usize,
    pub b_wins: usize,
    pub verdict: Winner,
}

pub fn percent_difference(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        (a / b - 1.0) * 100.0
    }
}

pub fn head_to_head(a: &DamageBreakdown, b: &DamageBreakdown) -> HeadToHead {
    let metrics: Vec<MetricComparison> = Metric::HEAD_TO_HEAD
        .iter()
        .map(|&metric| {
            let (va, vb) = (metric.value(a), metric.value(b));
            MetricComparison {
                metric,
                a: va,
                b: vb,
                difference_percent: percent_difference(va, vb),
                winner: Winner::of(va, vb),
            }
        })
        .collect();
    let a_wins = metrics.iter().filter(|m| m.winner == Winner::A).count();
    let b_wins = metrics.iter().filter(|m| m.winner == Winner::B).count();
    let verdict = match a_wins.cmp(&b_wins) {
        Ordering::Greater => Winner::A,
        Ordering::Less => Winner::B,
        Ordering::Equal => Winner::Even,
    };
    HeadToHead {
        a: a.label().to_string(),
        b: b.label().to_string(),
        metrics,
        a_wins,
        b_wins,
        verdict,
    }
}

/// Number of builds per weapon, most used first, then by weapon name.
pub fn weapon_popularity(results: &[DamageBreakdown]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in results {
        *counts.entry(r.weapon.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(w, n)| (w.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{BuildStats, EncounterContext};

    pub(crate) fn breakdown(name: &str, burst: f64, sustained: f64) -> DamageBreakdown {
        DamageBreakdown {
            build: Some(name.to_string()),
            weapon: format!("{name} weapon"),
            stats: BuildStats::default(),
            encounter: EncounterContext::default(),
            fire_rate: 1.0,
            magazine: 1,
            reload_time: 0.0,
            base_damage: burst,
            normal_hit: burst,
            critical_hit: burst,
            effective_defense: 0.0,
            final_normal: burst,
            final_critical: burst,
            average_per_shot: burst,
            burst_dps: burst,
            sustained_dps: sustained,
            magazine_damage: burst,
            time_to_empty: 1.0,
            total_cycle_time: 1.0,
        }
    }

    #[test]
    fn ranking_breaks_ties_by_sustained_then_name() {
        let mut v = vec![
            breakdown("c", 100.0, 50.0),
            breakdown("b", 100.0, 80.0),
            breakdown("a", 100.0, 80.0),
            breakdown("d", 200.0, 10.0),
        ];
        rank_by_dps(&mut v);
        let order: Vec<&str> = v.iter().map(|b| b.label()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);

        let mut reversed: Vec<DamageBreakdown> = v.iter().rev().cloned().collect();
        rank_by_dps(&mut reversed);
        assert_eq!(reversed, v);
    }

    #[test]
    fn statistics_over_values() {
        let v = vec![
            breakdown("a", 2.0, 0.0),
            breakdown("b", 4.0, 0.0),
            breakdown("c", 4.0, 0.0),
            breakdown("d", 4.0, 0.0),
            breakdown("e", 5.0, 0.0),
            breakdown("f", 5.0, 0.0),
            breakdown("g", 7.0, 0.0),
            breakdown("h", 9.0, 0.0),
        ];
        let s = statistics(&v, Metric::BurstDps);
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.median - 4.5).abs() < 1e-12);
        assert!((s.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.range, 7.0);
    }

    #[test]
    fn statistics_degrade_gracefully() {
        assert_eq!(statistics(&[], Metric::BurstDps), Statistics::default());
        let one = statistics(&[breakdown("a", 42.0, 0.0)], Metric::BurstDps);
        assert_eq!(one.count, 1);
        assert_eq!(one.mean, 42.0);
        assert_eq!(one.median, 42.0);
        assert_eq!(one.std_dev, 0.0);
        assert_eq!(one.range, 0.0);
    }

    #[test]
    fn percent_difference_handles_zero() {
        assert_eq!(percent_difference(10.0, 0.0), 0.0);
        assert!((percent_difference(150.0, 100.0) - 50.0).abs() < 1e-12);
        assert!((percent_difference(50.0, 100.0) + 50.0).abs() < 1e-12);
    }

    #[test]
    fn head_to_head_counts_wins() {
        let mut a = breakdown("a", 200.0, 100.0);
        let mut b = breakdown("b", 100.0, 100.0);
        a.stats.crit_chance = 10.0;
        b.stats.crit_chance = 50.0;
        a.fire_rate = 2.0;
        b.fire_rate = 2.0;
        let h = head_to_head(&a, &b);
        assert_eq!(h.metrics.len(), Metric::HEAD_TO_HEAD.len());
        // a: burst, damage; b: crit; even: fire rate, penetration
        assert_eq!(h.a_wins, 2);
        assert_eq!(h.b_wins, 1);
        assert_eq!(h.verdict, Winner::A);
        let dps = &h.metrics[0];
        assert_eq!(dps.metric, Metric::BurstDps);
        assert!((dps.difference_percent - 100.0).abs() < 1e-12);
        assert_eq!(h.metrics[2].winner, Winner::Even);
        let pen = &h.metrics[4];
        assert_eq!(pen.difference_percent, 0.0);
    }

    #[test]
    fn head_to_head_even_verdict() {
        let a = breakdown("a", 100.0, 100.0);
        let b = breakdown("b", 100.0, 100.0);
        let h = head_to_head(&a, &b);
        assert_eq!(h.verdict, Winner::Even);
        assert_eq!(h.a_wins, 0);
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("dps".parse::<Metric>().unwrap(), Metric::BurstDps);
        assert_eq!("sustained-dps".parse::<Metric>().unwrap(), Metric::SustainedDps);
        assert!("luck".parse::<Metric>().is_err());
    }

    #[test]
    fn popularity_counts_weapons() {
        let mut a = breakdown("a", 1.0, 1.0);
        let mut b = breakdown("b", 1.0, 1.0);
        let c = breakdown("c", 1.0, 1.0);
        a.weapon = "Sword".to_string();
        b.weapon = "Sword".to_string();
        let p = weapon_popularity(&[a, b, c]);
        assert_eq!(p[0], ("Sword".to_string(), 2));
        assert_eq!(p[1], ("c weapon".to_string(), 1));
    }
}
