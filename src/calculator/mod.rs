//! Calculator: the catalog, the level-to-defense convention and the formula engine behind one API.

use crate::advice::{improvement_tips, matchup_picks, tactical_advice, Advice, MatchupPicks};
use crate::analysis::{self, HeadToHead, Metric, Statistics};
use crate::cache::{CacheKey, DamageCache};
use crate::catalog::Catalog;
use crate::config::{CalcConfig, DefenseConvention, MAX_TIMELINE_SECONDS};
use crate::error::{CalcError, Result};
use crate::formula::{self, legacy};
use crate::model::{BuildStats, DamageBreakdown, EncounterContext, Playstyle};
use crate::timeline::{self, TimelineResult};
use serde::Serialize;

/// Two builds evaluated at the same level and compared metric by metric.
#[derive(Debug, Clone, Serialize)]
pub struct Matchup {
    pub a: DamageBreakdown,
    pub b: DamageBreakdown,
    pub comparison: HeadToHead,
    pub picks: MatchupPicks,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildStatistics {
    pub metric: Metric,
    pub statistics: Statistics,
    /// All builds, best first.
    pub ranking: Vec<DamageBreakdown>,
    pub weapon_popularity: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub playstyle: Playstyle,
    /// Builds tagged with the playstyle, best first.
    pub ranked: Vec<DamageBreakdown>,
}

impl Recommendation {
    pub fn best(&self) -> Option<&DamageBreakdown> {
        self.ranked.first()
    }
}

/// Body-shot and headshot evaluation of one build plus a firing timeline and advice.
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub body: DamageBreakdown,
    pub headshot: DamageBreakdown,
    pub timeline: TimelineResult,
    pub advice: Vec<Advice>,
    pub tips: Vec<Advice>,
}

/// Immutable once built; share it across threads freely.
#[derive(Debug, Clone)]
pub struct Calculator {
    catalog: Catalog,
    convention: DefenseConvention,
    legacy: Vec<legacy::LegacyPreset>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(Catalog::builtin(), DefenseConvention::default())
    }
}

impl Calculator {
    pub fn new(catalog: Catalog, convention: DefenseConvention) -> Self {
        Self {
            catalog,
            convention,
            legacy: legacy::legacy_presets(),
        }
    }

    /// Built-in catalog extended with the config's weapons and builds.
    pub fn from_config(cfg: &CalcConfig) -> Result<Self> {
        let mut catalog = Catalog::builtin();
        catalog.extend(cfg.weapons.clone(), cfg.builds.clone())?;
        tracing::debug!(
            weapons = cfg.weapons.len(),
            builds = cfg.builds.len(),
            "merged custom catalog entries"
        );
        Ok(Self::new(catalog, cfg.defense_convention))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn convention(&self) -> DefenseConvention {
        self.convention
    }

    pub fn encounter(&self, enemy_level: u32) -> Result<EncounterContext> {
        EncounterContext::from_level(enemy_level, self.convention)
    }

    pub fn list_available_builds(&self) -> Vec<String> {
        self.catalog.list_build_names()
    }

    /// Evaluate raw stats against a named catalog weapon.
    #[allow(clippy::too_many_arguments)]
    pub fn full_calculation(
        &self,
        weapon_name: &str,
        attack_power_percent: f64,
        crit_chance: f64,
        crit_damage_percent: f64,
        armor_penetration: f64,
        enemy_defense: u32,
        is_headshot: bool,
        is_weak_point: bool,
    ) -> Result<DamageBreakdown> {
        let weapon = self.catalog.get_weapon(weapon_name)?;
        let stats = BuildStats {
            attack_power_percent,
            crit_chance,
            crit_damage_percent,
            armor_penetration,
        };
        let encounter = EncounterContext::with_defense(enemy_defense)
            .headshot(is_headshot)
            .weak_point(is_weak_point);
        formula::evaluate(weapon, &stats, &encounter)
    }

    pub fn evaluate_build(
        &self,
        build_name: &str,
        encounter: &EncounterContext,
    ) -> Result<DamageBreakdown> {
        let build = self.catalog.get_build(build_name)?;
        let weapon = self.catalog.get_weapon(&build.weapon)?;
        let mut out = formula::evaluate(weapon, &build.stats, encounter)?;
        out.build = Some(build.name.clone());
        Ok(out)
    }

    /// Evaluate a catalog build against an enemy of the given level.
    pub fn compute_damage(&self, build_name: &str, encounter_level: u32) -> Result<DamageBreakdown> {
        let encounter = self.encounter(encounter_level)?;
        self.evaluate_build(build_name, &encounter)
    }

    /// Same as [`Calculator::evaluate_build`] at a level, memoized in a caller-owned cache.
    pub fn compute_damage_cached(
        &self,
        cache: &DamageCache,
        build_name: &str,
        encounter_level: u32,
        is_headshot: bool,
        is_weak_point: bool,
    ) -> Result<DamageBreakdown> {
        let encounter = self
            .encounter(encounter_level)?
            .headshot(is_headshot)
            .weak_point(is_weak_point);
        let key = CacheKey::new(build_name, encounter_level, is_headshot, is_weak_point);
        cache.get_or_compute(key, || self.evaluate_build(build_name, &encounter))
    }

    /// Evaluate the named builds and rank them by burst DPS. Any unknown name fails the whole call.
    pub fn compare_builds<S: AsRef<str>>(
        &self,
        build_names: &[S],
        encounter_level: u32,
    ) -> Result<Vec<DamageBreakdown>> {
        let encounter = self.encounter(encounter_level)?;
        let mut results = build_names
            .iter()
            .map(|n| self.evaluate_build(n.as_ref(), &encounter))
            .collect::<Result<Vec<_>>>()?;
        analysis::rank_by_dps(&mut results);
        Ok(results)
    }

    pub fn compare_all(&self, encounter_level: u32) -> Result<Vec<DamageBreakdown>> {
        self.compare_builds(&self.list_available_builds(), encounter_level)
    }

    pub fn head_to_head(&self, a: &str, b: &str, encounter_level: u32) -> Result<Matchup> {
        let encounter = self.encounter(encounter_level)?;
        let a = self.evaluate_build(a, &encounter)?;
        let b = self.evaluate_build(b, &encounter)?;
        Ok(Matchup {
            comparison: analysis::head_to_head(&a, &b),
            picks: matchup_picks(&a, &b),
            a,
            b,
        })
    }

    /// Head-to-head from a list of names, which must hold exactly two entries.
    pub fn head_to_head_names<S: AsRef<str>>(
        &self,
        build_names: &[S],
        encounter_level: u32,
    ) -> Result<Matchup> {
        match build_names {
            [a, b] => self.head_to_head(a.as_ref(), b.as_ref(), encounter_level),
            _ => Err(CalcError::validation(
                "builds",
                format!("head-to-head needs exactly 2 builds, got {}", build_names.len()),
            )),
        }
    }

    pub fn build_statistics(&self, encounter_level: u32, metric: Metric) -> Result<BuildStatistics> {
        let ranking = self.compare_all(encounter_level)?;
        Ok(BuildStatistics {
            metric,
            statistics: analysis::statistics(&ranking, metric),
            weapon_popularity: analysis::weapon_popularity(&ranking),
            ranking,
        })
    }

    pub fn recommend(&self, playstyle: Playstyle, encounter_level: u32) -> Result<Recommendation> {
        let names: Vec<&str> = self
            .catalog
            .builds_for(playstyle)
            .into_iter()
            .map(|b| b.name.as_str())
            .collect();
        Ok(Recommendation {
            playstyle,
            ranked: self.compare_builds(&names, encounter_level)?,
        })
    }

    pub fn simulate(
        &self,
        build_name: &str,
        encounter_level: u32,
        window_sec: f64,
    ) -> Result<Simulation> {
        if !window_sec.is_finite() || window_sec <= 0.0 || window_sec > MAX_TIMELINE_SECONDS {
            return Err(CalcError::validation(
                "seconds",
                format!(
                    "must be within (0, {}], got {}",
                    MAX_TIMELINE_SECONDS, window_sec
                ),
            ));
        }
        let encounter = self.encounter(encounter_level)?;
        let body = self.evaluate_build(build_name, &encounter)?;
        let headshot = self.evaluate_build(build_name, &encounter.headshot(true))?;
        Ok(Simulation {
            timeline: timeline::simulate(&body, window_sec),
            advice: tactical_advice(&body),
            tips: improvement_tips(&body),
            body,
            headshot,
        })
    }

    pub fn list_legacy_builds(&self) -> Vec<String> {
        self.legacy.iter().map(|p| p.name.clone()).collect()
    }

    /// Legacy stat-additive model; separate from every other entry point.
    pub fn analyze_legacy(
        &self,
        build_name: &str,
        encounter_level: u32,
        modifiers: &legacy::LegacyModifiers,
    ) -> Result<legacy::LegacyBreakdown> {
        let preset = legacy::find_preset(&self.legacy, build_name)?;
        let encounter = self.encounter(encounter_level)?;
        let mut out = legacy::evaluate(&preset.weapon, &preset.stats, &encounter, modifiers)?;
        out.build = Some(preset.name.clone());
        Ok(out)
    }

    /// Every legacy build, highest DPS first.
    pub fn compare_legacy(&self, encounter_level: u32) -> Result<Vec<legacy::LegacyBreakdown>> {
        let modifiers = legacy::LegacyModifiers::default();
        let mut out = self
            .legacy
            .iter()
            .map(|p| self.analyze_legacy(&p.name, encounter_level, &modifiers))
            .collect::<Result<Vec<_>>>()?;
        out.sort_by(|a, b| b.dps.total_cmp(&a.dps).then_with(|| a.build.cmp(&b.build)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntryKind;
    use crate::model::{BuildPreset, WeaponClass, WeaponProfile};
    use std::time::Duration;

    fn calc_with_test_build() -> Calculator {
        let mut catalog = Catalog::builtin();
        catalog
            .extend(
                vec![WeaponProfile::new("Test Rifle", WeaponClass::Rifle, 100.0, 10.0, 30, 2.2)],
                vec![BuildPreset {
                    name: "Test Build".to_string(),
                    weapon: "Test Rifle".to_string(),
                    stats: BuildStats {
                        attack_power_percent: 50.0,
                        ..BuildStats::default()
                    },
                    description: String::new(),
                    playstyles: vec![],
                }],
            )
            .unwrap();
        Calculator::new(catalog, DefenseConvention::Doubled)
    }

    #[test]
    fn compute_damage_uses_level_convention() {
        let calc = Calculator::default();
        let b = calc.compute_damage("AK 관통 빌드", 25).unwrap();
        assert_eq!(b.encounter.defense, 60);
        assert_eq!(b.encounter.enemy_level, Some(25));
        assert_eq!(b.build.as_deref(), Some("AK 관통 빌드"));
        assert_eq!(b.weapon, "AK-47");
        // AK penetration 60 cancels defense 60 entirely.
        assert_eq!(b.effective_defense, 0.0);
    }

    #[test]
    fn unknown_build_is_not_found_with_exact_name() {
        let calc = Calculator::default();
        let err = calc.compute_damage("이 이름은 존재하지 않음", 25).unwrap_err();
        match err {
            CalcError::NotFound { kind, name, .. } => {
                assert_eq!(kind, EntryKind::Build);
                assert_eq!(name, "이 이름은 존재하지 않음");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_level_is_validation_error() {
        let calc = Calculator::default();
        assert!(matches!(
            calc.compute_damage("AK 관통 빌드", 0),
            Err(CalcError::Validation { field: "enemy_level", .. })
        ));
    }

    #[test]
    fn full_calculation_matches_scenario() {
        let calc = calc_with_test_build();
        let b = calc
            .full_calculation("Test Rifle", 50.0, 0.0, 0.0, 0.0, 0, false, false)
            .unwrap();
        assert!((b.burst_dps - 1500.0).abs() < 1e-9);
        assert!((b.sustained_dps - 4500.0 / 5.2).abs() < 1e-9);
        let err = calc
            .full_calculation("Railgun", 50.0, 0.0, 0.0, 0.0, 0, false, false)
            .unwrap_err();
        assert!(matches!(err, CalcError::NotFound { kind: EntryKind::Weapon, .. }));
        let err = calc
            .full_calculation("Test Rifle", 50.0, 120.0, 0.0, 0.0, 0, false, false)
            .unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "crit_chance", .. }));
    }

    #[test]
    fn compare_is_sorted_and_order_independent() {
        let calc = Calculator::default();
        let mut names = calc.list_available_builds();
        let forward = calc.compare_builds(&names, 30).unwrap();
        names.reverse();
        let backward = calc.compare_builds(&names, 30).unwrap();
        assert_eq!(forward, backward);
        for pair in forward.windows(2) {
            assert!(pair[0].burst_dps >= pair[1].burst_dps);
        }
    }

    #[test]
    fn compare_fails_on_any_unknown_build() {
        let calc = Calculator::default();
        let err = calc
            .compare_builds(&["AK 관통 빌드", "없는 빌드"], 25)
            .unwrap_err();
        assert!(matches!(err, CalcError::NotFound { ref name, .. } if name == "없는 빌드"));
        assert!(calc.compare_builds::<&str>(&[], 25).unwrap().is_empty());
    }

    #[test]
    fn head_to_head_requires_exactly_two() {
        let calc = Calculator::default();
        assert!(matches!(
            calc.head_to_head_names(&["AK 관통 빌드"], 30),
            Err(CalcError::Validation { field: "builds", .. })
        ));
        let m = calc
            .head_to_head_names(&["AK 관통 빌드", "크리티컬 스나이퍼"], 30)
            .unwrap();
        assert_eq!(m.comparison.a, "AK 관통 빌드");
        assert_eq!(m.comparison.b, "크리티컬 스나이퍼");
        assert_eq!(m.picks.pvp, "크리티컬 스나이퍼");
    }

    #[test]
    fn statistics_cover_all_builds() {
        let calc = Calculator::default();
        let s = calc.build_statistics(25, Metric::BurstDps).unwrap();
        assert_eq!(s.statistics.count, calc.list_available_builds().len());
        assert!(s.statistics.max >= s.statistics.mean && s.statistics.mean >= s.statistics.min);
        assert_eq!(s.ranking[0].burst_dps, s.statistics.max);
    }

    #[test]
    fn recommend_ranks_tagged_builds() {
        let calc = Calculator::default();
        let r = calc.recommend(Playstyle::Speed, 30).unwrap();
        let names: Vec<&str> = r.ranked.iter().map(|b| b.label()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"고속 연사 돌격") && names.contains(&"권총 DPS 빌드"));
        assert_eq!(r.best().map(|b| b.label()), Some(names[0]));
    }

    #[test]
    fn simulate_includes_headshot_variant() {
        let calc = calc_with_test_build();
        let s = calc.simulate("Test Build", 5, 10.0).unwrap();
        assert!((s.headshot.normal_hit - s.body.normal_hit * 2.0).abs() < 1e-9);
        assert!(s.timeline.shots_fired() > 0);
        assert!(calc.simulate("Test Build", 5, 0.0).is_err());
    }

    #[test]
    fn simulate_rejects_oversized_window() {
        let calc = Calculator::default();
        assert!(matches!(
            calc.simulate("고속 연사 돌격", 25, 1.0e6),
            Err(CalcError::Validation { field: "seconds", .. })
        ));
        assert!(calc
            .simulate("고속 연사 돌격", 25, MAX_TIMELINE_SECONDS)
            .is_ok());
    }

    #[test]
    fn cached_lookup_matches_uncached() {
        let calc = Calculator::default();
        let cache = DamageCache::new(Duration::from_secs(60));
        let a = calc
            .compute_damage_cached(&cache, "권총 DPS 빌드", 40, true, false)
            .unwrap();
        let b = calc
            .compute_damage_cached(&cache, "권총 DPS 빌드", 40, true, false)
            .unwrap();
        let direct = calc
            .evaluate_build("권총 DPS 빌드", &calc.encounter(40).unwrap().headshot(true))
            .unwrap();
        assert_eq!(a, direct);
        assert_eq!(b, direct);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn legacy_is_separate_and_sorted() {
        let calc = Calculator::default();
        let all = calc.compare_legacy(25).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].dps >= w[1].dps));
        assert_eq!(all[0].enemy_defense, 60);
        assert!(matches!(
            calc.analyze_legacy("크리티컬 스나이퍼", 25, &legacy::LegacyModifiers::default()),
            Err(CalcError::NotFound { kind: EntryKind::LegacyBuild, .. })
        ));
    }
}
