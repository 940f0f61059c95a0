//! Build catalog: weapon and build lookup tables, read-only once constructed.

mod presets;

pub use presets::{builtin_builds, builtin_weapons};

use crate::error::{CalcError, EntryKind, Result};
use crate::model::{BuildPreset, Playstyle, WeaponProfile};
use crate::util::{lookup_key, suggest};
use std::collections::BTreeMap;

/// Weapons and builds keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    weapons: BTreeMap<String, WeaponProfile>,
    builds: BTreeMap<String, BuildPreset>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in tables. These are validated by tests, so insertion cannot fail.
    pub fn builtin() -> Self {
        let mut c = Self::empty();
        for w in builtin_weapons() {
            c.weapons.insert(lookup_key(&w.name), w);
        }
        for b in builtin_builds() {
            c.builds.insert(lookup_key(&b.name), b);
        }
        c
    }

    /// Add or replace a weapon after validating it.
    pub fn add_weapon(&mut self, weapon: WeaponProfile) -> Result<()> {
        weapon.validate()?;
        let key = lookup_key(&weapon.name);
        if self.weapons.contains_key(&key) {
            tracing::debug!(weapon = %weapon.name, "replacing catalog weapon");
        }
        self.weapons.insert(key, weapon);
        Ok(())
    }

    /// Add or replace a build. Its stats must be valid and its weapon must already be present.
    pub fn add_build(&mut self, mut build: BuildPreset) -> Result<()> {
        if build.name.trim().is_empty() {
            return Err(CalcError::validation("build.name", "must not be empty"));
        }
        build.stats.validate()?;
        // Store the weapon's canonical spelling so later lookups are exact.
        build.weapon = self.get_weapon(&build.weapon)?.name.clone();
        let key = lookup_key(&build.name);
        if self.builds.contains_key(&key) {
            tracing::debug!(build = %build.name, "replacing catalog build");
        }
        self.builds.insert(key, build);
        Ok(())
    }

    /// Merge user-defined entries; weapons first so builds may reference them.
    pub fn extend(&mut self, weapons: Vec<WeaponProfile>, builds: Vec<BuildPreset>) -> Result<()> {
        for w in weapons {
            self.add_weapon(w)?;
        }
        for b in builds {
            self.add_build(b)?;
        }
        Ok(())
    }

    pub fn list_build_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builds.values().map(|b| b.name.clone()).collect();
        names.sort();
        names
    }

    pub fn list_weapon_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.weapons.values().map(|w| w.name.clone()).collect();
        names.sort();
        names
    }

    pub fn get_build(&self, name: &str) -> Result<&BuildPreset> {
        if self.builds.is_empty() {
            return Err(CalcError::EmptyCatalog(EntryKind::Build));
        }
        self.builds.get(&lookup_key(name)).ok_or_else(|| CalcError::NotFound {
            kind: EntryKind::Build,
            name: name.to_string(),
            suggestions: suggest(name, self.builds.values().map(|b| b.name.as_str())),
        })
    }

    pub fn get_weapon(&self, name: &str) -> Result<&WeaponProfile> {
        if self.weapons.is_empty() {
            return Err(CalcError::EmptyCatalog(EntryKind::Weapon));
        }
        self.weapons.get(&lookup_key(name)).ok_or_else(|| CalcError::NotFound {
            kind: EntryKind::Weapon,
            name: name.to_string(),
            suggestions: suggest(name, self.weapons.values().map(|w| w.name.as_str())),
        })
    }

    pub fn builds(&self) -> impl Iterator<Item = &BuildPreset> {
        self.builds.values()
    }

    pub fn weapons(&self) -> impl Iterator<Item = &WeaponProfile> {
        self.weapons.values()
    }

    pub fn builds_for(&self, playstyle: Playstyle) -> Vec<&BuildPreset> {
        self.builds
            .values()
            .filter(|b| b.playstyles.contains(&playstyle))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty() && self.weapons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildStats, WeaponClass};

    #[test]
    fn builtin_tables_are_valid() {
        let c = Catalog::builtin();
        assert_eq!(c.list_weapon_names().len(), builtin_weapons().len());
        assert_eq!(c.list_build_names().len(), builtin_builds().len());
        for w in c.weapons() {
            w.validate().unwrap();
        }
        for b in c.builds() {
            b.stats.validate().unwrap();
            assert!(c.get_weapon(&b.weapon).is_ok(), "{} has unknown weapon", b.name);
        }
    }

    #[test]
    fn lookup_is_trimmed_and_case_insensitive() {
        let c = Catalog::builtin();
        assert_eq!(c.get_build("  ak 관통 빌드 ").unwrap().name, "AK 관통 빌드");
        assert_eq!(c.get_weapon("ak-47").unwrap().name, "AK-47");
    }

    #[test]
    fn unknown_build_reports_name_and_suggestions() {
        let c = Catalog::builtin();
        let err = c.get_build("스나이퍼").unwrap_err();
        match err {
            CalcError::NotFound {
                kind,
                name,
                suggestions,
            } => {
                assert_eq!(kind, EntryKind::Build);
                assert_eq!(name, "스나이퍼");
                assert_eq!(suggestions, vec!["크리티컬 스나이퍼".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_catalog_is_distinct_from_not_found() {
        let c = Catalog::empty();
        assert_eq!(
            c.get_build("anything").unwrap_err(),
            CalcError::EmptyCatalog(EntryKind::Build)
        );
        assert_eq!(
            c.get_weapon("anything").unwrap_err(),
            CalcError::EmptyCatalog(EntryKind::Weapon)
        );
    }

    #[test]
    fn build_with_unknown_weapon_is_rejected() {
        let mut c = Catalog::builtin();
        let err = c
            .add_build(BuildPreset {
                name: "Ghost".to_string(),
                weapon: "Railgun".to_string(),
                stats: BuildStats::default(),
                description: String::new(),
                playstyles: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, CalcError::NotFound { kind: EntryKind::Weapon, .. }));
    }

    #[test]
    fn extend_adds_custom_entries() {
        let mut c = Catalog::empty();
        c.extend(
            vec![WeaponProfile::new("Test Rifle", WeaponClass::Rifle, 100.0, 10.0, 30, 2.2)],
            vec![BuildPreset {
                name: "Test Build".to_string(),
                weapon: "test rifle".to_string(),
                stats: BuildStats {
                    attack_power_percent: 50.0,
                    ..BuildStats::default()
                },
                description: String::new(),
                playstyles: vec![Playstyle::Balanced],
            }],
        )
        .unwrap();
        assert_eq!(c.get_build("Test Build").unwrap().weapon, "Test Rifle");
        assert_eq!(c.builds_for(Playstyle::Balanced).len(), 1);
        assert!(c.builds_for(Playstyle::Ranged).is_empty());
    }

    #[test]
    fn invalid_custom_weapon_is_rejected() {
        let mut c = Catalog::empty();
        let err = c
            .add_weapon(WeaponProfile::new("Bad", WeaponClass::Rifle, 10.0, 0.0, 30, 1.0))
            .unwrap_err();
        assert!(matches!(err, CalcError::Validation { field: "weapon.fire_rate", .. }));
    }
}
