//! Built-in weapon and build tables.

use crate::model::{BuildPreset, BuildStats, Playstyle, WeaponClass, WeaponProfile};

pub fn builtin_weapons() -> Vec<WeaponProfile> {
    vec![
        WeaponProfile::new("M82A1 저격총", WeaponClass::Sniper, 280.0, 0.8, 5, 3.5)
            .with_multipliers(2.5, 1.5),
        WeaponProfile::new("AK-47", WeaponClass::Rifle, 48.0, 9.0, 30, 2.5),
        WeaponProfile::new("MP5 기관단총", WeaponClass::Smg, 30.0, 13.0, 40, 2.2)
            .with_multipliers(1.8, 1.5),
        WeaponProfile::new("펌프 샷건", WeaponClass::Shotgun, 210.0, 1.2, 8, 3.2)
            .with_multipliers(1.5, 1.5),
        WeaponProfile::new("데저트이글", WeaponClass::Pistol, 95.0, 3.5, 7, 1.8)
            .with_multipliers(2.2, 1.5),
        WeaponProfile::new("신화검", WeaponClass::Melee, 130.0, 1.5, 1, 0.0)
            .with_multipliers(1.2, 1.5),
    ]
}

#[allow(clippy::too_many_arguments)]
fn build(
    name: &str,
    weapon: &str,
    attack_power_percent: f64,
    crit_chance: f64,
    crit_damage_percent: f64,
    armor_penetration: f64,
    description: &str,
    playstyles: &[Playstyle],
) -> BuildPreset {
    BuildPreset {
        name: name.to_string(),
        weapon: weapon.to_string(),
        stats: BuildStats {
            attack_power_percent,
            crit_chance,
            crit_damage_percent,
            armor_penetration,
        },
        description: description.to_string(),
        playstyles: playstyles.to_vec(),
    }
}

pub fn builtin_builds() -> Vec<BuildPreset> {
    use Playstyle::*;
    vec![
        build(
            "크리티컬 스나이퍼",
            "M82A1 저격총",
            60.0,
            55.0,
            150.0,
            30.0,
            "원거리 크리티컬 특화 - 높은 단일 피해",
            &[Ranged, Firepower],
        ),
        build(
            "AK 관통 빌드",
            "AK-47",
            40.0,
            20.0,
            80.0,
            60.0,
            "방어력 무시 - 고방어 적 상대",
            &[Ranged],
        ),
        build(
            "샷건 근접 빌드",
            "펌프 샷건",
            55.0,
            25.0,
            90.0,
            20.0,
            "최고의 근거리 화력",
            &[Melee],
        ),
        build(
            "신화검 크리티컬",
            "신화검",
            70.0,
            65.0,
            180.0,
            15.0,
            "근거리 크리티컬 딜러",
            &[Melee],
        ),
        build(
            "고속 연사 돌격",
            "MP5 기관단총",
            35.0,
            30.0,
            70.0,
            10.0,
            "가장 높은 연사력",
            &[Balanced, Speed],
        ),
        build(
            "권총 DPS 빌드",
            "데저트이글",
            45.0,
            40.0,
            110.0,
            15.0,
            "빠른 연사 권총",
            &[Balanced, Speed],
        ),
    ]
}
