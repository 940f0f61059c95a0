//! Rule-based build advice: DPS tier, crit profile, improvement tips, matchup picks.

use crate::model::DamageBreakdown;
use serde::{Deserialize, Serialize};

pub const HIGH_BURST_DPS: f64 = 1000.0;
pub const GOOD_BURST_DPS: f64 = 500.0;
pub const CRIT_FOCUS_CHANCE: f64 = 60.0;
pub const LOW_SUSTAINED_DPS: f64 = 400.0;
pub const LOW_CRIT_CHANCE: f64 = 50.0;
pub const SMALL_MAGAZINE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdviceSeverity {
    Info,
    Tip,
    Highlight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub code: String,
    pub severity: AdviceSeverity,
    /// Short line for chat/users.
    pub summary: String,
    pub build: Option<String>,
}

impl Advice {
    fn new(code: &str, severity: AdviceSeverity, summary: String, build: &DamageBreakdown) -> Self {
        Self {
            code: code.to_string(),
            severity,
            summary,
            build: build.build.clone(),
        }
    }

    pub fn dps_tier(b: &DamageBreakdown) -> Self {
        if b.burst_dps > HIGH_BURST_DPS {
            Self::new(
                "DPS_HIGH",
                AdviceSeverity::Highlight,
                format!("Very high burst DPS ({:.0}): strong instant firepower.", b.burst_dps),
                b,
            )
        } else if b.burst_dps > GOOD_BURST_DPS {
            Self::new(
                "DPS_GOOD",
                AdviceSeverity::Info,
                format!("Solid burst DPS ({:.0}): balanced performance.", b.burst_dps),
                b,
            )
        } else {
            Self::new(
                "DPS_LOW",
                AdviceSeverity::Info,
                format!(
                    "Low burst DPS ({:.0}): accuracy and positioning matter most.",
                    b.burst_dps
                ),
                b,
            )
        }
    }

    pub fn crit_profile(b: &DamageBreakdown) -> Self {
        if b.stats.crit_chance > CRIT_FOCUS_CHANCE {
            Self::new(
                "CRIT_FOCUSED",
                AdviceSeverity::Info,
                format!(
                    "High crit chance ({:.0}%): play around critical hits.",
                    b.stats.crit_chance
                ),
                b,
            )
        } else {
            Self::new(
                "CRIT_STEADY",
                AdviceSeverity::Info,
                format!(
                    "Moderate crit chance ({:.0}%): steady, predictable damage.",
                    b.stats.crit_chance
                ),
                b,
            )
        }
    }

    pub fn reload_tip(b: &DamageBreakdown) -> Self {
        Self::new(
            "TIP_RELOAD",
            AdviceSeverity::Tip,
            format!(
                "Sustained DPS {:.0} is low: look for reload speed bonuses.",
                b.sustained_dps
            ),
            b,
        )
    }

    pub fn crit_tip(b: &DamageBreakdown) -> Self {
        Self::new(
            "TIP_CRIT",
            AdviceSeverity::Tip,
            format!(
                "Crit chance {:.0}% is below {:.0}%: look for crit chance bonuses.",
                b.stats.crit_chance, LOW_CRIT_CHANCE
            ),
            b,
        )
    }

    pub fn magazine_tip(b: &DamageBreakdown) -> Self {
        Self::new(
            "TIP_MAGAZINE",
            AdviceSeverity::Tip,
            format!(
                "Magazine of {} rounds is small: look for magazine size bonuses.",
                b.magazine
            ),
            b,
        )
    }
}

/// Tactical notes for one build.
pub fn tactical_advice(b: &DamageBreakdown) -> Vec<Advice> {
    vec![Advice::dps_tier(b), Advice::crit_profile(b)]
}

/// Improvement tips; empty when nothing stands out.
pub fn improvement_tips(b: &DamageBreakdown) -> Vec<Advice> {
    let mut tips = Vec::new();
    if b.sustained_dps < LOW_SUSTAINED_DPS {
        tips.push(Advice::reload_tip(b));
    }
    if b.stats.crit_chance < LOW_CRIT_CHANCE {
        tips.push(Advice::crit_tip(b));
    }
    if b.magazine < SMALL_MAGAZINE {
        tips.push(Advice::magazine_tip(b));
    }
    tips
}

/// Which of two builds to bring for PvE and PvP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchupPicks {
    /// Higher burst DPS.
    pub pve: String,
    /// Higher crit chance.
    pub pvp: String,
}

pub fn matchup_picks(a: &DamageBreakdown, b: &DamageBreakdown) -> MatchupPicks {
    let pve = if a.burst_dps > b.burst_dps { a } else { b };
    let pvp = if a.stats.crit_chance > b.stats.crit_chance {
        a
    } else {
        b
    };
    MatchupPicks {
        pve: pve.label().to_string(),
        pvp: pvp.label().to_string(),
    }
}
