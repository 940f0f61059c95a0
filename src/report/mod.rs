//! Text, JSON and HTML rendering of calculation results.

use crate::advice::{Advice, AdviceSeverity};
use crate::analysis::{HeadToHead, Metric, Statistics, Winner};
use crate::error::Error;
use crate::formula::legacy::LegacyBreakdown;
use crate::model::DamageBreakdown;
use crate::store::RunDiff;
use crate::timeline::TimelineResult;
use crate::util::lookup_key;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const RULE: &str = "======================================================================";

fn encounter_line(b: &DamageBreakdown) -> String {
    let mut flags = Vec::new();
    if b.encounter.is_headshot {
        flags.push("headshot");
    }
    if b.encounter.is_weak_point {
        flags.push("weak point");
    }
    let level = b
        .encounter
        .enemy_level
        .map(|l| format!("level {l}, "))
        .unwrap_or_default();
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!("{}defense {}{}", level, b.encounter.defense, flags)
}

pub fn format_breakdown(b: &DamageBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{} - {}", b.label(), b.weapon);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Enemy: {}", encounter_line(b));
    let _ = writeln!(
        out,
        "Stats: attack +{:.0}%  crit {:.0}% x{:.0}%  penetration {:.0}",
        b.stats.attack_power_percent,
        b.stats.crit_chance,
        b.stats.crit_damage_percent,
        b.stats.armor_penetration
    );
    let _ = writeln!(
        out,
        "Weapon: {:.2} shots/s  magazine {}  reload {:.1}s",
        b.fire_rate, b.magazine, b.reload_time
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  base damage      {:>10.2}", b.base_damage);
    let _ = writeln!(out, "  normal hit       {:>10.2}", b.normal_hit);
    let _ = writeln!(out, "  critical hit     {:>10.2}", b.critical_hit);
    let _ = writeln!(out, "  eff. defense     {:>10.2}", b.effective_defense);
    let _ = writeln!(out, "  final normal     {:>10.2}", b.final_normal);
    let _ = writeln!(out, "  final critical   {:>10.2}", b.final_critical);
    let _ = writeln!(out, "  avg per shot     {:>10.2}", b.average_per_shot);
    let _ = writeln!(out);
    let _ = writeln!(out, "  burst DPS        {:>10.2}", b.burst_dps);
    let _ = writeln!(out, "  sustained DPS    {:>10.2}", b.sustained_dps);
    let _ = writeln!(
        out,
        "  magazine damage  {:>10.2}  ({:.2}s to empty, {:.2}s cycle)",
        b.magazine_damage, b.time_to_empty, b.total_cycle_time
    );
    out.push_str(RULE);
    out
}

/// Numbered ranking table; expects results already sorted.
pub fn format_ranking(results: &[DamageBreakdown]) -> String {
    if results.is_empty() {
        return "No builds to compare.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<24} {:<16} {:>10} {:>10} {:>10}",
        "#", "Build", "Weapon", "Burst", "Sustained", "Per shot"
    );
    for (i, b) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<24} {:<16} {:>10.2} {:>10.2} {:>10.2}",
            i + 1,
            b.label(),
            b.weapon,
            b.burst_dps,
            b.sustained_dps,
            b.average_per_shot
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn format_statistics(metric: Metric, s: &Statistics) -> String {
    if s.count == 0 {
        return format!("{}: no data", metric.name());
    }
    format!(
        "{} over {} build(s)\n  mean   {:.2}\n  median {:.2}\n  stdev  {:.2}\n  min    {:.2}\n  max    {:.2}\n  range  {:.2}",
        metric.name(),
        s.count,
        s.mean,
        s.median,
        s.std_dev,
        s.min,
        s.max,
        s.range
    )
}

pub fn format_popularity(popularity: &[(String, usize)]) -> String {
    popularity
        .iter()
        .map(|(weapon, n)| format!("  {weapon}: {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_head_to_head(h: &HeadToHead) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} vs {}", h.a, h.b);
    for m in &h.metrics {
        let mark = match m.winner {
            Winner::A => h.a.as_str(),
            Winner::B => h.b.as_str(),
            Winner::Even => "even",
        };
        let _ = writeln!(
            out,
            "  {:<18} {:>10.2} {:>10.2} {:>+8.1}%  {}",
            m.metric.name(),
            m.a,
            m.b,
            m.difference_percent,
            mark
        );
    }
    let verdict = match h.verdict {
        Winner::A => format!("{} wins {}-{}", h.a, h.a_wins, h.b_wins),
        Winner::B => format!("{} wins {}-{}", h.b, h.b_wins, h.a_wins),
        Winner::Even => format!("even {}-{}", h.a_wins, h.b_wins),
    };
    let _ = write!(out, "Verdict: {verdict}");
    out
}

pub fn format_advice(advice: &[Advice]) -> String {
    if advice.is_empty() {
        return "  None".to_string();
    }
    advice
        .iter()
        .map(|a| {
            let sev = match a.severity {
                AdviceSeverity::Info => "INFO",
                AdviceSeverity::Tip => "TIP",
                AdviceSeverity::Highlight => "BEST",
            };
            format!("  [{}] {}", sev, a.summary)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_timeline(t: &TimelineResult) -> String {
    format!(
        "{:.1}s window: {} shot(s), {} reload(s), {:.2} total damage, {:.2} DPS",
        t.window_sec,
        t.shots_fired(),
        t.reloads,
        t.total_damage,
        t.window_dps
    )
}

pub fn format_legacy(l: &LegacyBreakdown) -> String {
    let level = l
        .enemy_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{} - {} ({})",
        l.build.as_deref().unwrap_or("custom"),
        l.weapon,
        l.grade.korean()
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Enemy level {} (defense {})", level, l.enemy_defense);
    let _ = writeln!(out, "Attack speed {:.2}/s", l.attack_speed);
    let _ = writeln!(out, "  base damage      {:>10.0}", l.base_damage);
    let _ = writeln!(out, "  normal hit       {:>10.0}", l.normal_damage);
    let _ = writeln!(
        out,
        "  critical hit     {:>10.0}  (rate {:.0}%)",
        l.crit_damage, l.crit_rate
    );
    let _ = writeln!(out, "  average          {:>10.0}", l.average_damage);
    let _ = writeln!(out, "  penetration      {:>10.0}", l.armor_penetration);
    let _ = writeln!(out, "  final damage     {:>10.0}", l.final_damage);
    let _ = writeln!(out, "  DPS              {:>10.0}", l.dps);
    out.push_str(RULE);
    out
}

pub fn format_diff(d: &RunDiff) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Builds added: {}", d.added.len());
    for name in &d.added {
        let _ = writeln!(out, "  + {name}");
    }
    let _ = writeln!(out, "Builds removed: {}", d.removed.len());
    for name in &d.removed {
        let _ = writeln!(out, "  - {name}");
    }
    let _ = write!(out, "Common builds: {}", d.common);
    if !d.regressions.is_empty() {
        let _ = write!(out, "\nBurst DPS regressions (dropped >5%):");
        for r in &d.regressions {
            let _ = write!(
                out,
                "\n  {}  {:.2} -> {:.2}",
                r.build, r.dps_before, r.dps_after
            );
        }
    }
    out
}

pub fn write_json_report<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// `rank` keeps labels that slug to the same text on separate pages.
fn page_name(rank: usize, b: &DamageBreakdown) -> String {
    let slug: String = lookup_key(b.label())
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("build_{}_{slug}.html", rank + 1)
}

/// Index page plus one page per build.
pub fn write_html_report(results: &[DamageBreakdown], out_dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("index.html"), render_index(results))?;
    for (i, b) in results.iter().enumerate() {
        fs::write(out_dir.join(page_name(i, b)), render_build_page(b))?;
    }
    Ok(())
}

fn render_index(results: &[DamageBreakdown]) -> String {
    let rows: String = results
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                r#"<tr><td>{}</td><td><a href="{}">{}</a></td><td>{}</td><td>{:.2}</td><td>{:.2}</td></tr>"#,
                i + 1,
                html_escape(&page_name(i, b)),
                html_escape(b.label()),
                html_escape(&b.weapon),
                b.burst_dps,
                b.sustained_dps
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head><meta charset="utf-8"><title>Build DPS Ranking</title>
<style>body{{font-family:system-ui,sans-serif;margin:1rem;}} table{{border-collapse:collapse;}} th,td{{border:1px solid #ccc;padding:6px;}} a{{color:#06c;}}</style>
</head>
<body>
<h1>Build DPS Ranking</h1>
<input type="text" id="search" placeholder="Search build or weapon…" style="margin-bottom:8px;">
<table><thead><tr><th>#</th><th>Build</th><th>Weapon</th><th>Burst DPS</th><th>Sustained DPS</th></tr></thead>
<tbody>{}</tbody>
</table>
<script>
document.getElementById('search').oninput=function(){{
 var q=this.value.toLowerCase(), rows=document.querySelectorAll('tbody tr');
 rows.forEach(function(r){{
   r.style.display=r.textContent.toLowerCase().indexOf(q)===-1?'none':'';
 }});
}};
</script>
</body>
</html>"#,
        rows
    )
}

fn render_build_page(b: &DamageBreakdown) -> String {
    let rows: String = [
        ("Base damage", b.base_damage),
        ("Normal hit", b.normal_hit),
        ("Critical hit", b.critical_hit),
        ("Effective defense", b.effective_defense),
        ("Final normal", b.final_normal),
        ("Final critical", b.final_critical),
        ("Average per shot", b.average_per_shot),
        ("Burst DPS", b.burst_dps),
        ("Sustained DPS", b.sustained_dps),
        ("Magazine damage", b.magazine_damage),
    ]
    .iter()
    .map(|(k, v)| format!("<tr><td>{}</td><td>{:.2}</td></tr>", k, v))
    .collect();
    let advice: String = crate::advice::tactical_advice(b)
        .into_iter()
        .chain(crate::advice::improvement_tips(b))
        .map(|a| format!("<li>{}</li>", html_escape(&a.summary)))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head><meta charset="utf-8"><title>{}</title>
<style>body{{font-family:system-ui,sans-serif;margin:1rem;}} table{{border-collapse:collapse;}} th,td{{border:1px solid #ccc;padding:6px;}} a{{color:#06c;}}</style>
</head>
<body>
<h1>{}</h1>
<p><a href="index.html">Back to ranking</a></p>
<p>Weapon: {} &middot; Enemy: {}</p>
<table><tbody>{}</tbody></table>
<h2>Advice</h2>
<ul>{}</ul>
</body>
</html>"#,
        html_escape(b.label()),
        html_escape(b.label()),
        html_escape(&b.weapon),
        html_escape(&encounter_line(b)),
        rows,
        advice
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
