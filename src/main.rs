//! Build Damage/DPS Calculator: CLI.

use buildcalc::calculator::Calculator;
use buildcalc::config::{CalcConfig, DEFAULT_TIMELINE_SECONDS};
use buildcalc::error::Error;
use buildcalc::formula::legacy::LegacyModifiers;
use buildcalc::model::{EncounterContext, Playstyle};
use buildcalc::report::{
    format_advice, format_breakdown, format_diff, format_head_to_head, format_legacy,
    format_popularity, format_ranking, format_statistics, format_timeline, write_html_report,
    write_json_report,
};
use buildcalc::store::{diff_runs, Store};
use buildcalc::util::init_logging;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "buildcalc")]
#[command(about = "Build Damage/DPS Calculator (Formula Engine + Build Comparison)")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with extra weapons/builds and calculator settings.
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog builds.
    Builds,
    /// List catalog weapons.
    Weapons,
    /// Full damage breakdown for one build.
    Calc {
        build: String,
        /// Enemy level (1-100); defense derives from it.
        #[arg(long)]
        level: Option<u32>,
        /// Raw enemy defense; overrides --level.
        #[arg(long)]
        defense: Option<u32>,
        #[arg(long)]
        headshot: bool,
        #[arg(long)]
        weak_point: bool,
        /// Print the breakdown as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Rank builds by DPS (all builds when none are given).
    Compare {
        builds: Vec<String>,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Statistics of one metric over all builds.
    Stats {
        #[arg(long)]
        level: Option<u32>,
        #[arg(long, default_value = "burst_dps")]
        metric: String,
    },
    /// Head-to-head comparison of two builds.
    Versus {
        a: String,
        b: String,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Best builds for a playstyle (ranged, melee, balanced, firepower, speed).
    Recommend {
        playstyle: String,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Fire a build for a fixed window, reloads included.
    Timeline {
        build: String,
        #[arg(long, default_value_t = DEFAULT_TIMELINE_SECONDS)]
        seconds: f64,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Legacy stat-additive calculator (all legacy builds when none is given).
    Legacy {
        build: Option<String>,
        #[arg(long)]
        level: Option<u32>,
        /// Extra armor penetration on top of the build's own.
        #[arg(long, default_value_t = 0.0)]
        armor_pen: f64,
        /// Final damage multiplier.
        #[arg(long, default_value_t = 1.0)]
        buff: f64,
    },
    /// Write JSON and HTML reports for all builds.
    Report {
        #[arg(long, value_name = "DIR", default_value = "out")]
        out: PathBuf,
        #[arg(long)]
        level: Option<u32>,
    },
    /// Store all builds' breakdowns as a run in a SQLite database.
    Snapshot {
        #[arg(long, value_name = "DB")]
        db: PathBuf,
        #[arg(long)]
        level: Option<u32>,
        #[arg(long, default_value = "snapshot")]
        label: String,
    },
    /// Compare the latest runs of two databases (e.g. before/after a balance patch).
    Diff {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Serve the HTTP JSON API.
    #[cfg(feature = "serve")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => CalcConfig::load(path)?,
        None => CalcConfig::default(),
    };
    let calc = Calculator::from_config(&cfg)?;
    let level = |l: Option<u32>| l.unwrap_or(cfg.default_enemy_level);

    match cli.command {
        Commands::Builds => run_builds(&calc),
        Commands::Weapons => run_weapons(&calc),
        Commands::Calc {
            build,
            level: lvl,
            defense,
            headshot,
            weak_point,
            json,
        } => {
            let encounter = match defense {
                Some(d) => EncounterContext::with_defense(d),
                None => calc.encounter(level(lvl))?,
            }
            .headshot(headshot)
            .weak_point(weak_point);
            run_calc(&calc, &build, &encounter, json)
        }
        Commands::Compare { builds, level: lvl } => run_compare(&calc, &builds, level(lvl)),
        Commands::Stats { level: lvl, metric } => run_stats(&calc, level(lvl), &metric),
        Commands::Versus { a, b, level: lvl } => run_versus(&calc, &a, &b, level(lvl)),
        Commands::Recommend {
            playstyle,
            level: lvl,
        } => run_recommend(&calc, &playstyle, level(lvl)),
        Commands::Timeline {
            build,
            seconds,
            level: lvl,
        } => run_timeline(&calc, &build, level(lvl), seconds),
        Commands::Legacy {
            build,
            level: lvl,
            armor_pen,
            buff,
        } => run_legacy(
            &calc,
            build.as_deref(),
            level(lvl),
            &LegacyModifiers { armor_pen, buff },
        ),
        Commands::Report { out, level: lvl } => run_report(&calc, &out, level(lvl)),
        Commands::Snapshot {
            db,
            level: lvl,
            label,
        } => run_snapshot(&calc, &db, level(lvl), &label),
        Commands::Diff { a, b, out } => run_diff(&a, &b, out.as_deref()),
        #[cfg(feature = "serve")]
        Commands::Serve { addr } => run_serve(calc, &cfg, &addr),
    }
}

fn run_builds(calc: &Calculator) -> Result<(), Error> {
    for b in calc.catalog().builds() {
        println!("{}  [{}]  {}", b.name, b.weapon, b.description);
    }
    Ok(())
}

fn run_weapons(calc: &Calculator) -> Result<(), Error> {
    for w in calc.catalog().weapons() {
        println!(
            "{}  damage={}  rate={}/s  magazine={}  reload={}s",
            w.name, w.base_damage, w.fire_rate, w.magazine, w.reload_time
        );
    }
    Ok(())
}

fn run_calc(
    calc: &Calculator,
    build: &str,
    encounter: &EncounterContext,
    json: bool,
) -> Result<(), Error> {
    let b = calc.evaluate_build(build, encounter)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&b)?);
        return Ok(());
    }
    println!("{}", format_breakdown(&b));
    println!("\nAdvice:");
    println!("{}", format_advice(&buildcalc::advice::tactical_advice(&b)));
    println!("\nTips:");
    println!("{}", format_advice(&buildcalc::advice::improvement_tips(&b)));
    Ok(())
}

fn run_compare(calc: &Calculator, builds: &[String], level: u32) -> Result<(), Error> {
    let results = if builds.is_empty() {
        calc.compare_all(level)?
    } else {
        calc.compare_builds(builds, level)?
    };
    println!("Enemy level {}", level);
    println!("{}", format_ranking(&results));
    Ok(())
}

fn run_stats(calc: &Calculator, level: u32, metric: &str) -> Result<(), Error> {
    let stats = calc.build_statistics(level, metric.parse()?)?;
    println!("{}", format_statistics(stats.metric, &stats.statistics));
    println!("\nWeapons in use:");
    println!("{}", format_popularity(&stats.weapon_popularity));
    Ok(())
}

fn run_versus(calc: &Calculator, a: &str, b: &str, level: u32) -> Result<(), Error> {
    let m = calc.head_to_head(a, b, level)?;
    println!("{}", format_head_to_head(&m.comparison));
    println!("PvE pick: {}", m.picks.pve);
    println!("PvP pick: {}", m.picks.pvp);
    Ok(())
}

fn run_recommend(calc: &Calculator, playstyle: &str, level: u32) -> Result<(), Error> {
    let style: Playstyle = playstyle.parse()?;
    let rec = calc.recommend(style, level)?;
    println!("Playstyle: {} ({})", style, style.korean());
    println!("{}", format_ranking(&rec.ranked));
    if let Some(best) = rec.best() {
        println!("\nRecommended: {}", best.label());
    }
    Ok(())
}

fn run_timeline(calc: &Calculator, build: &str, level: u32, seconds: f64) -> Result<(), Error> {
    let sim = calc.simulate(build, level, seconds)?;
    println!("{}", format_timeline(&sim.timeline));
    println!(
        "Burst DPS {:.2} (headshot {:.2}), sustained DPS {:.2}",
        sim.body.burst_dps, sim.headshot.burst_dps, sim.body.sustained_dps
    );
    println!("\nAdvice:");
    println!("{}", format_advice(&sim.advice));
    println!("\nTips:");
    println!("{}", format_advice(&sim.tips));
    Ok(())
}

fn run_legacy(
    calc: &Calculator,
    build: Option<&str>,
    level: u32,
    modifiers: &LegacyModifiers,
) -> Result<(), Error> {
    match build {
        Some(name) => println!("{}", format_legacy(&calc.analyze_legacy(name, level, modifiers)?)),
        None => {
            for (i, r) in calc.compare_legacy(level)?.iter().enumerate() {
                println!(
                    "{:>2}. {}  final={:.0}  dps={:.0}",
                    i + 1,
                    r.build.as_deref().unwrap_or(""),
                    r.final_damage,
                    r.dps
                );
            }
        }
    }
    Ok(())
}

fn run_report(calc: &Calculator, out: &Path, level: u32) -> Result<(), Error> {
    let results = calc.compare_all(level)?;
    fs::create_dir_all(out)?;
    let json_path = out.join("report.json");
    write_json_report(&results, &json_path)?;
    let html_dir = out.join("html");
    write_html_report(&results, &html_dir)?;
    tracing::info!("wrote {} and {}", json_path.display(), html_dir.display());
    Ok(())
}

fn run_snapshot(calc: &Calculator, db: &Path, level: u32, label: &str) -> Result<(), Error> {
    let encounter = calc.encounter(level)?;
    let results = calc.compare_all(level)?;
    let mut store = Store::open(db)?;
    let id = store.insert_run(label, encounter.enemy_level, encounter.defense, &results)?;
    tracing::info!("stored run {} with {} builds", id, results.len());
    Ok(())
}

fn run_diff(a: &Path, b: &Path, out: Option<&Path>) -> Result<(), Error> {
    let latest = |path: &Path| -> Result<_, Error> {
        let store = Store::open(path)?;
        let run = store
            .latest_run()?
            .ok_or_else(|| Error::NoRuns(path.to_path_buf()))?;
        store.get_run_breakdowns(run.id)
    };
    let diff = diff_runs(&latest(a)?, &latest(b)?);
    println!("Diff: {} vs {}", a.display(), b.display());
    println!("{}", format_diff(&diff));

    if let Some(dir) = out {
        fs::create_dir_all(dir)?;
        let path = dir.join("diff.json");
        write_json_report(&diff, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "serve")]
fn run_serve(calc: Calculator, cfg: &CalcConfig, addr: &str) -> Result<(), Error> {
    use buildcalc::cache::DamageCache;
    use buildcalc::server::{serve, AppState};
    use std::sync::Arc;
    use std::time::Duration;

    let state = AppState {
        calc: Arc::new(calc),
        cache: Arc::new(DamageCache::new(Duration::from_secs(cfg.cache_ttl_secs))),
        default_level: cfg.default_enemy_level,
    };
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(serve(addr, state))
}
