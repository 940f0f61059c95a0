//! CLI integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn buildcalc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildcalc"))
        .args(args)
        .output()
        .expect("run buildcalc")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

#[test]
fn builds_lists_the_catalog() {
    let out = buildcalc(&["builds"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("크리티컬 스나이퍼"));
    assert!(text.contains("AK 관통 빌드"));
}

#[test]
fn calc_json_with_custom_config() {
    let config = fixtures_dir().join("custom_builds.toml");
    let out = buildcalc(&[
        "--config",
        config.to_str().unwrap(),
        "calc",
        "Test Build",
        "--defense",
        "0",
        "--json",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).expect("json output");
    assert_eq!(v["build"], "Test Build");
    assert!((v["base_damage"].as_f64().unwrap() - 150.0).abs() < 1e-9);
    assert!((v["burst_dps"].as_f64().unwrap() - 1500.0).abs() < 1e-9);
    assert!((v["sustained_dps"].as_f64().unwrap() - 865.3846).abs() < 1e-3);
}

#[test]
fn config_level_convention_applies() {
    let config = fixtures_dir().join("custom_builds.toml");
    let out = buildcalc(&["--config", config.to_str().unwrap(), "calc", "Test Build", "--json"]);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(v["encounter"]["enemy_level"], 10);
    assert_eq!(v["encounter"]["defense"], 20);
}

#[test]
fn unknown_build_fails() {
    let out = buildcalc(&["calc", "이 이름은 존재하지 않음", "--level", "25"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("이 이름은 존재하지 않음"));
}

#[test]
fn level_out_of_range_fails() {
    let out = buildcalc(&["calc", "AK 관통 빌드", "--level", "101"]);
    assert!(!out.status.success());
}

#[test]
fn compare_and_versus() {
    let out = buildcalc(&["compare", "AK 관통 빌드", "크리티컬 스나이퍼", "--level", "30"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("AK 관통 빌드") && text.contains("크리티컬 스나이퍼"));

    let out = buildcalc(&["versus", "AK 관통 빌드", "크리티컬 스나이퍼"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Verdict"));
    assert!(text.contains("PvP pick: 크리티컬 스나이퍼"));
}

#[test]
fn stats_recommend_timeline_legacy() {
    assert!(buildcalc(&["stats", "--metric", "dps"]).status.success());
    assert!(!buildcalc(&["stats", "--metric", "luck"]).status.success());
    let out = buildcalc(&["recommend", "근거리"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Recommended:"));
    let out = buildcalc(&["timeline", "AK 관통 빌드", "--seconds", "10"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("10.0s window"));
    let out = buildcalc(&["legacy"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 5);
}

#[test]
fn report_writes_json_and_html() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = buildcalc(&["report", "--out", dir.path().to_str().unwrap()]);
    assert!(out.status.success());
    assert!(dir.path().join("report.json").exists());
    assert!(dir.path().join("html").join("index.html").exists());
}

#[test]
fn snapshot_then_diff() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_a = dir.path().join("a.sqlite");
    let db_b = dir.path().join("b.sqlite");
    let config = fixtures_dir().join("custom_builds.toml");
    assert!(buildcalc(&["snapshot", "--db", db_a.to_str().unwrap(), "--level", "20"])
        .status
        .success());
    assert!(buildcalc(&[
        "--config",
        config.to_str().unwrap(),
        "snapshot",
        "--db",
        db_b.to_str().unwrap(),
        "--level",
        "20",
    ])
    .status
    .success());

    let out_dir = dir.path().join("diff");
    let out = buildcalc(&[
        "diff",
        "--a",
        db_a.to_str().unwrap(),
        "--b",
        db_b.to_str().unwrap(),
        "--out",
        out_dir.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("+ Test Build"));
    let diff: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out_dir.join("diff.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(diff["added"][0], "Test Build");
}

#[test]
fn diff_of_empty_db_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let empty = dir.path().join("empty.sqlite");
    let out = buildcalc(&[
        "diff",
        "--a",
        empty.to_str().unwrap(),
        "--b",
        empty.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
}
