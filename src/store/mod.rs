//! SQLite persistence for calculation snapshots and diffs between them.

use crate::config::REGRESSION_THRESHOLD;
use crate::error::Error;
use crate::model::DamageBreakdown;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    enemy_level INTEGER,
    enemy_defense INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS run_builds (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    build_name TEXT NOT NULL,
    breakdown_json TEXT NOT NULL,
    PRIMARY KEY (run_id, build_name)
);

CREATE INDEX IF NOT EXISTS idx_run_builds_run ON run_builds(run_id);
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    pub id: i64,
    pub label: String,
    pub enemy_level: Option<u32>,
    pub enemy_defense: u32,
    pub created_at: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    #[cfg(test)]
    fn in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Store one snapshot; breakdowns are keyed by their label, so names must be distinct.
    pub fn insert_run(
        &mut self,
        label: &str,
        enemy_level: Option<u32>,
        enemy_defense: u32,
        results: &[DamageBreakdown],
    ) -> Result<i64, Error> {
        let now: DateTime<Utc> = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO runs (label, enemy_level, enemy_defense, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![label, enemy_level, enemy_defense, now.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO run_builds (run_id, build_name, breakdown_json) VALUES (?1, ?2, ?3)",
            )?;
            for b in results {
                let json = serde_json::to_string(b)?;
                stmt.execute(params![id, b.label(), json])?;
            }
        }
        tx.commit()?;
        tracing::debug!(run = id, builds = results.len(), "stored run");
        Ok(id)
    }

    /// Newest first.
    pub fn list_runs(&self) -> Result<Vec<RunInfo>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, enemy_level, enemy_defense, created_at FROM runs ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(RunInfo {
                id: r.get(0)?,
                label: r.get(1)?,
                enemy_level: r.get(2)?,
                enemy_defense: r.get(3)?,
                created_at: r.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn latest_run(&self) -> Result<Option<RunInfo>, Error> {
        Ok(self.list_runs()?.into_iter().next())
    }

    pub fn get_run_breakdowns(&self, run_id: i64) -> Result<Vec<DamageBreakdown>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT breakdown_json FROM run_builds WHERE run_id = ?1 ORDER BY build_name",
        )?;
        let rows = stmt.query_map(params![run_id], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            let json = row?;
            out.push(serde_json::from_str(&json)?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Regression {
    pub build: String,
    pub dps_before: f64,
    pub dps_after: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub common: usize,
    /// Builds whose burst DPS dropped by more than the regression threshold.
    pub regressions: Vec<Regression>,
}

/// Compare two snapshots by build label. Output lists are sorted by name.
pub fn diff_runs(before: &[DamageBreakdown], after: &[DamageBreakdown]) -> RunDiff {
    let a: BTreeMap<&str, &DamageBreakdown> = before.iter().map(|b| (b.label(), b)).collect();
    let b: BTreeMap<&str, &DamageBreakdown> = after.iter().map(|b| (b.label(), b)).collect();
    let mut diff = RunDiff::default();
    for (name, old) in &a {
        match b.get(name) {
            None => diff.removed.push(name.to_string()),
            Some(new) => {
                diff.common += 1;
                if new.burst_dps < old.burst_dps * (1.0 - REGRESSION_THRESHOLD) {
                    tracing::warn!(
                        build = *name,
                        before = old.burst_dps,
                        after = new.burst_dps,
                        "burst DPS regression"
                    );
                    diff.regressions.push(Regression {
                        build: name.to_string(),
                        dps_before: old.burst_dps,
                        dps_after: new.burst_dps,
                    });
                }
            }
        }
    }
    diff.added = b
        .keys()
        .filter(|name| !a.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    diff
}
