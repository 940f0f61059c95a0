//! Error kinds: calculation errors callers branch on, and application errors for I/O layers.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// What kind of catalog entry failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Build,
    Weapon,
    LegacyBuild,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Build => "build",
            EntryKind::Weapon => "weapon",
            EntryKind::LegacyBuild => "legacy build",
        };
        f.write_str(s)
    }
}

/// Errors produced by the formula engine, the catalog and the analysis helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Malformed input: negative stat, out-of-range percentage, bad weapon definition.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// Requested build or weapon is not in the catalog.
    #[error("{kind} not found: \"{name}\"{}", format_suggestions(.suggestions))]
    NotFound {
        kind: EntryKind,
        name: String,
        suggestions: Vec<String>,
    },
    /// Catalog has no entries of the requested kind at all.
    #[error("catalog has no {0} entries")]
    EmptyCatalog(EntryKind),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl CalcError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag for embedding layers (HTTP API, bots).
    pub fn kind_tag(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "validation",
            CalcError::NotFound { .. } => "not_found",
            CalcError::EmptyCatalog(_) => "empty_catalog",
        }
    }
}

/// Application-level error for config loading, reports, the snapshot store and the CLI.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no runs stored in {0}")]
    NoRuns(std::path::PathBuf),
}

pub type Result<T, E = CalcError> = std::result::Result<T, E>;
