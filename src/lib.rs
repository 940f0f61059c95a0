//! Build Damage/DPS Calculator: library entry point.
//!
//! Exposes the formula engine, build catalog, analysis, advice, cache, store
//! and report layers for use by the CLI, the HTTP API and tests.

pub mod advice;
pub mod analysis;
pub mod cache;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formula;
pub mod model;
pub mod report;
#[cfg(feature = "serve")]
pub mod server;
pub mod store;
pub mod timeline;
pub mod util;

pub use calculator::Calculator;
pub use error::{CalcError, Error};
