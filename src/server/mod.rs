//! HTTP JSON API over the calculator (feature `serve`).

use crate::analysis::Metric;
use crate::cache::DamageCache;
use crate::calculator::{BuildStatistics, Calculator};
use crate::error::{CalcError, Error};
use crate::model::DamageBreakdown;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub struct AppError {
    pub error: CalcError,
    pub status_code: StatusCode,
}

impl AppError {
    pub fn status_for(error: &CalcError) -> StatusCode {
        match error {
            CalcError::Validation { .. } => StatusCode::BAD_REQUEST,
            CalcError::NotFound { .. } => StatusCode::NOT_FOUND,
            CalcError::EmptyCatalog(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.error.kind_tag(),
            "message": self.error.to_string(),
        });
        (self.status_code, Json(body)).into_response()
    }
}

impl From<CalcError> for AppError {
    fn from(error: CalcError) -> Self {
        Self {
            status_code: Self::status_for(&error),
            error,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub calc: Arc<Calculator>,
    pub cache: Arc<DamageCache>,
    pub default_level: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuildQuery {
    pub level: Option<u32>,
    #[serde(default)]
    pub headshot: bool,
    #[serde(default)]
    pub weak_point: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    /// Comma-separated build names; all builds when absent.
    pub builds: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub level: Option<u32>,
    pub metric: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/builds", get(list_builds))
        .route("/builds/:name", get(get_build))
        .route("/weapons", get(list_weapons))
        .route("/compare", get(compare))
        .route("/stats", get(stats))
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn list_builds(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.calc.list_available_builds())
}

async fn list_weapons(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.calc.catalog().list_weapon_names())
}

async fn get_build(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<BuildQuery>,
) -> Result<Json<DamageBreakdown>, AppError> {
    let level = q.level.unwrap_or(state.default_level);
    let b = state
        .calc
        .compute_damage_cached(&state.cache, &name, level, q.headshot, q.weak_point)?;
    Ok(Json(b))
}

async fn compare(
    State(state): State<AppState>,
    Query(q): Query<CompareQuery>,
) -> Result<Json<Vec<DamageBreakdown>>, AppError> {
    let level = q.level.unwrap_or(state.default_level);
    let results = match q.builds.as_deref() {
        Some(list) => {
            let names: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            state.calc.compare_builds(&names, level)?
        }
        None => state.calc.compare_all(level)?,
    };
    Ok(Json(results))
}

async fn stats(
    State(state): State<AppState>,
    Query(q): Query<StatsQuery>,
) -> Result<Json<BuildStatistics>, AppError> {
    let metric = match q.metric.as_deref() {
        Some(m) => m.parse::<Metric>()?,
        None => Metric::BurstDps,
    };
    let level = q.level.unwrap_or(state.default_level);
    Ok(Json(state.calc.build_statistics(level, metric)?))
}
