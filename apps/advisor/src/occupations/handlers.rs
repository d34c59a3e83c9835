use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::occupations::{rank_occupations, RankedOccupation, RankingOptions, RankingWeights, RawJobRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub jobs: Vec<RawJobRecord>,
    #[serde(default)]
    pub weights: Option<RankingWeights>,
    #[serde(default)]
    pub max_experience_years: Option<u32>,
    /// Reference date for recency. Defaults to today (UTC).
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub occupations: Vec<RankedOccupation>,
}

/// Request overrides on top of the configured ranking options.
pub fn resolve_options(
    defaults: &RankingOptions,
    weights: Option<RankingWeights>,
    max_experience_years: Option<u32>,
) -> RankingOptions {
    RankingOptions {
        weights: weights.unwrap_or(defaults.weights),
        max_experience_years: max_experience_years.unwrap_or(defaults.max_experience_years),
    }
}

/// POST /api/v1/occupations/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let options = resolve_options(&state.config.ranking, req.weights, req.max_experience_years);
    let today = req.today.unwrap_or_else(|| Utc::now().date_naive());

    let occupations = rank_occupations(&req.jobs, &options, today)?;
    info!(
        "Ranked {} occupations from {} job records",
        occupations.len(),
        req.jobs.len()
    );
    Ok(Json(RankResponse { occupations }))
}
