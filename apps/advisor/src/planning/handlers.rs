use std::collections::BTreeSet;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::planning::models::{CandidateModule, ScheduleRequest, Season, SemesterPlan};
use crate::planning::scheduler::schedule;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
    pub ranked_modules: Vec<CandidateModule>,
    /// Omitted means the module source's thesis sequence.
    #[serde(default)]
    pub thesis_sequence: Option<Vec<CandidateModule>>,
    #[serde(default)]
    pub taken_modules: BTreeSet<String>,
    pub total_semesters: u32,
    #[serde(default)]
    pub first_season: Option<Season>,
    #[serde(default)]
    pub start_year: Option<i32>,
}

/// POST /api/v1/plans/schedule
pub async fn handle_schedule(
    State(state): State<AppState>,
    Json(body): Json<ScheduleBody>,
) -> Result<Json<SemesterPlan>, AppError> {
    let thesis_sequence = match body.thesis_sequence {
        Some(sequence) => sequence,
        None => state.module_source.thesis_sequence().await?,
    };

    let request = ScheduleRequest {
        ranked_modules: body.ranked_modules,
        thesis_sequence,
        taken_modules: body.taken_modules,
        total_semesters: body.total_semesters,
        first_season: body.first_season.unwrap_or(state.config.first_season),
        start_year: body.start_year,
    };

    let plan = schedule(&request, &state.config.planner)?;
    info!(
        "Scheduled {} credits over {} semesters",
        plan.credits.scheduled_credits,
        plan.semesters.len()
    );
    Ok(Json(plan))
}
