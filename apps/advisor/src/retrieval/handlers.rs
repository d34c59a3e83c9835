use std::collections::{BTreeSet, HashSet};

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::occupations::handlers::resolve_options;
use crate::occupations::{rank_occupations, RankedOccupation, RankingWeights, RawJobRecord};
use crate::planning::models::{CandidateModule, ScheduleRequest, Season, SemesterPlan};
use crate::planning::scheduler::schedule;
use crate::retrieval::models::{CatalogModule, RetrievalStrategy, StrategyContext, StudentPreferences};
use crate::retrieval::strategy::retrieve_candidates;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdviseRequest {
    #[serde(default)]
    pub jobs: Vec<RawJobRecord>,
    #[serde(default)]
    pub desired_occupations: Vec<String>,
    #[serde(default)]
    pub preferences: StudentPreferences,
    #[serde(default)]
    pub strategy: RetrievalStrategy,
    #[serde(default)]
    pub taken_modules: BTreeSet<String>,
    pub total_semesters: u32,
    #[serde(default)]
    pub first_season: Option<Season>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub weights: Option<RankingWeights>,
    #[serde(default)]
    pub max_experience_years: Option<u32>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct AdviseResponse {
    pub request_id: Uuid,
    pub strategy: RetrievalStrategy,
    pub ranked_occupations: Vec<RankedOccupation>,
    pub candidate_modules: Vec<CandidateModule>,
    pub plan: SemesterPlan,
}

/// POST /api/v1/plans/advise
///
/// Rank → retrieve → schedule in one call.
pub async fn handle_advise(
    State(state): State<AppState>,
    Json(req): Json<AdviseRequest>,
) -> Result<Json<AdviseResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let source = &state.module_source;

    let options = resolve_options(&state.config.ranking, req.weights, req.max_experience_years);
    let today = req.today.unwrap_or_else(|| Utc::now().date_naive());
    let ranked_occupations = rank_occupations(&req.jobs, &options, today)?;

    let past_titles: Vec<String> = ranked_occupations.iter().map(|o| o.title.clone()).collect();
    let past_matches = source.modules_for_occupations(&past_titles).await?;
    let goal_matches = source
        .modules_for_occupations(&req.desired_occupations)
        .await?;
    let catalog = source.catalog().await?;
    let thesis_sequence = source.thesis_sequence().await?;
    let thesis_titles: Vec<String> = thesis_sequence.iter().map(|m| m.title.clone()).collect();

    let ctx = StrategyContext {
        ranked_occupations: &ranked_occupations,
        past_matches: &past_matches,
        goal_matches: &goal_matches,
        catalog: &catalog,
        preferences: &req.preferences,
        taken_modules: &req.taken_modules,
        thesis_titles: &thesis_titles,
        weights: &state.config.balanced,
    };
    let candidate_modules = retrieve_candidates(req.strategy, &ctx);
    let pool = with_catalog_backfill(&candidate_modules, &catalog, &ctx);

    let request = ScheduleRequest {
        ranked_modules: pool,
        thesis_sequence,
        taken_modules: req.taken_modules.clone(),
        total_semesters: req.total_semesters,
        first_season: req.first_season.unwrap_or(state.config.first_season),
        start_year: req.start_year,
    };
    let plan = schedule(&request, &state.config.planner)?;

    info!(
        "[{request_id}] strategy={} occupations={} candidates={} scheduled_credits={}",
        req.strategy,
        ranked_occupations.len(),
        candidate_modules.len(),
        plan.credits.scheduled_credits
    );

    Ok(Json(AdviseResponse {
        request_id,
        strategy: req.strategy,
        ranked_occupations,
        candidate_modules,
        plan,
    }))
}

/// Strategy picks first, then the rest of the catalog in catalog order so
/// the scheduler can fill semesters the strategy left short.
fn with_catalog_backfill(
    candidates: &[CandidateModule],
    catalog: &[CatalogModule],
    ctx: &StrategyContext<'_>,
) -> Vec<CandidateModule> {
    let picked: HashSet<&str> = candidates.iter().map(|m| m.title.as_str()).collect();
    let backfill = catalog
        .iter()
        .map(|m| &m.module)
        .filter(|m| !picked.contains(m.title.as_str()) && !ctx.is_excluded(&m.title))
        .cloned();
    candidates.iter().cloned().chain(backfill).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::models::ModuleType;
    use crate::retrieval::models::BalancedWeights;

    fn make_catalog_module(title: &str) -> CatalogModule {
        CatalogModule {
            module: CandidateModule {
                title: title.to_string(),
                module_type: ModuleType::Elective,
                season: Season::Spring,
                credits: 6,
                description: String::new(),
                relevance_score: None,
            },
            lecturers: vec![],
            teaching_days: vec![],
            assessment_type: None,
            oral_assessment: false,
            project_work: false,
            supported_occupations: vec![],
        }
    }

    #[test]
    fn test_backfill_appends_unpicked_catalog_modules() {
        let catalog = vec![
            make_catalog_module("A"),
            make_catalog_module("B"),
            make_catalog_module("Taken"),
            make_catalog_module("C"),
        ];
        let taken: BTreeSet<String> = ["Taken".to_string()].into_iter().collect();
        let prefs = StudentPreferences::default();
        let weights = BalancedWeights::default();
        let ctx = StrategyContext {
            ranked_occupations: &[],
            past_matches: &[],
            goal_matches: &[],
            catalog: &catalog,
            preferences: &prefs,
            taken_modules: &taken,
            thesis_titles: &[],
            weights: &weights,
        };
        let picked = vec![catalog[3].module.clone()];

        let pool = with_catalog_backfill(&picked, &catalog, &ctx);
        let titles: Vec<&str> = pool.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }
}
