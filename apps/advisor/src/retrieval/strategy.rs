//! Candidate retrieval strategies.
//!
//! Each strategy is a pure function of a `StrategyContext` and returns the
//! candidate pool in the order the scheduler should consider it. Sorting is
//! stable, so equal scores keep the order the source produced them in.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::planning::models::CandidateModule;
use crate::retrieval::models::{
    CatalogModule, OccupationModuleMatch, RetrievalStrategy, StrategyContext, StudentPreferences,
};

/// Runs `strategy` against `ctx`.
pub fn retrieve_candidates(
    strategy: RetrievalStrategy,
    ctx: &StrategyContext<'_>,
) -> Vec<CandidateModule> {
    let candidates = match strategy {
        RetrievalStrategy::PastExperience => by_past_experience(ctx),
        RetrievalStrategy::FutureGoals => by_future_goals(ctx),
        RetrievalStrategy::Preferences => by_preferences(ctx),
        RetrievalStrategy::Balanced => balanced(ctx),
    };
    debug!("Strategy {} produced {} candidates", strategy, candidates.len());
    candidates
}

// ────────────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────────────

/// Modules matched to the work history, best-ranked occupation first.
fn by_past_experience(ctx: &StrategyContext<'_>) -> Vec<CandidateModule> {
    let scores = occupation_scores(ctx);
    let mut scored: Vec<(&OccupationModuleMatch, f64)> = ctx
        .past_matches
        .iter()
        .map(|m| (m, scores.get(m.occupation.as_str()).copied().unwrap_or(0.0)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    collect_unique(ctx, scored.into_iter().map(|(m, s)| (&m.module, Some(s))))
}

/// Modules matched to the desired occupations, in source order.
fn by_future_goals(ctx: &StrategyContext<'_>) -> Vec<CandidateModule> {
    collect_unique(ctx, ctx.goal_matches.iter().map(|m| (&m.module, None)))
}

/// Whole catalog ordered by how many stated preferences each module meets.
fn by_preferences(ctx: &StrategyContext<'_>) -> Vec<CandidateModule> {
    let mut scored: Vec<(&CatalogModule, f64)> = ctx
        .catalog
        .iter()
        .map(|m| (m, preference_score(m, ctx.preferences) as f64))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    collect_unique(ctx, scored.into_iter().map(|(m, s)| (&m.module, Some(s))))
}

/// `past score + goal_match_weight * goal matches + preferences / divisor`
/// over the whole catalog.
fn balanced(ctx: &StrategyContext<'_>) -> Vec<CandidateModule> {
    let scores = occupation_scores(ctx);

    let mut past: HashMap<&str, f64> = HashMap::new();
    for m in ctx.past_matches {
        let score = scores.get(m.occupation.as_str()).copied().unwrap_or(0.0);
        let entry = past.entry(m.module.title.as_str()).or_insert(0.0);
        *entry = entry.max(score);
    }

    let mut goal_hits: HashMap<&str, u32> = HashMap::new();
    for m in ctx.goal_matches {
        *goal_hits.entry(m.module.title.as_str()).or_insert(0) += 1;
    }

    let weights = ctx.weights;
    let mut scored: Vec<(&CatalogModule, f64)> = ctx
        .catalog
        .iter()
        .map(|m| {
            let title = m.module.title.as_str();
            let pref = preference_score(m, ctx.preferences) as f64;
            let score = past.get(title).copied().unwrap_or(0.0)
                + weights.goal_match_weight * goal_hits.get(title).copied().unwrap_or(0) as f64
                + pref / weights.preference_divisor;
            (m, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    collect_unique(ctx, scored.into_iter().map(|(m, s)| (&m.module, Some(s))))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn occupation_scores<'a>(ctx: &StrategyContext<'a>) -> HashMap<&'a str, f64> {
    ctx.ranked_occupations
        .iter()
        .map(|o| (o.title.as_str(), o.score))
        .collect()
}

/// Count of satisfied criteria among lecturer, days, assessment type, oral
/// assessment and project work (`0..=5`).
pub fn preference_score(module: &CatalogModule, prefs: &StudentPreferences) -> u32 {
    let lecturer = module.lecturers.iter().any(|l| {
        prefs
            .desired_lecturers
            .iter()
            .any(|d| d.eq_ignore_ascii_case(l))
    });
    let days = !module.teaching_days.is_empty()
        && !prefs.available_days.is_empty()
        && module.teaching_days.iter().all(|day| {
            prefs
                .available_days
                .iter()
                .any(|a| a.eq_ignore_ascii_case(day))
        });
    let assessment = match (&prefs.assessment_type, &module.assessment_type) {
        (Some(want), Some(has)) => want.eq_ignore_ascii_case(has),
        _ => false,
    };
    let oral = prefs.oral_assessment == Some(module.oral_assessment);
    let project = prefs.project_work == Some(module.project_work);

    [lecturer, days, assessment, oral, project]
        .into_iter()
        .filter(|hit| *hit)
        .count() as u32
}

/// Drops excluded and repeated titles, keeping the first occurrence.
fn collect_unique<'a>(
    ctx: &StrategyContext<'_>,
    modules: impl Iterator<Item = (&'a CandidateModule, Option<f64>)>,
) -> Vec<CandidateModule> {
    let mut seen = HashSet::new();
    modules
        .filter(|(m, _)| !ctx.is_excluded(&m.title) && seen.insert(m.title.clone()))
        .map(|(m, score)| CandidateModule {
            relevance_score: score.or(m.relevance_score),
            ..m.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupations::models::ScoreBreakdown;
    use crate::occupations::RankedOccupation;
    use crate::planning::models::{ModuleType, Season};
    use crate::retrieval::models::BalancedWeights;
    use std::collections::BTreeSet;

    fn make_module(title: &str) -> CandidateModule {
        CandidateModule {
            title: title.to_string(),
            module_type: ModuleType::Elective,
            season: Season::Spring,
            credits: 6,
            description: String::new(),
            relevance_score: None,
        }
    }

    fn make_match(occupation: &str, title: &str) -> OccupationModuleMatch {
        OccupationModuleMatch {
            occupation: occupation.to_string(),
            module: make_module(title),
            supported_skills: vec![],
        }
    }

    fn make_catalog_module(title: &str) -> CatalogModule {
        CatalogModule {
            module: make_module(title),
            lecturers: vec![],
            teaching_days: vec![],
            assessment_type: None,
            oral_assessment: false,
            project_work: false,
            supported_occupations: vec![],
        }
    }

    fn ranked(title: &str, score: f64) -> RankedOccupation {
        RankedOccupation {
            title: title.to_string(),
            score,
            breakdown: ScoreBreakdown {
                duration: 0.0,
                recency: 0.0,
                employment: 0.0,
            },
        }
    }

    struct Fixture {
        ranked: Vec<RankedOccupation>,
        past: Vec<OccupationModuleMatch>,
        goals: Vec<OccupationModuleMatch>,
        catalog: Vec<CatalogModule>,
        prefs: StudentPreferences,
        taken: BTreeSet<String>,
        thesis: Vec<String>,
        weights: BalancedWeights,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ranked: vec![ranked("Analyst", 0.4), ranked("Engineer", 0.9)],
                past: vec![
                    make_match("Analyst", "Statistics"),
                    make_match("Engineer", "Cloud Computing"),
                    make_match("Engineer", "Statistics"),
                ],
                goals: vec![
                    make_match("Data Scientist", "Machine Learning"),
                    make_match("Data Scientist", "Statistics"),
                ],
                catalog: vec![
                    make_catalog_module("Statistics"),
                    make_catalog_module("Cloud Computing"),
                    make_catalog_module("Machine Learning"),
                    make_catalog_module("Master Thesis"),
                ],
                prefs: StudentPreferences::default(),
                taken: BTreeSet::new(),
                thesis: vec!["Master Thesis".to_string()],
                weights: BalancedWeights::default(),
            }
        }

        fn ctx(&self) -> StrategyContext<'_> {
            StrategyContext {
                ranked_occupations: &self.ranked,
                past_matches: &self.past,
                goal_matches: &self.goals,
                catalog: &self.catalog,
                preferences: &self.prefs,
                taken_modules: &self.taken,
                thesis_titles: &self.thesis,
                weights: &self.weights,
            }
        }
    }

    fn titles(modules: &[CandidateModule]) -> Vec<&str> {
        modules.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_past_experience_orders_by_occupation_score() {
        let fx = Fixture::new();
        let result = retrieve_candidates(RetrievalStrategy::PastExperience, &fx.ctx());
        assert_eq!(titles(&result), vec!["Cloud Computing", "Statistics"]);
        assert_eq!(result[1].relevance_score, Some(0.9));
    }

    #[test]
    fn test_future_goals_keeps_source_order() {
        let fx = Fixture::new();
        let result = retrieve_candidates(RetrievalStrategy::FutureGoals, &fx.ctx());
        assert_eq!(titles(&result), vec!["Machine Learning", "Statistics"]);
    }

    #[test]
    fn test_taken_modules_are_excluded() {
        let mut fx = Fixture::new();
        fx.taken.insert("Statistics".to_string());
        for strategy in [
            RetrievalStrategy::PastExperience,
            RetrievalStrategy::FutureGoals,
            RetrievalStrategy::Preferences,
            RetrievalStrategy::Balanced,
        ] {
            let result = retrieve_candidates(strategy, &fx.ctx());
            assert!(
                !titles(&result).contains(&"Statistics"),
                "{strategy} kept a taken module"
            );
        }
    }

    #[test]
    fn test_thesis_modules_are_excluded() {
        let fx = Fixture::new();
        let result = retrieve_candidates(RetrievalStrategy::Preferences, &fx.ctx());
        assert!(!titles(&result).contains(&"Master Thesis"));
    }

    #[test]
    fn test_preferences_rank_by_satisfied_criteria() {
        let mut fx = Fixture::new();
        fx.catalog[2].lecturers = vec!["Dr. Weber".to_string()];
        fx.catalog[2].oral_assessment = true;
        fx.catalog[1].oral_assessment = true;
        fx.prefs = StudentPreferences {
            desired_lecturers: vec!["dr. weber".to_string()],
            oral_assessment: Some(true),
            ..StudentPreferences::default()
        };
        let result = retrieve_candidates(RetrievalStrategy::Preferences, &fx.ctx());
        assert_eq!(
            titles(&result),
            vec!["Machine Learning", "Cloud Computing", "Statistics"]
        );
        assert_eq!(result[0].relevance_score, Some(2.0));
    }

    #[test]
    fn test_unset_preferences_score_zero() {
        let mut module = make_catalog_module("Statistics");
        module.oral_assessment = true;
        module.project_work = true;
        module.teaching_days = vec!["Monday".to_string()];
        assert_eq!(preference_score(&module, &StudentPreferences::default()), 0);
    }

    #[test]
    fn test_teaching_days_must_all_be_available() {
        let mut module = make_catalog_module("Statistics");
        module.teaching_days = vec!["Monday".to_string(), "Friday".to_string()];
        let mut prefs = StudentPreferences {
            available_days: vec!["monday".to_string()],
            ..StudentPreferences::default()
        };
        assert_eq!(preference_score(&module, &prefs), 0);
        prefs.available_days.push("Friday".to_string());
        assert_eq!(preference_score(&module, &prefs), 1);
    }

    #[test]
    fn test_balanced_mixes_all_three_signals() {
        let fx = Fixture::new();
        let result = retrieve_candidates(RetrievalStrategy::Balanced, &fx.ctx());
        // Statistics: 0.9 + 1/6, Cloud Computing: 0.9, Machine Learning: 1/6
        assert_eq!(
            titles(&result),
            vec!["Statistics", "Cloud Computing", "Machine Learning"]
        );
        let top = result[0].relevance_score.unwrap();
        assert!((top - (0.9 + 1.0 / 6.0)).abs() < 1e-9, "got {top}");
    }

    #[test]
    fn test_empty_inputs_yield_empty_pool() {
        let mut fx = Fixture::new();
        fx.past.clear();
        fx.goals.clear();
        assert!(retrieve_candidates(RetrievalStrategy::PastExperience, &fx.ctx()).is_empty());
        assert!(retrieve_candidates(RetrievalStrategy::FutureGoals, &fx.ctx()).is_empty());
    }
}
