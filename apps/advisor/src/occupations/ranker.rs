//! Occupation ranking: normalize → filter → merge → score → sort.
//!
//! Pure function of its inputs. `today` is passed in rather than read from
//! the clock so repeated calls with the same input rank identically.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ValidationError;
use crate::occupations::merge::merge_occupations;
use crate::occupations::models::{MergedOccupation, RankedOccupation, RawJobRecord, ScoreBreakdown};
use crate::occupations::normalize::{filter_recent, normalize_jobs};
use crate::occupations::scoring::{
    compute_combined_score, compute_duration_scores, compute_recency_scores, employment_score,
    RankingWeights,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingOptions {
    pub weights: RankingWeights,
    pub max_experience_years: u32,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            max_experience_years: 10,
        }
    }
}

impl RankingOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.weights.validate()?;
        if self.max_experience_years == 0 {
            return Err(ValidationError::NonPositiveExperienceWindow);
        }
        Ok(())
    }
}

/// Ranks the distinct occupations in a work history by relevance.
///
/// An empty history yields an empty ranking. Ties keep the order in which
/// titles first appear in `raw_jobs`.
pub fn rank_occupations(
    raw_jobs: &[RawJobRecord],
    options: &RankingOptions,
    today: NaiveDate,
) -> Result<Vec<RankedOccupation>, ValidationError> {
    options.validate()?;

    let normalized = normalize_jobs(raw_jobs, today)?;
    let recent = filter_recent(normalized, today, options.max_experience_years);
    let merged = merge_occupations(&recent);

    debug!(
        "Ranking {} records: {} inside the {}-year window, {} distinct occupations",
        raw_jobs.len(),
        recent.len(),
        options.max_experience_years,
        merged.len()
    );

    let mut ranked = score_occupations(&merged, &options.weights);

    // sort_by is stable, so equal scores keep first-seen order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(ranked)
}

/// Scores merged groups, normalizing each sub-score across the whole set.
pub fn score_occupations(
    merged: &[MergedOccupation],
    weights: &RankingWeights,
) -> Vec<RankedOccupation> {
    let durations: Vec<i64> = merged
        .iter()
        .map(MergedOccupation::total_duration_days)
        .collect();
    let recencies: Vec<u32> = merged
        .iter()
        .map(|m| m.most_recent_months_since_end)
        .collect();

    let duration_scores = compute_duration_scores(&durations);
    let recency_scores = compute_recency_scores(&recencies);

    merged
        .iter()
        .zip(duration_scores)
        .zip(recency_scores)
        .map(|((occupation, duration), recency)| {
            let breakdown = ScoreBreakdown {
                duration,
                recency,
                employment: employment_score(occupation.employment_type),
            };
            RankedOccupation {
                title: occupation.title.clone(),
                score: compute_combined_score(&breakdown, weights),
                breakdown,
            }
        })
        .collect()
}
