use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::occupations::models::{EmploymentType, ScoreBreakdown};

/// Tolerance on the weight sum.
pub const WEIGHT_EPSILON: f64 = 1e-6;

pub const FULL_TIME_SCORE: f64 = 1.0;
pub const PART_TIME_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub duration: f64,
    pub recency: f64,
    pub employment_type: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            duration: 0.5,
            recency: 0.3,
            employment_type: 0.2,
        }
    }
}

impl RankingWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("duration", self.duration),
            ("recency", self.recency),
            ("employment_type", self.employment_type),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidWeight { name, value });
            }
        }

        let sum = self.duration + self.recency + self.employment_type;
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ValidationError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

/// Each group's total duration relative to the longest group. All zero when
/// no group has any duration.
pub fn compute_duration_scores(durations_days: &[i64]) -> Vec<f64> {
    let max = durations_days.iter().copied().max().unwrap_or(0);
    durations_days
        .iter()
        .map(|&d| if max > 0 { d as f64 / max as f64 } else { 0.0 })
        .collect()
}

/// Most recent group scores highest; the least recent group scores 0.
pub fn compute_recency_scores(months_since_end: &[u32]) -> Vec<f64> {
    let max = months_since_end.iter().copied().max().unwrap_or(0);
    months_since_end
        .iter()
        .map(|&m| {
            if max > 0 {
                (max - m) as f64 / max as f64
            } else {
                0.0
            }
        })
        .collect()
}

pub fn employment_score(employment_type: EmploymentType) -> f64 {
    match employment_type {
        EmploymentType::FullTime => FULL_TIME_SCORE,
        EmploymentType::PartTime => PART_TIME_SCORE,
    }
}

/// Weighted sum of the three sub-scores.
pub fn compute_combined_score(breakdown: &ScoreBreakdown, weights: &RankingWeights) -> f64 {
    (weights.duration * breakdown.duration
        + weights.recency * breakdown.recency
        + weights.employment_type * breakdown.employment)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_valid() {
        assert!(RankingWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let w = RankingWeights {
            duration: 0.5,
            recency: 0.5,
            employment_type: 0.5,
        };
        assert!(matches!(
            w.validate(),
            Err(ValidationError::WeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = RankingWeights {
            duration: 1.2,
            recency: -0.2,
            employment_type: 0.0,
        };
        assert!(matches!(
            w.validate(),
            Err(ValidationError::InvalidWeight { name: "recency", .. })
        ));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let w = RankingWeights {
            duration: f64::NAN,
            recency: 0.5,
            employment_type: 0.5,
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_weights_within_epsilon_accepted() {
        let w = RankingWeights {
            duration: 0.1 + 0.2,
            recency: 0.3,
            employment_type: 0.4,
        };
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_duration_scores_normalize_to_longest() {
        let scores = compute_duration_scores(&[100, 50, 0]);
        assert_eq!(scores, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_duration_scores_zero_when_max_zero() {
        assert_eq!(compute_duration_scores(&[0, 0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_recency_scores_invert_months() {
        let scores = compute_recency_scores(&[0, 10, 40]);
        assert_eq!(scores[0], 1.0);
        assert!((scores[1] - 0.75).abs() < 1e-9);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_recency_scores_zero_when_max_zero() {
        assert_eq!(compute_recency_scores(&[0]), vec![0.0]);
    }

    #[test]
    fn test_scaling_durations_preserves_duration_order() {
        let durations = [730_i64, 120, 365, 2000];
        let scaled: Vec<i64> = durations.iter().map(|d| d * 7).collect();
        let order = |scores: Vec<f64>| {
            let mut idx: Vec<usize> = (0..scores.len()).collect();
            idx.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            idx
        };
        assert_eq!(
            order(compute_duration_scores(&durations)),
            order(compute_duration_scores(&scaled))
        );
    }

    #[test]
    fn test_combined_score_partial() {
        let w = RankingWeights::default();
        let breakdown = ScoreBreakdown {
            duration: 0.8,
            recency: 0.6,
            employment: 0.5,
        };
        // 0.5*0.8 + 0.3*0.6 + 0.2*0.5 = 0.4 + 0.18 + 0.1 = 0.68
        let score = compute_combined_score(&breakdown, &w);
        assert!((score - 0.68).abs() < 0.001, "Score was {score}");
    }

    #[test]
    fn test_employment_scores() {
        assert_eq!(employment_score(EmploymentType::FullTime), 1.0);
        assert_eq!(employment_score(EmploymentType::PartTime), 0.5);
    }
}
