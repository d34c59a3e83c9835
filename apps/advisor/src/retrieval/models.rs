use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::occupations::RankedOccupation;
use crate::planning::models::CandidateModule;

/// How candidate modules are chosen before scheduling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    #[default]
    PastExperience,
    FutureGoals,
    Preferences,
    Balanced,
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetrievalStrategy::PastExperience => "past_experience",
            RetrievalStrategy::FutureGoals => "future_goals",
            RetrievalStrategy::Preferences => "preferences",
            RetrievalStrategy::Balanced => "balanced",
        };
        f.write_str(name)
    }
}

/// An occupation a catalog module develops skills for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccupationSupport {
    pub occupation: String,
    #[serde(default)]
    pub supported_skills: Vec<String>,
}

/// Catalog entry: the schedulable module plus the attributes the
/// preference and occupation lookups read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogModule {
    #[serde(flatten)]
    pub module: CandidateModule,
    #[serde(default)]
    pub lecturers: Vec<String>,
    #[serde(default)]
    pub teaching_days: Vec<String>,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub oral_assessment: bool,
    #[serde(default)]
    pub project_work: bool,
    #[serde(default)]
    pub supported_occupations: Vec<OccupationSupport>,
}

/// A module found for one occupation, with the skills it covers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccupationModuleMatch {
    pub occupation: String,
    pub module: CandidateModule,
    pub supported_skills: Vec<String>,
}

/// What the student said they want from a module. Unset criteria are
/// never counted as satisfied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPreferences {
    #[serde(default)]
    pub desired_lecturers: Vec<String>,
    #[serde(default)]
    pub available_days: Vec<String>,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub oral_assessment: Option<bool>,
    #[serde(default)]
    pub project_work: Option<bool>,
}

/// Mixing constants for the balanced strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalancedWeights {
    pub goal_match_weight: f64,
    pub preference_divisor: f64,
}

impl Default for BalancedWeights {
    fn default() -> Self {
        Self {
            goal_match_weight: 1.0 / 6.0,
            preference_divisor: 6.0,
        }
    }
}

/// Everything a strategy may read. Built once per request.
pub struct StrategyContext<'a> {
    pub ranked_occupations: &'a [RankedOccupation],
    /// Matches for the occupations in the student's work history.
    pub past_matches: &'a [OccupationModuleMatch],
    /// Matches for the occupations the student wants to move into.
    pub goal_matches: &'a [OccupationModuleMatch],
    pub catalog: &'a [CatalogModule],
    pub preferences: &'a StudentPreferences,
    pub taken_modules: &'a BTreeSet<String>,
    pub thesis_titles: &'a [String],
    pub weights: &'a BalancedWeights,
}

impl StrategyContext<'_> {
    /// Taken and thesis modules never reach the candidate pool.
    pub fn is_excluded(&self, title: &str) -> bool {
        self.taken_modules.contains(title) || self.thesis_titles.iter().any(|t| t == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_round_trip() {
        let parsed: RetrievalStrategy = serde_json::from_str("\"future_goals\"").unwrap();
        assert_eq!(parsed, RetrievalStrategy::FutureGoals);
        assert_eq!(RetrievalStrategy::Balanced.to_string(), "balanced");
    }

    #[test]
    fn test_catalog_module_flattens_candidate_fields() {
        let json = r#"{
            "title": "Data Mining",
            "module_type": "elective",
            "season": "autumn",
            "credits": 6,
            "lecturers": ["Dr. Weber"],
            "oral_assessment": true
        }"#;
        let module: CatalogModule = serde_json::from_str(json).unwrap();
        assert_eq!(module.module.title, "Data Mining");
        assert!(module.oral_assessment);
        assert!(module.supported_occupations.is_empty());
    }
}
