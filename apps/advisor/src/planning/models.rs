use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Autumn,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Autumn,
            Season::Autumn => Season::Spring,
        }
    }

    /// Season of the 1-based `index`-th semester when semester 1 is `first`.
    pub fn for_semester(first: Season, index: u32) -> Self {
        if index % 2 == 1 {
            first
        } else {
            first.next()
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spring" => Some(Season::Spring),
            "autumn" | "fall" => Some(Season::Autumn),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "spring"),
            Season::Autumn => write!(f, "autumn"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Mandatory,
    Elective,
}

/// A module offered by the upstream catalog. The scheduler only looks at
/// `title`, `season`, `credits` and the position of the module in its list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateModule {
    pub title: String,
    pub module_type: ModuleType,
    pub season: Season,
    pub credits: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanSection {
    Main,
    Thesis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedModule {
    pub title: String,
    pub section: PlanSection,
    pub module_type: ModuleType,
    pub credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Semester {
    /// 1-based.
    pub index: u32,
    pub season: Season,
    pub year: Option<i32>,
    pub modules: Vec<PlannedModule>,
    pub total_credits: u32,
}

impl Semester {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.title.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditSummary {
    pub graduation_credits: u32,
    pub taken_credits: u32,
    pub remaining_main_credits: u32,
    pub thesis_credits: u32,
    pub scheduled_credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemesterPlan {
    pub semesters: Vec<Semester>,
    pub credits: CreditSummary,
}

impl SemesterPlan {
    pub fn scheduled_credits(&self) -> u32 {
        self.semesters.iter().map(|s| s.total_credits).sum()
    }

    /// Semester index of `title`, if scheduled.
    pub fn semester_of(&self, title: &str) -> Option<u32> {
        self.semesters
            .iter()
            .find(|s| s.modules.iter().any(|m| m.title == title))
            .map(|s| s.index)
    }
}

/// Programme-level constants. Defaults follow the 90/60 credit variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    pub graduation_credits: u32,
    pub main_plan_credits: u32,
    pub module_credits: u32,
    pub min_semesters: u32,
    pub max_semesters: u32,
    /// Ordered: mandatory modules are scheduled in this order.
    pub mandatory_titles: Vec<String>,
}

pub const DEFAULT_MANDATORY_MODULES: &[&str] = &[
    "Alignment of Business and IT",
    "Business Intelligence",
    "Business Process Management",
    "Strategic Business Innovation",
];

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            graduation_credits: 90,
            main_plan_credits: 60,
            module_credits: 6,
            min_semesters: 3,
            max_semesters: 10,
            mandatory_titles: DEFAULT_MANDATORY_MODULES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// Per-student scheduling input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub ranked_modules: Vec<CandidateModule>,
    #[serde(default)]
    pub thesis_sequence: Vec<CandidateModule>,
    #[serde(default)]
    pub taken_modules: BTreeSet<String>,
    pub total_semesters: u32,
    pub first_season: Season,
    #[serde(default)]
    pub start_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasons_alternate_from_first() {
        assert_eq!(Season::for_semester(Season::Spring, 1), Season::Spring);
        assert_eq!(Season::for_semester(Season::Spring, 2), Season::Autumn);
        assert_eq!(Season::for_semester(Season::Autumn, 3), Season::Autumn);
        assert_eq!(Season::for_semester(Season::Autumn, 4), Season::Spring);
    }

    #[test]
    fn test_parse_season() {
        assert_eq!(Season::parse(" Spring "), Some(Season::Spring));
        assert_eq!(Season::parse("fall"), Some(Season::Autumn));
        assert_eq!(Season::parse("summer"), None);
    }

    #[test]
    fn test_season_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Season::Autumn).unwrap(), "\"autumn\"");
    }
}
