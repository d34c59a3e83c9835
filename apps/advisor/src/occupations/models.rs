use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One row of work history as stored in the student's profile.
///
/// Dates stay textual until normalization so a malformed value can be
/// reported against the record it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJobRecord {
    pub occupation: String,
    #[serde(default)]
    pub company: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_part_time: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
}

/// Calendar month. Scoring works at month granularity; days are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, used for month arithmetic.
    fn ordinal(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    /// Whole months from `self` until `later` (negative if `later` is earlier).
    pub fn months_until(self, later: YearMonth) -> i64 {
        later.ordinal() - self.ordinal()
    }

    pub fn add_months(self, months: i64) -> Self {
        let ordinal = self.ordinal() + months;
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A closed span of months. Ongoing work is resolved to the current month
/// before a period is built, so `end` is always present here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPeriod {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl WorkPeriod {
    /// Length in days between the first days of the start and end months.
    pub fn duration_days(&self) -> i64 {
        match (self.start.first_day(), self.end.first_day()) {
            (Some(start), Some(end)) => (end - start).num_days().max(0),
            _ => 0,
        }
    }
}

/// Ranker-internal view of a single record after date parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedJob {
    pub title: String,
    pub work_period: WorkPeriod,
    pub months_since_end: u32,
    pub employment_type: EmploymentType,
    pub is_current: bool,
}

/// All normalized jobs sharing one title, with periods coalesced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedOccupation {
    pub title: String,
    /// Sorted by start; neighbours are separated by at least one empty month.
    pub work_periods: Vec<WorkPeriod>,
    pub most_recent_months_since_end: u32,
    pub employment_type: EmploymentType,
}

impl MergedOccupation {
    pub fn total_duration_days(&self) -> i64 {
        self.work_periods.iter().map(WorkPeriod::duration_days).sum()
    }
}

/// Normalized sub-scores that make up a ranked occupation's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub duration: f64,
    pub recency: f64,
    pub employment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOccupation {
    pub title: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}
