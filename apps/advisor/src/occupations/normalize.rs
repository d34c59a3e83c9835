use chrono::{Months, NaiveDate};

use crate::errors::ValidationError;
use crate::occupations::models::{
    EmploymentType, NormalizedJob, RawJobRecord, WorkPeriod, YearMonth,
};

/// Parses a profile date. Accepts `YYYY-MM-DD` and `YYYY-MM`.
fn parse_profile_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}

/// Converts raw records into month-granular jobs relative to `today`.
///
/// Fails on the first malformed record; records are never dropped silently.
pub fn normalize_jobs(
    raw_jobs: &[RawJobRecord],
    today: NaiveDate,
) -> Result<Vec<NormalizedJob>, ValidationError> {
    raw_jobs
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_job(index, record, today))
        .collect()
}

fn normalize_job(
    index: usize,
    record: &RawJobRecord,
    today: NaiveDate,
) -> Result<NormalizedJob, ValidationError> {
    let malformed = |reason: String| ValidationError::MalformedRecord {
        index,
        occupation: record.occupation.clone(),
        reason,
    };

    if record.occupation.trim().is_empty() {
        return Err(malformed("occupation title is empty".to_string()));
    }

    let start = parse_profile_date(&record.start_date)
        .ok_or_else(|| malformed(format!("invalid start_date '{}'", record.start_date)))?;

    let end = match (&record.end_date, record.is_current) {
        (Some(raw), _) => parse_profile_date(raw)
            .ok_or_else(|| malformed(format!("invalid end_date '{raw}'")))?,
        (None, true) => today,
        (None, false) => {
            return Err(malformed(
                "end_date is missing and the job is not marked current".to_string(),
            ))
        }
    };

    if start > end {
        return Err(malformed(format!("start_date {start} is after end_date {end}")));
    }

    let start = YearMonth::from_date(start);
    let end = YearMonth::from_date(end);
    let months_since_end = end.months_until(YearMonth::from_date(today)).max(0) as u32;

    Ok(NormalizedJob {
        title: record.occupation.clone(),
        work_period: WorkPeriod { start, end },
        months_since_end,
        employment_type: if record.is_part_time {
            EmploymentType::PartTime
        } else {
            EmploymentType::FullTime
        },
        is_current: record.is_current,
    })
}

/// Drops jobs that ended before the experience window. Current jobs always stay.
pub fn filter_recent(
    jobs: Vec<NormalizedJob>,
    today: NaiveDate,
    max_experience_years: u32,
) -> Vec<NormalizedJob> {
    let cutoff = today
        .checked_sub_months(Months::new(max_experience_years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);

    jobs.into_iter()
        .filter(|job| {
            job.is_current
                || job
                    .work_period
                    .end
                    .first_day()
                    .map(|end| end >= cutoff)
                    .unwrap_or(false)
        })
        .collect()
}
