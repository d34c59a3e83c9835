use std::collections::HashMap;

use crate::occupations::models::{EmploymentType, MergedOccupation, NormalizedJob, WorkPeriod};

/// Groups jobs by exact title and coalesces each group's periods.
///
/// Output order follows the first appearance of each title, which the
/// ranker relies on for its stable tie-break.
pub fn merge_occupations(jobs: &[NormalizedJob]) -> Vec<MergedOccupation> {
    let (order, groups) = jobs.iter().fold(
        (Vec::<&str>::new(), HashMap::<&str, Vec<&NormalizedJob>>::new()),
        |(mut order, mut groups), job| {
            let title = job.title.as_str();
            if !groups.contains_key(title) {
                order.push(title);
            }
            groups.entry(title).or_default().push(job);
            (order, groups)
        },
    );

    order
        .into_iter()
        .filter_map(|title| groups.get(title).map(|group| merge_group(title, group)))
        .collect()
}

fn merge_group(title: &str, group: &[&NormalizedJob]) -> MergedOccupation {
    let periods: Vec<WorkPeriod> = group.iter().map(|job| job.work_period).collect();

    let most_recent_months_since_end = group
        .iter()
        .map(|job| job.months_since_end)
        .min()
        .unwrap_or(0);

    let employment_type = if group
        .iter()
        .any(|job| job.employment_type == EmploymentType::FullTime)
    {
        EmploymentType::FullTime
    } else {
        EmploymentType::PartTime
    };

    MergedOccupation {
        title: title.to_string(),
        work_periods: coalesce_periods(periods),
        most_recent_months_since_end,
        employment_type,
    }
}

/// Sorts periods by start and joins any that overlap or sit at most one
/// month apart.
pub fn coalesce_periods(mut periods: Vec<WorkPeriod>) -> Vec<WorkPeriod> {
    periods.sort_by_key(|p| (p.start, p.end));

    let mut merged: Vec<WorkPeriod> = Vec::with_capacity(periods.len());
    for period in periods {
        match merged.last_mut() {
            Some(current) if period.start <= current.end.add_months(1) => {
                current.end = current.end.max(period.end);
            }
            _ => merged.push(period),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupations::models::YearMonth;

    fn period(start: (i32, u32), end: (i32, u32)) -> WorkPeriod {
        WorkPeriod {
            start: YearMonth { year: start.0, month: start.1 },
            end: YearMonth { year: end.0, month: end.1 },
        }
    }

    fn make_job(title: &str, p: WorkPeriod, months_since_end: u32, part_time: bool) -> NormalizedJob {
        NormalizedJob {
            title: title.to_string(),
            work_period: p,
            months_since_end,
            employment_type: if part_time {
                EmploymentType::PartTime
            } else {
                EmploymentType::FullTime
            },
            is_current: false,
        }
    }

    fn assert_separated(periods: &[WorkPeriod]) {
        for pair in periods.windows(2) {
            assert!(
                pair[0].end.months_until(pair[1].start) >= 2,
                "Periods {:?} and {:?} are not separated by a full month",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_overlapping_periods_coalesce() {
        let merged = coalesce_periods(vec![
            period((2018, 1), (2019, 6)),
            period((2019, 3), (2020, 1)),
        ]);
        assert_eq!(merged, vec![period((2018, 1), (2020, 1))]);
    }

    #[test]
    fn test_adjacent_month_coalesces() {
        let merged = coalesce_periods(vec![
            period((2020, 1), (2020, 6)),
            period((2020, 7), (2020, 12)),
        ]);
        assert_eq!(merged, vec![period((2020, 1), (2020, 12))]);
    }

    #[test]
    fn test_gap_of_one_empty_month_is_kept() {
        let merged = coalesce_periods(vec![
            period((2020, 8), (2020, 12)),
            period((2020, 1), (2020, 6)),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, YearMonth { year: 2020, month: 1 });
        assert_separated(&merged);
    }

    #[test]
    fn test_contained_period_does_not_shrink_end() {
        let merged = coalesce_periods(vec![
            period((2015, 1), (2022, 1)),
            period((2016, 1), (2017, 1)),
        ]);
        assert_eq!(merged, vec![period((2015, 1), (2022, 1))]);
    }

    #[test]
    fn test_merged_groups_are_separated() {
        let jobs = vec![
            make_job("Engineer", period((2010, 1), (2011, 1)), 100, false),
            make_job("Engineer", period((2011, 2), (2012, 5)), 90, false),
            make_job("Engineer", period((2014, 1), (2015, 1)), 60, false),
            make_job("Engineer", period((2012, 7), (2013, 3)), 70, false),
            make_job("Engineer", period((2013, 4), (2013, 9)), 65, false),
        ];
        let merged = merge_occupations(&jobs);
        assert_eq!(merged.len(), 1);
        assert_separated(&merged[0].work_periods);
        assert_eq!(merged[0].work_periods.len(), 3);
    }

    #[test]
    fn test_group_takes_min_recency_and_any_full_time() {
        let jobs = vec![
            make_job("Analyst", period((2018, 1), (2019, 1)), 40, true),
            make_job("Analyst", period((2021, 1), (2022, 1)), 12, false),
        ];
        let merged = merge_occupations(&jobs);
        assert_eq!(merged[0].most_recent_months_since_end, 12);
        assert_eq!(merged[0].employment_type, EmploymentType::FullTime);
    }

    #[test]
    fn test_all_part_time_group_stays_part_time() {
        let jobs = vec![make_job("Tutor", period((2018, 1), (2019, 1)), 40, true)];
        assert_eq!(merge_occupations(&jobs)[0].employment_type, EmploymentType::PartTime);
    }

    #[test]
    fn test_titles_are_case_sensitive_and_keep_first_seen_order() {
        let jobs = vec![
            make_job("engineer", period((2018, 1), (2019, 1)), 40, false),
            make_job("Analyst", period((2018, 1), (2019, 1)), 40, false),
            make_job("Engineer", period((2018, 1), (2019, 1)), 40, false),
            make_job("Analyst", period((2020, 1), (2021, 1)), 20, false),
        ];
        let titles: Vec<_> = merge_occupations(&jobs)
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["engineer", "Analyst", "Engineer"]);
    }
}
