use std::collections::HashSet;

use crate::errors::ConstraintViolation;
use crate::planning::models::{PlanSection, SemesterPlan};

/// Re-checks a finished plan against the credit and sequencing rules.
///
/// - scheduled credits equal `expected_credits`
/// - every module appears exactly once
/// - empty semesters only trail the plan
/// - thesis modules appear in `thesis_order`
/// - no main-plan module sits in a later semester than any thesis module
pub fn validate_plan(
    plan: &SemesterPlan,
    expected_credits: u32,
    thesis_order: &[&str],
) -> Result<(), ConstraintViolation> {
    let scheduled: u32 = plan
        .semesters
        .iter()
        .flat_map(|s| s.modules.iter())
        .map(|m| m.credits)
        .sum();
    if scheduled != expected_credits || plan.scheduled_credits() != expected_credits {
        return Err(ConstraintViolation::CreditMismatch {
            expected: expected_credits,
            scheduled,
        });
    }

    let mut seen = HashSet::new();
    for module in plan.semesters.iter().flat_map(|s| s.modules.iter()) {
        if !seen.insert(module.title.as_str()) {
            return Err(ConstraintViolation::DuplicateModule {
                title: module.title.clone(),
            });
        }
    }

    if let Some(last_filled) = plan.semesters.iter().rposition(|s| !s.is_empty()) {
        if let Some(gap) = plan.semesters[..last_filled].iter().find(|s| s.is_empty()) {
            return Err(ConstraintViolation::InterleavedEmptySemester { semester: gap.index });
        }
    }

    let thesis_placed: Vec<(u32, &str)> = plan
        .semesters
        .iter()
        .flat_map(|s| {
            s.modules
                .iter()
                .filter(|m| m.section == PlanSection::Thesis)
                .map(move |m| (s.index, m.title.as_str()))
        })
        .collect();

    for (position, (_, title)) in thesis_placed.iter().enumerate() {
        if thesis_order.get(position) != Some(title) {
            return Err(ConstraintViolation::ThesisOutOfOrder {
                title: title.to_string(),
            });
        }
    }
    if let Some(missing) = thesis_order.get(thesis_placed.len()) {
        return Err(ConstraintViolation::ThesisOutOfOrder {
            title: missing.to_string(),
        });
    }

    if let Some(&(thesis_semester, thesis_title)) = thesis_placed.first() {
        for semester in plan.semesters.iter().filter(|s| s.index > thesis_semester) {
            if let Some(main) = semester
                .modules
                .iter()
                .find(|m| m.section == PlanSection::Main)
            {
                return Err(ConstraintViolation::MainAfterThesis {
                    title: main.title.clone(),
                    semester: semester.index,
                    thesis_title: thesis_title.to_string(),
                    thesis_semester,
                });
            }
        }
    }

    Ok(())
}
