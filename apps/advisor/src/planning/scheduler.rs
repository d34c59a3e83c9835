//! Study-plan scheduling: greedy, single pass, deterministic.
//!
//! Algorithm:
//! 1. Work out the main-plan credits still owed after the taken modules.
//! 2. Order candidates: untaken mandatory modules first (configured order),
//!    then the ranked pool exactly as received, deduplicated, taken and
//!    thesis modules removed.
//! 3. Fill semesters 1..=n one module each. A semester takes the first
//!    unplaced candidate whose season matches; skipped candidates stay
//!    available for later semesters (the only backtrack).
//! 4. Place the thesis sequence in order, one per semester, directly after
//!    the main plan. Spare semesters trail the plan as empty entries.
//! 5. Re-validate the finished plan and fail rather than repair.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{ConstraintViolation, PlannerError, ValidationError};
use crate::planning::models::{
    CandidateModule, CreditSummary, PlanSection, PlannedModule, PlannerSettings, ScheduleRequest,
    Season, Semester, SemesterPlan,
};
use crate::planning::validation::validate_plan;

/// Builds a semester plan for one student.
pub fn schedule(
    request: &ScheduleRequest,
    settings: &PlannerSettings,
) -> Result<SemesterPlan, PlannerError> {
    validate_settings(request, settings)?;

    let module_credits = settings.module_credits;
    let taken = &request.taken_modules;

    let thesis_titles: HashSet<&str> = request
        .thesis_sequence
        .iter()
        .map(|m| m.title.as_str())
        .collect();

    let thesis: Vec<&CandidateModule> = request
        .thesis_sequence
        .iter()
        .filter(|m| !taken.contains(&m.title))
        .collect();
    check_thesis_shape(&thesis, module_credits)?;

    let taken_main = taken
        .iter()
        .filter(|t| !thesis_titles.contains(t.as_str()))
        .count() as u32;
    let taken_thesis_credits: u32 = request
        .thesis_sequence
        .iter()
        .filter(|m| taken.contains(&m.title))
        .map(|m| m.credits)
        .sum();
    let taken_credits = taken_main * module_credits + taken_thesis_credits;
    let remaining_main_credits = settings
        .main_plan_credits
        .saturating_sub(taken_main * module_credits);
    let thesis_credits: u32 = thesis.iter().map(|m| m.credits).sum();
    let main_slots = remaining_main_credits / module_credits;

    let thesis_count = thesis.len() as u32;
    if thesis_count > request.total_semesters {
        return Err(ConstraintViolation::InsufficientSemesters {
            required: thesis_count,
            available: request.total_semesters,
        }
        .into());
    }
    let main_window = request.total_semesters - thesis_count;
    if main_slots > main_window {
        return Err(ConstraintViolation::InsufficientSemesters {
            required: main_slots,
            available: main_window,
        }
        .into());
    }

    // No main-plan credits left: only the thesis sequence is scheduled.
    let (candidates, mandatory_count) = if main_slots == 0 {
        (Vec::new(), 0)
    } else {
        order_candidates(request, settings, &thesis_titles)?
    };

    let mandatory_credits = mandatory_count as u32 * module_credits;
    if mandatory_credits > remaining_main_credits {
        return Err(ConstraintViolation::MandatoryExceedsCredits {
            mandatory_credits,
            remaining_credits: remaining_main_credits,
        }
        .into());
    }

    debug!(
        "Scheduling {} main slots from {} candidates ({} mandatory) and {} thesis modules over {} semesters",
        main_slots,
        candidates.len(),
        mandatory_count,
        thesis_count,
        request.total_semesters
    );

    let main_plan = place_main_modules(
        &candidates,
        mandatory_count,
        main_slots,
        request.first_season,
        module_credits,
    )?;

    let mut semesters = Vec::with_capacity(request.total_semesters as usize);
    for index in 1..=request.total_semesters {
        let slot = index as usize;
        let module = if slot <= main_plan.len() {
            let candidate = main_plan[slot - 1];
            Some(PlannedModule {
                title: candidate.title.clone(),
                section: PlanSection::Main,
                module_type: candidate.module_type,
                credits: candidate.credits,
            })
        } else {
            thesis.get(slot - main_plan.len() - 1).map(|m| PlannedModule {
                title: m.title.clone(),
                section: PlanSection::Thesis,
                module_type: m.module_type,
                credits: m.credits,
            })
        };

        let year = match request.start_year {
            Some(start) => Some(
                calendar_year(start, request.first_season, index)
                    .ok_or(ValidationError::StartYearOutOfRange(start))?,
            ),
            None => None,
        };

        let modules: Vec<PlannedModule> = module.into_iter().collect();
        semesters.push(Semester {
            index,
            season: Season::for_semester(request.first_season, index),
            year,
            total_credits: modules.iter().map(|m| m.credits).sum(),
            modules,
        });
    }

    let plan = SemesterPlan {
        credits: CreditSummary {
            graduation_credits: settings.graduation_credits,
            taken_credits,
            remaining_main_credits,
            thesis_credits,
            scheduled_credits: semesters.iter().map(|s| s.total_credits).sum(),
        },
        semesters,
    };

    let thesis_order: Vec<&str> = thesis.iter().map(|m| m.title.as_str()).collect();
    validate_plan(&plan, remaining_main_credits + thesis_credits, &thesis_order)?;

    Ok(plan)
}

fn validate_settings(
    request: &ScheduleRequest,
    settings: &PlannerSettings,
) -> Result<(), ValidationError> {
    if request.total_semesters == 0 {
        return Err(ValidationError::NonPositiveSemesterCount);
    }
    if request.total_semesters < settings.min_semesters
        || request.total_semesters > settings.max_semesters
    {
        return Err(ValidationError::SemesterCountOutOfRange {
            got: request.total_semesters,
            min: settings.min_semesters,
            max: settings.max_semesters,
        });
    }
    if settings.module_credits == 0 || settings.main_plan_credits % settings.module_credits != 0 {
        return Err(ValidationError::CreditsNotModuleMultiple {
            field: "main_plan_credits",
            credits: settings.main_plan_credits,
            module_credits: settings.module_credits,
        });
    }

    let thesis_credits: u32 = request.thesis_sequence.iter().map(|m| m.credits).sum();
    if settings.main_plan_credits + thesis_credits != settings.graduation_credits {
        return Err(ValidationError::GraduationCreditMismatch {
            graduation_credits: settings.graduation_credits,
            main_plan_credits: settings.main_plan_credits,
            thesis_credits,
        });
    }
    Ok(())
}

/// An oversized thesis module (the thesis itself) must close the sequence.
fn check_thesis_shape(
    thesis: &[&CandidateModule],
    module_credits: u32,
) -> Result<(), ValidationError> {
    let last = thesis.len().saturating_sub(1);
    match thesis
        .iter()
        .enumerate()
        .find(|(i, m)| m.credits > module_credits && *i != last)
    {
        Some((_, m)) => Err(ValidationError::OversizedThesisNotTerminal(m.title.clone())),
        None => Ok(()),
    }
}

/// Mandatory modules first, then the ranked pool in its given order.
/// Returns the ordered list and how many leading entries are mandatory.
fn order_candidates<'a>(
    request: &'a ScheduleRequest,
    settings: &PlannerSettings,
    thesis_titles: &HashSet<&str>,
) -> Result<(Vec<&'a CandidateModule>, usize), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&CandidateModule> = Vec::new();

    for title in &settings.mandatory_titles {
        if request.taken_modules.contains(title) || !seen.insert(title.as_str()) {
            continue;
        }
        let module = request
            .ranked_modules
            .iter()
            .find(|m| &m.title == title)
            .ok_or_else(|| ValidationError::MissingMandatoryModule(title.clone()))?;
        ordered.push(module);
    }
    let mandatory_count = ordered.len();

    for module in &request.ranked_modules {
        let title = module.title.as_str();
        if request.taken_modules.contains(title) || thesis_titles.contains(title) {
            continue;
        }
        if seen.insert(title) {
            ordered.push(module);
        }
    }

    for module in &ordered {
        if module.credits != settings.module_credits {
            return Err(ValidationError::NonStandardModuleCredits {
                title: module.title.clone(),
                credits: module.credits,
                module_credits: settings.module_credits,
            });
        }
    }

    Ok((ordered, mandatory_count))
}

/// Fills semesters `1..=slots` with one candidate each, honouring seasons.
fn place_main_modules<'a>(
    candidates: &[&'a CandidateModule],
    mandatory_count: usize,
    slots: u32,
    first_season: Season,
    module_credits: u32,
) -> Result<Vec<&'a CandidateModule>, ConstraintViolation> {
    let mut placed = vec![false; candidates.len()];
    let mut plan = Vec::with_capacity(slots as usize);

    for semester in 1..=slots {
        let season = Season::for_semester(first_season, semester);
        let next = candidates
            .iter()
            .enumerate()
            .find(|(i, m)| !placed[*i] && m.season == season)
            .map(|(i, _)| i);

        match next {
            Some(i) => {
                placed[i] = true;
                plan.push(candidates[i]);
            }
            None => {
                return Err(ConstraintViolation::CreditShortfall {
                    semester,
                    season,
                    missing_credits: (slots - semester + 1) * module_credits,
                    unplaced: candidates
                        .iter()
                        .zip(&placed)
                        .filter(|(_, done)| !**done)
                        .map(|(m, _)| m.title.clone())
                        .collect(),
                });
            }
        }
    }

    if let Some(i) = (0..mandatory_count).find(|&i| !placed[i]) {
        return Err(ConstraintViolation::UnplaceableModule {
            title: candidates[i].title.clone(),
            season: candidates[i].season,
        });
    }

    Ok(plan)
}

/// Spring and autumn of the same calendar year share a year label.
/// `None` when the year does not fit in an `i32`.
fn calendar_year(start_year: i32, first_season: Season, index: u32) -> Option<i32> {
    let offset = match first_season {
        Season::Spring => (index - 1) / 2,
        Season::Autumn => index / 2,
    };
    start_year.checked_add(i32::try_from(offset).ok()?)
}
