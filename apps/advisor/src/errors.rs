use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::planning::models::Season;

/// Malformed input shape. Always surfaced to the caller, never corrected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("job record {index} ('{occupation}'): {reason}")]
    MalformedRecord {
        index: usize,
        occupation: String,
        reason: String,
    },

    #[error("weight '{name}' must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("ranking weights must sum to 1.0 (got {sum})")]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("max_experience_years must be a positive number of years")]
    NonPositiveExperienceWindow,

    #[error("total_semesters must be a positive number of semesters")]
    NonPositiveSemesterCount,

    #[error("total_semesters must be between {min} and {max} (got {got})")]
    SemesterCountOutOfRange { got: u32, min: u32, max: u32 },

    #[error("{field} ({credits}) must be a multiple of the module size ({module_credits} credits)")]
    CreditsNotModuleMultiple {
        field: &'static str,
        credits: u32,
        module_credits: u32,
    },

    #[error("main-plan credits ({main_plan_credits}) plus thesis credits ({thesis_credits}) must equal the {graduation_credits} graduation credits")]
    GraduationCreditMismatch {
        graduation_credits: u32,
        main_plan_credits: u32,
        thesis_credits: u32,
    },

    #[error("start_year {0} leaves semester years outside the representable range")]
    StartYearOutOfRange(i32),

    #[error("mandatory module '{0}' is neither taken nor present in the candidate pool")]
    MissingMandatoryModule(String),

    #[error("main-plan module '{title}' is worth {credits} credits; main-plan modules must be worth {module_credits}")]
    NonStandardModuleCredits {
        title: String,
        credits: u32,
        module_credits: u32,
    },

    #[error("thesis module '{0}' exceeds the standard module size but is not the last entry of the thesis sequence")]
    OversizedThesisNotTerminal(String),
}

/// Well-formed input for which no plan satisfies the scheduling rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolation {
    #[error("{required} semesters are needed but only {available} are available")]
    InsufficientSemesters { required: u32, available: u32 },

    #[error("{mandatory_credits} credits of mandatory modules remain but only {remaining_credits} main-plan credits are left")]
    MandatoryExceedsCredits {
        mandatory_credits: u32,
        remaining_credits: u32,
    },

    #[error("mandatory module '{title}' is only offered in {season} and no {season} semester is left in the main plan")]
    UnplaceableModule { title: String, season: Season },

    #[error("no candidate is offered in {season} for semester {semester}; {missing_credits} main-plan credits cannot be placed (unplaced: {})", .unplaced.join(", "))]
    CreditShortfall {
        semester: u32,
        season: Season,
        missing_credits: u32,
        unplaced: Vec<String>,
    },

    #[error("plan schedules {scheduled} credits but {expected} are required")]
    CreditMismatch { expected: u32, scheduled: u32 },

    #[error("module '{title}' is scheduled more than once")]
    DuplicateModule { title: String },

    #[error("semester {semester} is empty but later semesters are not")]
    InterleavedEmptySemester { semester: u32 },

    #[error("thesis module '{title}' is out of sequence")]
    ThesisOutOfOrder { title: String },

    #[error("main-plan module '{title}' (semester {semester}) is scheduled after thesis module '{thesis_title}' (semester {thesis_semester})")]
    MainAfterThesis {
        title: String,
        semester: u32,
        thesis_title: String,
        thesis_semester: u32,
    },
}

/// Everything the scheduler can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ConstraintViolation> for AppError {
    fn from(err: ConstraintViolation) -> Self {
        AppError::ConstraintViolation(err.to_string())
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Validation(e) => e.into(),
            PlannerError::Constraint(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ConstraintViolation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONSTRAINT_VIOLATION",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
