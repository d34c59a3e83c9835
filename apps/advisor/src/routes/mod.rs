pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::occupations::handlers as occupations;
use crate::planning::handlers as planning;
use crate::retrieval::handlers as retrieval;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/occupations/rank", post(occupations::handle_rank))
        .route("/api/v1/plans/schedule", post(planning::handle_schedule))
        .route("/api/v1/plans/advise", post(retrieval::handle_advise))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}
