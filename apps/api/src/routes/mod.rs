pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers as print;
use crate::quiz::handlers as quiz;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Print planning API
        .route("/api/v1/print/plan", post(print::handle_plan))
        .route("/api/v1/print/estimate", post(print::handle_estimate))
        .route("/api/v1/print/quizzes", post(quiz::handle_quiz_plan))
        .with_state(state)
}
