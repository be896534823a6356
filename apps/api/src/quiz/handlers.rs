use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::handlers::{
    plan_blocking, request_builder, resolve_capacity, CapacityInput, PlanResponse,
};
use crate::quiz::QuizContent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuizPlanRequest {
    pub quizzes: Vec<QuizContent>,
    pub capacity: Option<CapacityInput>,
    pub content_width_px: Option<f64>,
}

/// POST /api/v1/print/quizzes
///
/// Builds print sections for typed quiz content with the worksheet typography
/// and each quiz type's own break preferences, then plans the pages.
pub async fn handle_quiz_plan(
    State(state): State<AppState>,
    Json(request): Json<QuizPlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    if request.quizzes.is_empty() {
        return Err(AppError::Validation("quizzes cannot be empty".to_string()));
    }

    let capacity = resolve_capacity(&state, request.capacity)?;
    let builder = request_builder(&state, request.content_width_px)?;
    let items = builder.build_all(&request.quizzes)?;

    tracing::debug!("Planning {} quizzes", items.len());
    let plan = plan_blocking(items, capacity).await?;

    Ok(Json(PlanResponse {
        plan,
        planned_at: Utc::now(),
    }))
}
