//! Axum route handlers for the print-planning API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::text_metrics::estimate;
use crate::layout::{
    compose, ContentSection, GroupingHint, LineEstimate, PageCapacity, PagePlan, PlanError, QuizItem,
    SectionRole, SectionStyle,
};
use crate::quiz::SectionBuilder;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SectionInput {
    pub role: SectionRole,
    #[serde(default)]
    pub text: String,
    /// Overrides the role's default style.
    pub style: Option<SectionStyle>,
    /// Pre-measured height; skips estimation entirely.
    pub height_px: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ItemInput {
    pub id: Option<Uuid>,
    pub sections: Vec<SectionInput>,
    #[serde(default)]
    pub grouping_hint: GroupingHint,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CapacityInput {
    pub content_height_px: f64,
    #[serde(default)]
    pub safety_margin_px: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub items: Vec<ItemInput>,
    pub capacity: Option<CapacityInput>,
    pub content_width_px: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: PagePlan,
    pub planned_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub text: String,
    pub style: Option<SectionStyle>,
    pub role: Option<SectionRole>,
    pub container_width_px: Option<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/print/plan
///
/// Packs caller-supplied sections into a page plan. Sections without a style
/// use the role's worksheet style; `height_px` bypasses estimation.
pub async fn handle_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    if request.items.is_empty() {
        return Err(AppError::Validation("items cannot be empty".to_string()));
    }

    let capacity = resolve_capacity(&state, request.capacity)?;
    let builder = request_builder(&state, request.content_width_px)?;

    let items = request
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| build_item(&builder, item).map_err(|e| e.for_item(index)))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = plan_blocking(items, capacity).await?;

    Ok(Json(PlanResponse {
        plan,
        planned_at: Utc::now(),
    }))
}

/// POST /api/v1/print/estimate
///
/// Returns the estimated line count and height of one block of text.
pub async fn handle_estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<LineEstimate>, AppError> {
    let style = match (request.style, &request.role) {
        (Some(style), _) => style,
        (None, Some(role)) => state.typography.style_for(role),
        (None, None) => SectionStyle::default(),
    };
    let width = request
        .container_width_px
        .unwrap_or(state.template.content_width_px);

    Ok(Json(estimate(&request.text, &style, width)))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

/// Per-request capacity override, or the configured template's capacity.
pub(crate) fn resolve_capacity(
    state: &AppState,
    input: Option<CapacityInput>,
) -> Result<PageCapacity, AppError> {
    let capacity = match input {
        Some(c) => PageCapacity::new(c.content_height_px, c.safety_margin_px)?,
        None => state.template.capacity()?,
    };
    Ok(capacity)
}

/// A section builder laid out at the request's content width.
pub(crate) fn request_builder(
    state: &AppState,
    content_width_px: Option<f64>,
) -> Result<SectionBuilder, AppError> {
    let width = content_width_px.unwrap_or(state.template.content_width_px);
    if !width.is_finite() || width <= 0.0 {
        return Err(AppError::Validation(format!(
            "content_width_px must be a positive number, got {width}"
        )));
    }
    Ok(SectionBuilder::new(
        state.typography.clone().with_container_width(width),
    ))
}

/// Composes the plan off the async executor.
pub(crate) async fn plan_blocking(
    items: Vec<QuizItem>,
    capacity: PageCapacity,
) -> Result<PagePlan, AppError> {
    tokio::task::spawn_blocking(move || compose(&items, &capacity))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in print planning: {e}")))
}

fn build_item(builder: &SectionBuilder, input: ItemInput) -> Result<QuizItem, PlanError> {
    let sections: Vec<ContentSection> = input
        .sections
        .into_iter()
        .map(|section| match (section.height_px, section.style) {
            (Some(height), _) => ContentSection::fixed(section.role, section.text, height),
            (None, Some(style)) => builder.styled(section.role, section.text, style),
            (None, None) => builder.section(section.role, section.text),
        })
        .collect();

    QuizItem::new(
        input.id.unwrap_or_else(Uuid::new_v4),
        sections,
        input.grouping_hint,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
