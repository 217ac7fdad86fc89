//! Route handlers. Thin: decode, call the port, encode.

use crate::adapters::http::dto::{CalendarExportBody, PlanRequestBody};
use crate::adapters::http::router::AppState;
use crate::domain::calendar::{CALENDAR_CONTENT_TYPE, CALENDAR_DISPOSITION};
use crate::domain::{PlanError, TrainingPlan};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use tracing::instrument;

fn bad_body(rejection: JsonRejection) -> PlanError {
    PlanError::InvalidInput(format!("invalid request body: {}", rejection.body_text()))
}

/// POST /api/training-plan
#[instrument(skip_all)]
pub async fn generate_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PlanRequestBody>, JsonRejection>,
) -> Result<Json<TrainingPlan>, PlanError> {
    let Json(body) = body.map_err(bad_body)?;
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|v| !v.is_empty());

    let plan = state
        .planner
        .generate_plan(body.into_request(authorization))
        .await?;
    Ok(Json(plan))
}

/// POST /api/training-plan/ics
#[instrument(skip_all)]
pub async fn export_calendar(
    State(state): State<AppState>,
    body: Result<Json<CalendarExportBody>, JsonRejection>,
) -> Result<impl IntoResponse, PlanError> {
    let Json(body) = body.map_err(bad_body)?;
    let plan = body
        .plan
        .ok_or_else(|| PlanError::InvalidInput("plan is required".to_string()))?;

    let ics = state.planner.export_calendar(&plan)?;
    Ok((
        [
            (header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CALENDAR_DISPOSITION),
        ],
        ics,
    ))
}

pub async fn health() -> &'static str {
    "ok"
}
