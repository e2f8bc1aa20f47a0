//! # REST API for the Daily Log Archive

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::CareLogMapper;
use crate::AppState;

/// Every day with logs, newest first
pub async fn list_daily_logs(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}/daily-logs", baby_id);

    match state.daily_log_service.list_days(&baby_id).await {
        Ok(days) => (StatusCode::OK, Json(CareLogMapper::to_daily_logs_dto(days))).into_response(),
        Err(e) => error_response("list daily logs", e),
    }
}
