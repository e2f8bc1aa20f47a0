//! # REST API for Daily Reports

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::commands::reports::SendReportCommand;
use crate::io::rest::error::error_response;
use crate::AppState;
use shared::{SendReportRequest, SendReportResponse};

/// Email a day's sleep report to the baby's parent
pub async fn send_report(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<SendReportRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies/{}/reports - request: {:?}", baby_id, request);

    let date = match request.date.as_deref().map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")) {
        None => None,
        Some(Ok(date)) => Some(date),
        Some(Err(_)) => {
            warn!("Invalid report date: {:?}", request.date);
            return (StatusCode::BAD_REQUEST, "Invalid date format, expected YYYY-MM-DD").into_response();
        }
    };

    let command = SendReportCommand { baby_id, date };
    match state.report_service.send_report(command).await {
        Ok(()) => (StatusCode::OK, Json(SendReportResponse { success: true })).into_response(),
        Err(e) => error_response("send report", e),
    }
}
