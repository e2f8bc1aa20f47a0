//! # REST API for the Live Sleep Monitor
//!
//! One monitor per baby on this server. It is resumed from the stored
//! checks on first access, follows the stream from then on, and ticks only
//! while a session is open.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use crate::domain::models::sleep_check::CheckKind;
use crate::io::rest::error::error_response;
use crate::io::rest::mappers::SleepCheckMapper;
use crate::AppState;
use shared::MonitorActionRequest;

/// Current timer state and any overdue alerts raised so far
pub async fn get_monitor_status(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}/monitor", baby_id);

    match state.monitors.get_or_resume(&baby_id).await {
        Ok(entry) => {
            let status = SleepCheckMapper::to_monitor_status_dto(
                &baby_id,
                entry.monitor.status(),
                entry.alerts.alerts(),
            );
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => error_response("get monitor status", e),
    }
}

async fn perform_action(state: AppState, baby_id: String, kind: CheckKind, request: MonitorActionRequest) -> Response {
    info!("POST /api/babies/{}/monitor/{} - request: {:?}", baby_id, kind, request);

    let action_name = format!("{} sleep", kind);
    let entry = match state.monitors.get_or_resume(&baby_id).await {
        Ok(entry) => entry,
        Err(e) => return error_response(&action_name, e),
    };

    let action = SleepCheckMapper::to_monitor_action(request);
    let result = match kind {
        CheckKind::Start => entry.monitor.start(action).await,
        CheckKind::Check => entry.monitor.check(action).await,
        CheckKind::Stop => entry.monitor.stop(action).await,
    };

    match result {
        Ok(check) => (StatusCode::CREATED, Json(SleepCheckMapper::to_dto(&check))).into_response(),
        Err(e) => error_response(&action_name, e.into()),
    }
}

pub async fn start_sleep(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<MonitorActionRequest>,
) -> impl IntoResponse {
    perform_action(state, baby_id, CheckKind::Start, request).await
}

pub async fn check_sleep(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<MonitorActionRequest>,
) -> impl IntoResponse {
    perform_action(state, baby_id, CheckKind::Check, request).await
}

pub async fn stop_sleep(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<MonitorActionRequest>,
) -> impl IntoResponse {
    perform_action(state, baby_id, CheckKind::Stop, request).await
}

/// Close the monitor and stop its ticker. Stored checks are untouched.
pub async fn close_monitor(State(state): State<AppState>, Path(baby_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/babies/{}/monitor", baby_id);

    if state.monitors.remove(&baby_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, "No monitor running for this baby").into_response()
    }
}
