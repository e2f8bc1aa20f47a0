//! # REST API for Sleep Checks
//!
//! Endpoints for entering, editing and deleting sleep checks after the
//! fact, and for reading a baby's history as grouped sessions. Live
//! start/check/stop from the nap room goes through the monitor endpoints;
//! an open monitor follows whatever is entered here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use crate::domain::models::sleep_check::CheckKind;
use crate::io::rest::error::error_response;
use crate::io::rest::mappers::SleepCheckMapper;
use crate::AppState;
use shared::{RecordSleepCheckRequest, UpdateSleepCheckRequest};

/// List a baby's sleep checks, newest first
pub async fn list_sleep_checks(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}/sleep-checks", baby_id);

    match state.sleep_check_service.list_checks(&baby_id).await {
        Ok(checks) => (StatusCode::OK, Json(SleepCheckMapper::to_list_dto(&checks))).into_response(),
        Err(e) => error_response("list sleep checks", e),
    }
}

/// Record a sleep check
pub async fn record_sleep_check(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<RecordSleepCheckRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies/{}/sleep-checks - request: {:?}", baby_id, request);

    let command = match SleepCheckMapper::to_record_command(&baby_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("record sleep check", e.into()),
    };
    let check = match state.sleep_check_service.record_check(command).await {
        Ok(check) => check,
        Err(e) => return error_response("record sleep check", e),
    };

    // a start entered by hand arms the overdue alarm like one from the monitor
    if check.kind == CheckKind::Start {
        if let Err(e) = state.monitors.get_or_resume(&baby_id).await {
            warn!("Failed to open sleep monitor for baby {}: {:#}", baby_id, e);
        }
    }
    (StatusCode::CREATED, Json(SleepCheckMapper::to_dto(&check))).into_response()
}

/// Edit a stored sleep check
pub async fn update_sleep_check(
    State(state): State<AppState>,
    Path((baby_id, check_id)): Path<(String, String)>,
    Json(request): Json<UpdateSleepCheckRequest>,
) -> impl IntoResponse {
    info!("PUT /api/babies/{}/sleep-checks/{} - request: {:?}", baby_id, check_id, request);

    let command = match SleepCheckMapper::to_update_command(&baby_id, &check_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("update sleep check", e.into()),
    };
    match state.sleep_check_service.update_check(command).await {
        Ok(check) => (StatusCode::OK, Json(SleepCheckMapper::to_dto(&check))).into_response(),
        Err(e) => error_response("update sleep check", e),
    }
}

/// Delete a sleep check
pub async fn delete_sleep_check(
    State(state): State<AppState>,
    Path((baby_id, check_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/babies/{}/sleep-checks/{}", baby_id, check_id);

    match state.sleep_check_service.delete_check(&baby_id, &check_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete sleep check", e),
    }
}

/// A baby's sleep history grouped into sessions, newest first
pub async fn list_sleep_sessions(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}/sleep-sessions", baby_id);

    match state.sleep_check_service.list_sessions(&baby_id).await {
        Ok(grouping) => (StatusCode::OK, Json(SleepCheckMapper::to_session_list_dto(&grouping))).into_response(),
        Err(e) => error_response("list sleep sessions", e),
    }
}
