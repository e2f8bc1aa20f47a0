//! # REST API for Care Logs
//!
//! Endpoints for diaper, feeding and bottle logs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::CareLogMapper;
use crate::AppState;
use shared::{CreateBottleLogRequest, CreateDiaperLogRequest, CreateFeedingLogRequest};

pub async fn list_diapers(State(state): State<AppState>, Path(baby_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/babies/{}/diapers", baby_id);

    match state.diaper_service.list_logs(&baby_id).await {
        Ok(logs) => (StatusCode::OK, Json(CareLogMapper::to_diaper_list_dto(&logs))).into_response(),
        Err(e) => error_response("list diapers", e),
    }
}

pub async fn create_diaper(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<CreateDiaperLogRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies/{}/diapers - request: {:?}", baby_id, request);

    let command = match CareLogMapper::to_diaper_command(&baby_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("log diaper", e.into()),
    };
    match state.diaper_service.create_log(command).await {
        Ok(log) => (StatusCode::CREATED, Json(CareLogMapper::diaper_to_dto(&log))).into_response(),
        Err(e) => error_response("log diaper", e),
    }
}

pub async fn delete_diaper(
    State(state): State<AppState>,
    Path((baby_id, log_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/babies/{}/diapers/{}", baby_id, log_id);

    match state.diaper_service.delete_log(&baby_id, &log_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete diaper", e),
    }
}

pub async fn list_feedings(State(state): State<AppState>, Path(baby_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/babies/{}/feedings", baby_id);

    match state.feeding_service.list_logs(&baby_id).await {
        Ok(logs) => (StatusCode::OK, Json(CareLogMapper::to_feeding_list_dto(&logs))).into_response(),
        Err(e) => error_response("list feedings", e),
    }
}

pub async fn create_feeding(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<CreateFeedingLogRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies/{}/feedings - request: {:?}", baby_id, request);

    let command = match CareLogMapper::to_feeding_command(&baby_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("log feeding", e.into()),
    };
    match state.feeding_service.create_log(command).await {
        Ok(log) => (StatusCode::CREATED, Json(CareLogMapper::feeding_to_dto(&log))).into_response(),
        Err(e) => error_response("log feeding", e),
    }
}

pub async fn delete_feeding(
    State(state): State<AppState>,
    Path((baby_id, log_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/babies/{}/feedings/{}", baby_id, log_id);

    match state.feeding_service.delete_log(&baby_id, &log_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete feeding", e),
    }
}

pub async fn list_bottles(State(state): State<AppState>, Path(baby_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/babies/{}/bottles", baby_id);

    match state.bottle_service.list_logs(&baby_id).await {
        Ok(logs) => (StatusCode::OK, Json(CareLogMapper::to_bottle_list_dto(&logs))).into_response(),
        Err(e) => error_response("list bottles", e),
    }
}

pub async fn create_bottle(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<CreateBottleLogRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies/{}/bottles - request: {:?}", baby_id, request);

    let command = match CareLogMapper::to_bottle_command(&baby_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("log bottle", e.into()),
    };
    match state.bottle_service.create_log(command).await {
        Ok(log) => (StatusCode::CREATED, Json(CareLogMapper::bottle_to_dto(&log))).into_response(),
        Err(e) => error_response("log bottle", e),
    }
}

pub async fn delete_bottle(
    State(state): State<AppState>,
    Path((baby_id, log_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/babies/{}/bottles/{}", baby_id, log_id);

    match state.bottle_service.delete_log(&baby_id, &log_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete bottle", e),
    }
}
