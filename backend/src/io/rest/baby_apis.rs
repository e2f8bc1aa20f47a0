//! # REST API for Babies
//!
//! Endpoints for registering, editing and looking up babies.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::BabyMapper;
use crate::AppState;
use shared::{CreateBabyRequest, UpdateBabyRequest};

/// Register a new baby
pub async fn create_baby(
    State(state): State<AppState>,
    Json(request): Json<CreateBabyRequest>,
) -> impl IntoResponse {
    info!("POST /api/babies - request: {:?}", request);

    let command = match BabyMapper::to_create_command(request) {
        Ok(command) => command,
        Err(e) => return error_response("create baby", e.into()),
    };
    match state.baby_service.create_baby(command).await {
        Ok(baby) => (
            StatusCode::CREATED,
            Json(BabyMapper::to_baby_response_dto(baby, "Baby added successfully.")),
        )
            .into_response(),
        Err(e) => error_response("create baby", e),
    }
}

/// Edit a baby's name, date of birth or parent email
pub async fn update_baby(
    State(state): State<AppState>,
    Path(baby_id): Path<String>,
    Json(request): Json<UpdateBabyRequest>,
) -> impl IntoResponse {
    info!("PUT /api/babies/{} - request: {:?}", baby_id, request);

    let command = match BabyMapper::to_update_command(&baby_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("update baby", e.into()),
    };
    match state.baby_service.update_baby(command).await {
        Ok(baby) => (
            StatusCode::OK,
            Json(BabyMapper::to_baby_response_dto(baby, "Baby updated successfully.")),
        )
            .into_response(),
        Err(e) => error_response("update baby", e),
    }
}

/// Get a baby by ID
pub async fn get_baby(State(state): State<AppState>, Path(baby_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/babies/{}", baby_id);

    match state.baby_service.get_baby(&baby_id).await {
        Ok(Some(baby)) => (StatusCode::OK, Json(BabyMapper::to_dto(baby))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Baby not found").into_response(),
        Err(e) => error_response("get baby", e),
    }
}

/// List all babies
pub async fn list_babies(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/babies");

    match state.baby_service.list_babies().await {
        Ok(babies) => (StatusCode::OK, Json(BabyMapper::to_baby_list_dto(babies))).into_response(),
        Err(e) => error_response("list babies", e),
    }
}
