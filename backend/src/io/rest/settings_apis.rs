use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{NewUserSettings, UserSettingsUpdate};
use tracing::info;

use super::errors::error_response;
use super::user::UserId;
use crate::AppState;

/// The user's settings, 404 while none have been created
pub async fn get_settings(State(state): State<AppState>, UserId(user_id): UserId) -> impl IntoResponse {
    info!("GET /api/settings - user: {}", user_id);

    match state.settings_service.get_settings(&user_id).await {
        Ok(Some(settings)) => (StatusCode::OK, Json(settings)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Settings not found").into_response(),
        Err(e) => error_response("get settings", e),
    }
}

pub async fn create_settings(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<NewUserSettings>,
) -> impl IntoResponse {
    info!("POST /api/settings - user: {}, request: {:?}", user_id, request);

    match state.settings_service.create_settings(&user_id, request).await {
        Ok(settings) => (StatusCode::CREATED, Json(settings)).into_response(),
        Err(e) => error_response("create settings", e),
    }
}

pub async fn update_settings(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(update): Json<UserSettingsUpdate>,
) -> impl IntoResponse {
    info!("PATCH /api/settings - user: {}, update: {:?}", user_id, update);

    match state.settings_service.update_settings(&user_id, update).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => error_response("update settings", e),
    }
}
