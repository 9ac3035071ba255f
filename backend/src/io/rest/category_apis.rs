use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::NewCategory;
use tracing::info;

use super::errors::error_response;
use super::user::UserId;
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>, UserId(user_id): UserId) -> impl IntoResponse {
    info!("GET /api/categories - user: {}", user_id);

    match state.category_service.list_categories(&user_id).await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => error_response("list categories", e),
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<NewCategory>,
) -> impl IntoResponse {
    info!("POST /api/categories - user: {}, request: {:?}", user_id, request);

    match state.category_service.create_category(&user_id, request).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => error_response("create category", e),
    }
}

/// Insert several categories in one go; all or nothing
pub async fn create_categories(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(requests): Json<Vec<NewCategory>>,
) -> impl IntoResponse {
    info!("POST /api/categories/batch - user: {}, count: {}", user_id, requests.len());

    match state.category_service.create_categories(&user_id, requests).await {
        Ok(categories) => (StatusCode::CREATED, Json(categories)).into_response(),
        Err(e) => error_response("create categories", e),
    }
}
