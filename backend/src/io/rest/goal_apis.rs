//! # REST API for Savings Goals

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{NewSavingsGoal, SavingsGoalUpdate};
use tracing::info;

use super::errors::error_response;
use super::user::UserId;
use crate::AppState;

pub async fn list_goals(State(state): State<AppState>, UserId(user_id): UserId) -> impl IntoResponse {
    info!("GET /api/goals - user: {}", user_id);

    match state.goal_service.list_goals(&user_id).await {
        Ok(goals) => (StatusCode::OK, Json(goals)).into_response(),
        Err(e) => error_response("list goals", e),
    }
}

pub async fn create_goal(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<NewSavingsGoal>,
) -> impl IntoResponse {
    info!("POST /api/goals - user: {}, request: {:?}", user_id, request);

    match state.goal_service.create_goal(&user_id, request).await {
        Ok(goal) => (StatusCode::CREATED, Json(goal)).into_response(),
        Err(e) => error_response("create goal", e),
    }
}

pub async fn update_goal(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(goal_id): Path<String>,
    Json(update): Json<SavingsGoalUpdate>,
) -> impl IntoResponse {
    info!("PATCH /api/goals/{} - user: {}, update: {:?}", goal_id, user_id, update);

    match state.goal_service.update_goal(&user_id, &goal_id, update).await {
        Ok(goal) => (StatusCode::OK, Json(goal)).into_response(),
        Err(e) => error_response("update goal", e),
    }
}

pub async fn delete_goal(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(goal_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/goals/{} - user: {}", goal_id, user_id);

    match state.goal_service.delete_goal(&user_id, &goal_id).await {
        Ok(goal) => (StatusCode::OK, Json(goal)).into_response(),
        Err(e) => error_response("delete goal", e),
    }
}
