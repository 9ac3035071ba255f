//! # REST API for Budgets
//!
//! Budgets are listed per `YYYY-MM` month. PATCH accepts a partial
//! `BudgetUpdate` so the client can write back recomputed spent amounts
//! without touching the limit.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use shared::{BudgetUpdate, NewBudget};
use tracing::info;

use super::errors::error_response;
use super::user::UserId;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BudgetListQuery {
    pub month: String,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<BudgetListQuery>,
) -> impl IntoResponse {
    info!("GET /api/budgets - user: {}, month: {}", user_id, query.month);

    match state.budget_service.list_budgets(&user_id, &query.month).await {
        Ok(budgets) => (StatusCode::OK, Json(budgets)).into_response(),
        Err(e) => error_response("list budgets", e),
    }
}

pub async fn create_budget(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<NewBudget>,
) -> impl IntoResponse {
    info!("POST /api/budgets - user: {}, request: {:?}", user_id, request);

    match state.budget_service.create_budget(&user_id, request).await {
        Ok(budget) => (StatusCode::CREATED, Json(budget)).into_response(),
        Err(e) => error_response("create budget", e),
    }
}

pub async fn update_budget(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(budget_id): Path<String>,
    Json(update): Json<BudgetUpdate>,
) -> impl IntoResponse {
    info!("PATCH /api/budgets/{} - user: {}, update: {:?}", budget_id, user_id, update);

    match state.budget_service.update_budget(&user_id, &budget_id, update).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(e) => error_response("update budget", e),
    }
}

pub async fn delete_budget(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(budget_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/budgets/{} - user: {}", budget_id, user_id);

    match state.budget_service.delete_budget(&user_id, &budget_id).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(e) => error_response("delete budget", e),
    }
}
