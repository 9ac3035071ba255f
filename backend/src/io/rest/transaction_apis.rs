//! # REST API for Transactions
//!
//! Endpoints for listing, creating and deleting transactions, plus the
//! month-scoped expense query used for budget tracking.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use shared::NewTransaction;
use tracing::info;

use super::errors::error_response;
use super::user::UserId;
use crate::AppState;

// Query parameters for the expenses API
#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub month: String,
    pub category: Option<String>,
}

/// List the user's transactions, newest first
pub async fn list_transactions(State(state): State<AppState>, UserId(user_id): UserId) -> impl IntoResponse {
    info!("GET /api/transactions - user: {}", user_id);

    match state.transaction_service.list_transactions(&user_id).await {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => error_response("list transactions", e),
    }
}

/// Expense transactions within a month, optionally for one category
pub async fn list_expenses(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<ExpenseQuery>,
) -> impl IntoResponse {
    info!("GET /api/transactions/expenses - user: {}, query: {:?}", user_id, query);

    match state
        .transaction_service
        .list_expenses(&user_id, &query.month, query.category.as_deref())
        .await
    {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => error_response("list expenses", e),
    }
}

/// Create a new transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<NewTransaction>,
) -> impl IntoResponse {
    info!("POST /api/transactions - user: {}, request: {:?}", user_id, request);

    match state.transaction_service.create_transaction(&user_id, request).await {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => error_response("create transaction", e),
    }
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{} - user: {}", transaction_id, user_id);

    match state.transaction_service.delete_transaction(&user_id, &transaction_id).await {
        Ok(deleted) => (StatusCode::OK, Json(deleted)).into_response(),
        Err(e) => error_response("delete transaction", e),
    }
}
