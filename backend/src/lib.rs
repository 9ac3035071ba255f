//! # Finance Tracker Backend
//!
//! Storage, business rules and the HTTP API for the personal finance
//! tracker, organised in three layers:
//!
//! - **storage**: SQLite repositories and the change feed
//! - **domain**: one service per table, validating and scoping by user
//! - **io**: the axum REST API and the SSE change stream
//!
//! The same [`AppState`] can be served over HTTP with [`create_router`] or
//! used in-process by an embedding client.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{BudgetService, CategoryService, GoalService, SettingsService, TransactionService};
use crate::storage::DbConnection;

pub use domain::DomainError;

#[derive(Clone)]
pub struct AppState {
    pub connection: Arc<DbConnection>,
    pub transaction_service: TransactionService<DbConnection>,
    pub category_service: CategoryService<DbConnection>,
    pub budget_service: BudgetService<DbConnection>,
    pub goal_service: GoalService<DbConnection>,
    pub settings_service: SettingsService<DbConnection>,
}

impl AppState {
    pub fn new(db_conn: DbConnection) -> Self {
        let connection = Arc::new(db_conn);
        Self {
            transaction_service: TransactionService::new(connection.clone()),
            category_service: CategoryService::new(connection.clone()),
            budget_service: BudgetService::new(connection.clone()),
            goal_service: GoalService::new(connection.clone()),
            settings_service: SettingsService::new(connection.clone()),
            connection,
        }
    }

    /// State over a fresh in-memory database
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(DbConnection::init_in_memory().await?))
    }
}

pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::new(db_conn))
}

pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(io::USER_ID_HEADER),
        ]);

    let api_routes = Router::new()
        .route("/health", get(io::health))
        .route("/transactions", get(io::list_transactions).post(io::create_transaction))
        .route("/transactions/expenses", get(io::list_expenses))
        .route("/transactions/:id", delete(io::delete_transaction))
        .route("/categories", get(io::list_categories).post(io::create_category))
        .route("/categories/batch", post(io::create_categories))
        .route("/budgets", get(io::list_budgets).post(io::create_budget))
        .route("/budgets/:id", patch(io::update_budget).delete(io::delete_budget))
        .route("/goals", get(io::list_goals).post(io::create_goal))
        .route("/goals/:id", patch(io::update_goal).delete(io::delete_goal))
        .route(
            "/settings",
            get(io::get_settings).post(io::create_settings).patch(io::update_settings),
        )
        .route("/changes", get(io::stream_changes));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
