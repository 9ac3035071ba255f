//! # REST API Interface Layer
//!
//! HTTP endpoints for the finance tracker. Handlers identify the caller
//! through the `x-user-id` header, hand off to the domain services and
//! translate `DomainError` into status codes:
//!
//! - Validation → 400
//! - NotFound → 404
//! - Conflict → 409
//! - Storage → 500
//!
//! Error bodies are the plain error message. Every handler logs its method
//! and path at info level; failures are logged at error level.

pub mod budget_apis;
pub mod category_apis;
pub mod change_apis;
pub mod errors;
pub mod goal_apis;
pub mod settings_apis;
pub mod transaction_apis;
pub mod user;

pub use budget_apis::*;
pub use category_apis::*;
pub use change_apis::*;
pub use goal_apis::*;
pub use settings_apis::*;
pub use transaction_apis::*;
pub use user::{UserId, USER_ID_HEADER};

use axum::{http::StatusCode, response::IntoResponse};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
