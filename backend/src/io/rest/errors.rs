use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::DomainError;

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log a failed operation and turn it into a plain-text error response
pub fn error_response(action: &str, error: DomainError) -> Response {
    error!("Failed to {}: {}", action, error);
    (status_for(&error), error.to_string()).into_response()
}
