pub mod health_handlers;
pub mod project_handlers;
pub mod upload_handlers;

use crate::errors::AppError;
use axum::http::StatusCode;

/// `OPTIONS` on any route: 200, empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for verbs a route does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}
