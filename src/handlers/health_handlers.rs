//! Liveness handler.
//!
//! - GET /health -> `{ok, service, time}`

use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const SERVICE_NAME: &str = "steam4all-server";

/// `GET /health`
///
/// Always 200. Performs no I/O and never touches the provider.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: SERVICE_NAME,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
    time: String,
}
