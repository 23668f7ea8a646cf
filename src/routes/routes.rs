//! Defines the HTTP surface.
//!
//! ## Structure
//! - `GET  /health`   — liveness
//! - `GET  /projects` — list uploaded projects (`?studentName=` filter)
//! - `POST /upload`   — multipart project upload
//!
//! Every route answers `OPTIONS` with an empty 200. `/projects` and `/upload`
//! answer other verbs with a 405 JSON body. The same routes are also mounted
//! under `/api` for clients that keep the serverless-style prefix.

use crate::{
    handlers::{
        health_handlers::healthz, method_not_allowed, preflight,
        project_handlers::list_projects, upload_handlers::upload_project,
    },
    services::project_service::ProjectService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full router. `max_upload_bytes` caps the `/upload` body.
pub fn routes(max_upload_bytes: usize) -> Router<ProjectService> {
    let api = api_routes(max_upload_bytes);

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(max_upload_bytes: usize) -> Router<ProjectService> {
    Router::new()
        .route(
            "/health",
            get(healthz).options(preflight).fallback(healthz),
        )
        .route(
            "/projects",
            get(list_projects)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/upload",
            post(upload_project)
                .options(preflight)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Cross-origin requests are allowed from anywhere.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
