//! `GET /projects` — list uploaded projects, optionally for one student.

use crate::{
    errors::AppError, models::upload::ProjectListResponse,
    services::project_service::ProjectService,
};
use axum::{
    Json,
    extract::{Query, State},
};
use tracing::error;

/// Query key carrying the student filter.
const STUDENT_NAME_PARAM: &str = "studentName";

/// GET `/projects?studentName=...`
///
/// Query pairs are taken as a list so a repeated key resolves to its first
/// value instead of rejecting the request.
pub async fn list_projects(
    State(service): State<ProjectService>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let student_name = params
        .iter()
        .find(|(key, _)| key == STUDENT_NAME_PARAM)
        .map(|(_, value)| value.as_str());

    let items = service.list_projects(student_name).await.map_err(|err| {
        error!("List error: {}", err);
        AppError::upstream("Could not list projects", err)
    })?;

    Ok(Json(ProjectListResponse::new(items)))
}
