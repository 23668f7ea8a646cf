//! `POST /upload` — accept a multipart project upload and forward it to the
//! provider.
//!
//! File parts are streamed to a temporary file chunk by chunk, never held
//! whole in memory. The temporary file lives until the handler returns.

use crate::{
    errors::AppError,
    models::{
        form::{ParsedForm, UploadedFile},
        upload::UploadResponse,
    },
    services::project_service::ProjectService,
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
};
use std::{fmt, io, path::Path};
use thiserror::Error;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, error};

/// File field names, in priority order.
pub const FILE_FIELDS: [&str; 3] = ["projectFile", "file", "upload"];

const STUDENT_NAME_FIELD: &str = "studentName";
const UNKNOWN_STUDENT: &str = "Unknown";

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("could not spool upload: {0}")]
    Io(#[from] io::Error),
}

/// POST `/upload`
pub async fn upload_project(
    State(service): State<ProjectService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(upload_failed)?;
    let form = parse_form(multipart).await.map_err(upload_failed)?;

    let student_name = form
        .text(STUDENT_NAME_FIELD)
        .unwrap_or(UNKNOWN_STUDENT)
        .to_string();

    let Some(file) = form.first_file(&FILE_FIELDS) else {
        return Err(AppError::bad_request(
            "No file uploaded (expected field \"projectFile\")",
        ));
    };

    let uploaded = service
        .upload_project(&student_name, file)
        .await
        .map_err(upload_failed)?;

    Ok(Json(UploadResponse {
        success: true,
        url: uploaded.secure_url,
        public_id: uploaded.public_id,
        student_name,
    }))
}

fn upload_failed(err: impl fmt::Display) -> AppError {
    error!("Upload error: {}", err);
    AppError::upstream("Upload failed", err)
}

/// Drain the multipart stream. Parts with a filename are spooled to disk,
/// the rest are read as text. A blank file input (empty filename, no bytes)
/// is dropped so it resolves as missing.
pub async fn parse_form(mut multipart: Multipart) -> Result<ParsedForm, FormError> {
    let mut form = ParsedForm::default();
    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            let file = spool_to_disk(&mut field).await?;
            if file.is_blank() {
                debug!("ignoring empty file input {}", name);
                continue;
            }
            debug!("spooled field {} ({} bytes)", name, file.size_bytes);
            form.push_file(name, file);
        } else {
            let value = field.text().await?;
            form.push_field(name, value);
        }
    }
    Ok(form)
}

async fn spool_to_disk(field: &mut Field<'_>) -> Result<UploadedFile, FormError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);

    // Keep the client's extension so the provider can sniff the format.
    let suffix = file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let (std_file, path) = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile()?
        .into_parts();
    let mut file = File::from_std(std_file);

    let mut size_bytes: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        size_bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(UploadedFile {
        file_name,
        content_type,
        size_bytes,
        path,
    })
}
