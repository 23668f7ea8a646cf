//! ProjectService — listing and uploading student projects.
//!
//! Holds the provider handle and the configured folder. All storage, search
//! and media work happens provider-side; this layer only builds requests and
//! reshapes results.

use super::provider::{AssetProvider, ProviderResult, SearchQuery, UploadOptions, UploadedAsset};
use crate::models::{
    asset::{AssetRecord, STUDENT_NAME_KEY},
    form::UploadedFile,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info};

/// Upper bound on a single listing. There is no pagination past this.
pub const MAX_LISTED_PROJECTS: u32 = 100;

/// Resource kind requested on upload; the provider picks image/video/raw.
const AUTO_RESOURCE_TYPE: &str = "auto";

#[derive(Clone)]
pub struct ProjectService {
    provider: Arc<dyn AssetProvider>,
    folder: String,
}

impl ProjectService {
    pub fn new(provider: Arc<dyn AssetProvider>, folder: impl Into<String>) -> Self {
        Self {
            provider,
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Newest-first assets in the folder, optionally narrowed to one student.
    ///
    /// The filter is trimmed; a blank filter returns everything.
    pub async fn list_projects(
        &self,
        student_name: Option<&str>,
    ) -> ProviderResult<Vec<AssetRecord>> {
        let query = SearchQuery::newest_in(&self.folder, MAX_LISTED_PROJECTS);
        let resources = self.provider.search(&query).await?;
        debug!(
            "provider returned {} resources for {}",
            resources.len(),
            query.expression()
        );

        let items = resources.into_iter().map(AssetRecord::from);
        let filter = student_name.map(str::trim).filter(|f| !f.is_empty());
        Ok(match filter {
            Some(filter) => items.filter(|item| item.matches_student(filter)).collect(),
            None => items.collect(),
        })
    }

    /// Forward a spooled file to the provider, tagged with the student name.
    pub async fn upload_project(
        &self,
        student_name: &str,
        file: &UploadedFile,
    ) -> ProviderResult<UploadedAsset> {
        let mut context = BTreeMap::new();
        context.insert(STUDENT_NAME_KEY.to_string(), student_name.to_string());

        let options = UploadOptions {
            folder: self.folder.clone(),
            resource_type: AUTO_RESOURCE_TYPE.into(),
            file_name: file.file_name.clone(),
            context,
        };

        let uploaded = self.provider.upload(file.path(), &options).await?;
        info!(
            "uploaded {} ({} bytes, {}) for {} as {} [{}]",
            file.file_name.as_deref().unwrap_or("<unnamed>"),
            file.size_bytes,
            file.content_type.as_deref().unwrap_or("unknown type"),
            student_name,
            uploaded.public_id,
            uploaded.resource_type.as_deref().unwrap_or("auto")
        );
        Ok(uploaded)
    }
}
