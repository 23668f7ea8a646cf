//! Response bodies for the listing and upload routes.

use super::asset::AssetRecord;
use serde::Serialize;

/// Body of a successful `POST /upload`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub public_id: String,
    #[serde(rename = "studentName")]
    pub student_name: String,
}

/// Body of a successful `GET /projects`.
#[derive(Serialize, Debug, Clone)]
pub struct ProjectListResponse {
    pub success: bool,
    pub count: usize,
    pub items: Vec<AssetRecord>,
}

impl ProjectListResponse {
    pub fn new(items: Vec<AssetRecord>) -> Self {
        Self {
            success: true,
            count: items.len(),
            items,
        }
    }
}
