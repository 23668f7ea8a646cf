//! The external asset-hosting capability this service delegates to.
//!
//! Storage, search and delivery all live behind [`AssetProvider`]; the rest of
//! the crate only reshapes what it returns.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A folder-scoped search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub folder: String,
    pub sort_by: String,
    pub descending: bool,
    pub max_results: u32,
}

impl SearchQuery {
    /// Newest assets first, capped at `max_results`.
    pub fn newest_in(folder: impl Into<String>, max_results: u32) -> Self {
        Self {
            folder: folder.into(),
            sort_by: "created_at".into(),
            descending: true,
            max_results,
        }
    }

    pub fn expression(&self) -> String {
        format!("folder:{}", self.folder)
    }

    pub fn direction(&self) -> &'static str {
        if self.descending { "desc" } else { "asc" }
    }
}

/// Parameters forwarded with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    /// `auto` lets the provider detect image/video/raw.
    pub resource_type: String,
    /// Name sent with the file part.
    pub file_name: Option<String>,
    /// Free-text metadata attached provider-side.
    pub context: BTreeMap<String, String>,
}

/// One resource from a search response. Every field may be missing or
/// `null`; either way it decodes to its default so one odd resource never
/// fails the whole listing.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProviderAsset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secure_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub format: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bytes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProviderAsset {
    /// Look up a context value under `context.custom.<key>`, falling back to
    /// `context.<key>`. Non-string values count as absent.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        let context = self.context.as_ref()?;
        context
            .get("custom")
            .and_then(Value::as_object)
            .and_then(|custom| custom.get(key))
            .or_else(|| context.get(key))
            .and_then(Value::as_str)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<ProviderAsset>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// What the provider hands back after storing a file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
    #[serde(default)]
    pub resource_type: Option<String>,
}

#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// Run a search and return the resources in provider order.
    async fn search(&self, query: &SearchQuery) -> ProviderResult<Vec<ProviderAsset>>;

    /// Upload the file at `path`.
    async fn upload(&self, path: &Path, options: &UploadOptions) -> ProviderResult<UploadedAsset>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_fields_decode_as_defaults() {
        let asset: ProviderAsset = serde_json::from_value(json!({
            "public_id": "steam4all/raw",
            "secure_url": null,
            "format": null,
            "resource_type": "raw",
            "bytes": null,
            "created_at": null,
            "context": null
        }))
        .unwrap();
        assert_eq!(asset.public_id, "steam4all/raw");
        assert_eq!(asset.format, "");
        assert_eq!(asset.secure_url, "");
        assert_eq!(asset.bytes, 0);
        assert!(asset.context.is_none());
    }

    #[test]
    fn resource_without_identifier_still_decodes() {
        let response: SearchResponse = serde_json::from_value(json!({
            "resources": [
                { "secure_url": "https://res.example.com/x.png" },
                { "public_id": null, "format": "png" },
                { "public_id": "steam4all/ok", "format": "png", "bytes": 10 }
            ]
        }))
        .unwrap();
        assert_eq!(response.resources.len(), 3);
        assert_eq!(response.resources[0].public_id, "");
        assert_eq!(response.resources[2].bytes, 10);
    }

    #[test]
    fn null_resource_list_is_empty() {
        let response: SearchResponse =
            serde_json::from_value(json!({ "resources": null, "total_count": 0 })).unwrap();
        assert!(response.resources.is_empty());
    }
}
