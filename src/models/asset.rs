//! A listed project asset, flattened from the provider's search result.

use crate::services::provider::ProviderAsset;
use serde::Serialize;

/// Context key under which the student name is attached at upload time.
pub const STUDENT_NAME_KEY: &str = "studentName";

/// One stored file as reported by the provider.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetRecord {
    /// Provider-assigned unique identifier.
    pub public_id: String,

    /// Direct HTTPS delivery URL.
    pub url: String,

    /// File format, usually the extension.
    pub format: String,

    /// Provider category (`image`, `video`, `raw`).
    pub resource_type: String,

    /// Size in bytes.
    pub bytes: u64,

    /// Creation timestamp as formatted by the provider.
    pub created_at: String,

    /// Student-name tag. `None` means the asset was never tagged and
    /// serializes as `null`; a tag with an empty value stays `Some("")`.
    #[serde(rename = "studentName")]
    pub student_name: Option<String>,
}

impl AssetRecord {
    /// Case-insensitive exact match against an already-trimmed filter.
    /// Untagged assets never match.
    pub fn matches_student(&self, filter: &str) -> bool {
        self.student_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase() == filter.to_lowercase())
    }
}

impl From<ProviderAsset> for AssetRecord {
    fn from(raw: ProviderAsset) -> Self {
        let student_name = raw.context_value(STUDENT_NAME_KEY).map(str::to_string);
        Self {
            public_id: raw.public_id,
            url: raw.secure_url,
            format: raw.format,
            resource_type: raw.resource_type,
            bytes: raw.bytes,
            created_at: raw.created_at,
            student_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> ProviderAsset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_fields_and_nested_custom_context() {
        let record = AssetRecord::from(raw(json!({
            "public_id": "steam4all/abc",
            "secure_url": "https://res.example.com/abc.png",
            "format": "png",
            "resource_type": "image",
            "bytes": 2048,
            "created_at": "2025-03-01T10:00:00Z",
            "context": { "custom": { "studentName": "Alice" } }
        })));
        assert_eq!(record.public_id, "steam4all/abc");
        assert_eq!(record.url, "https://res.example.com/abc.png");
        assert_eq!(record.bytes, 2048);
        assert_eq!(record.student_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn flat_context_is_also_accepted() {
        let record = AssetRecord::from(raw(json!({
            "public_id": "p",
            "context": { "studentName": "Bob" }
        })));
        assert_eq!(record.student_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn missing_context_path_yields_absent_tag() {
        for value in [
            json!({ "public_id": "p" }),
            json!({ "public_id": "p", "context": null }),
            json!({ "public_id": "p", "context": {} }),
            json!({ "public_id": "p", "context": { "custom": {} } }),
            json!({ "public_id": "p", "context": { "custom": { "other": "x" } } }),
        ] {
            assert_eq!(AssetRecord::from(raw(value)).student_name, None);
        }
    }

    #[test]
    fn empty_tag_stays_distinct_from_absent() {
        let record = AssetRecord::from(raw(json!({
            "public_id": "p",
            "context": { "custom": { "studentName": "" } }
        })));
        assert_eq!(record.student_name.as_deref(), Some(""));
        assert!(!record.matches_student("alice"));
    }

    #[test]
    fn matching_ignores_case_but_not_substrings() {
        let record = AssetRecord::from(raw(json!({
            "public_id": "p",
            "context": { "custom": { "studentName": "Alice Smith" } }
        })));
        assert!(record.matches_student("alice smith"));
        assert!(record.matches_student("ALICE SMITH"));
        assert!(!record.matches_student("alice"));
    }

    #[test]
    fn absent_tag_serializes_as_null() {
        let record = AssetRecord::from(raw(json!({ "public_id": "p" })));
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["studentName"].is_null());
        assert_eq!(value["url"], "");
    }
}
