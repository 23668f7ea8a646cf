//! Parsed multipart form: text fields in memory, files on disk.

use std::{collections::HashMap, path::Path};
use tempfile::TempPath;

/// A file field spooled to a temporary location.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    /// Name the client gave the file, if any.
    pub file_name: Option<String>,

    /// Declared MIME type of the part.
    pub content_type: Option<String>,

    /// Bytes written to disk.
    pub size_bytes: u64,

    pub path: TempPath,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What a browser sends for a file input left empty.
    pub fn is_blank(&self) -> bool {
        self.size_bytes == 0 && self.file_name.as_deref().is_none_or(str::is_empty)
    }
}

/// Every field name maps to the values in the order they arrived, so a name
/// sent once and a name sent repeatedly resolve the same way: first wins.
#[derive(Debug, Default)]
pub struct ParsedForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl ParsedForm {
    pub fn push_field(&mut self, name: impl Into<String>, value: String) {
        self.fields.entry(name.into()).or_default().push(value);
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.entry(name.into()).or_default().push(file);
    }

    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First file under the first of `names` that has one.
    pub fn first_file(&self, names: &[&str]) -> Option<&UploadedFile> {
        names
            .iter()
            .find_map(|name| self.files.get(*name).and_then(|files| files.first()))
    }
}
