//! Resolved project data and the multipart payload built from it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dependency data produced by the project data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Path of the manifest the data was derived from.
    pub manifest_path: PathBuf,
    /// Name under which the data is uploaded (e.g. `npmlist-dependencies.txt`).
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A file part of the submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A plain text part of the submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Transport-agnostic multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPayload {
    pub files: Vec<ManifestFile>,
    pub fields: Vec<FormField>,
}

impl ManifestPayload {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
