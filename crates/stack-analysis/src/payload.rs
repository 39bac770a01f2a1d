//! Default manifest payload layout.

use stack_core::models::{Ecosystem, FormField, ManifestFile, ManifestPayload, ProjectData};
use stack_core::AnalysisError;

use crate::ports::PayloadBuilder;

pub const MANIFEST_FIELD: &str = "manifest[]";
pub const FILE_PATH_FIELD: &str = "filePath[]";
pub const ORIGIN_FIELD: &str = "origin";
pub const ORIGIN: &str = "lsp";

/// One `manifest[]` file part, its `filePath[]`, and the `origin` marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPayloadBuilder;

impl PayloadBuilder for StandardPayloadBuilder {
    fn build(
        &self,
        data: &ProjectData,
        ecosystem: Ecosystem,
    ) -> Result<ManifestPayload, AnalysisError> {
        if data.content.is_empty() {
            return Err(AnalysisError::resolution(format!(
                "{ecosystem} dependency data for {} is empty",
                data.manifest_path.display()
            )));
        }

        Ok(ManifestPayload {
            files: vec![ManifestFile {
                field: MANIFEST_FIELD.to_string(),
                file_name: data.file_name.clone(),
                content_type: data.content_type.clone(),
                content: data.content.clone(),
            }],
            fields: vec![
                FormField {
                    name: FILE_PATH_FIELD.to_string(),
                    value: data.manifest_path.display().to_string(),
                },
                FormField {
                    name: ORIGIN_FIELD.to_string(),
                    value: ORIGIN.to_string(),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn data(content: &[u8]) -> ProjectData {
        ProjectData {
            manifest_path: PathBuf::from("/ws/requirements.txt"),
            file_name: "pylist.json".to_string(),
            content_type: "application/json".to_string(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn builds_manifest_part_and_fields() {
        let payload = StandardPayloadBuilder
            .build(&data(b"[]"), Ecosystem::Pypi)
            .unwrap();
        assert_eq!(payload.files.len(), 1);
        assert_eq!(payload.files[0].field, "manifest[]");
        assert_eq!(payload.files[0].file_name, "pylist.json");
        assert_eq!(payload.field("filePath[]"), Some("/ws/requirements.txt"));
        assert_eq!(payload.field("origin"), Some("lsp"));
    }

    #[test]
    fn empty_data_is_a_resolution_error() {
        let err = StandardPayloadBuilder
            .build(&data(b""), Ecosystem::Pypi)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Resolution { .. }));
    }
}
