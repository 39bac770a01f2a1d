//! Report persistence.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REPORT_FILE_NAME;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Where the direct analysis report is written.
    pub file_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Configured path, or the default file in the system temp directory.
    pub fn effective_file_path(&self) -> PathBuf {
        match self.file_path {
            Some(ref p) if !p.as_os_str().is_empty() => p.clone(),
            _ => std::env::temp_dir().join(DEFAULT_REPORT_FILE_NAME),
        }
    }
}
