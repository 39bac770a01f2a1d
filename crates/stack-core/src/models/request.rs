use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Ecosystem, EffectiveVariant};

/// One analysis invocation, fully resolved. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ecosystem: Ecosystem,
    /// Manifest file (maven) or project directory the analysis runs against.
    pub target_path: PathBuf,
    pub workspace_root: PathBuf,
    pub variant: EffectiveVariant,
}
