//! Terminal implementations of the host seams.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stack_analysis::{ManifestResolver, PanelContent, ProjectDataProvider, ReportPanel};
use stack_core::constants::EXT_TITLE;
use stack_core::events::{AnalysisEventHandler, ErrorMessageEvent, NoticeEvent, StatusEvent};
use stack_core::models::ProjectData;
use stack_core::{AnalysisError, Ecosystem, Report};

/// Reads the manifest straight from disk. `target` is either the manifest
/// itself or the directory that holds it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDataProvider;

impl FileDataProvider {
    async fn read(&self, ecosystem: Ecosystem, target: &Path) -> Result<ProjectData, AnalysisError> {
        let manifest = manifest_path(ecosystem, target);
        let content = tokio::fs::read(&manifest).await.map_err(|e| {
            AnalysisError::resolution(format!("cannot read {}: {e}", manifest.display()))
        })?;

        Ok(ProjectData {
            file_name: ecosystem.manifest_file_name().to_string(),
            content_type: content_type(ecosystem).to_string(),
            manifest_path: target.to_path_buf(),
            content,
        })
    }
}

#[async_trait]
impl ProjectDataProvider for FileDataProvider {
    async fn effective_pom(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.read(Ecosystem::Maven, target).await
    }

    async fn effective_package(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.read(Ecosystem::Npm, target).await
    }

    async fn effective_pypi(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.read(Ecosystem::Pypi, target).await
    }

    async fn effective_golang(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.read(Ecosystem::Golang, target).await
    }
}

fn manifest_path(ecosystem: Ecosystem, target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(ecosystem.manifest_file_name())
    } else {
        target.to_path_buf()
    }
}

fn content_type(ecosystem: Ecosystem) -> &'static str {
    match ecosystem {
        Ecosystem::Maven => "application/xml",
        Ecosystem::Npm => "application/json",
        Ecosystem::Pypi | Ecosystem::Golang => "text/plain",
    }
}

/// Resolution step for the terminal: the workspace must exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestCheck;

#[async_trait]
impl ManifestResolver for ManifestCheck {
    async fn trigger(&self, workspace_root: &Path) -> Result<(), AnalysisError> {
        match tokio::fs::metadata(workspace_root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(AnalysisError::resolution(format!(
                "{} is not a directory",
                workspace_root.display()
            ))),
            Err(e) => Err(AnalysisError::resolution(format!(
                "cannot open workspace {}: {e}",
                workspace_root.display()
            ))),
        }
    }
}

/// Prints the report to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePanel;

impl ReportPanel for ConsolePanel {
    fn update(&self, content: PanelContent) {
        match content {
            PanelContent::Report(Report::Json(value)) => {
                match serde_json::to_string_pretty(&value) {
                    Ok(text) => println!("{text}"),
                    Err(e) => tracing::warn!("cannot render report: {e}"),
                }
            }
            PanelContent::Report(Report::Html(bytes)) => {
                println!("{EXT_TITLE}: HTML report ready ({} bytes)", bytes.len());
            }
            PanelContent::Error => {}
        }
    }
}

/// Mirrors status and messages on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleHandler;

impl AnalysisEventHandler for ConsoleHandler {
    fn on_status(&self, event: &StatusEvent) {
        eprintln!("[{EXT_TITLE}] {}: {}", event.ecosystem, event.status);
    }

    fn on_error_message(&self, event: &ErrorMessageEvent) {
        eprintln!("[{EXT_TITLE}] error: {}", event.message);
    }

    fn on_notice(&self, event: &NoticeEvent) {
        eprintln!("[{EXT_TITLE}] {}", event.message);
    }

    fn on_report_ready(&self, event: &stack_core::events::ReportReadyEvent) {
        if let Some(ref path) = event.report_file {
            eprintln!("[{EXT_TITLE}] report written to {}", path.display());
        }
    }
}
