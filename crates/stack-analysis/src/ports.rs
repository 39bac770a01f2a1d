//! Seams to the host: project data, manifest resolution, payload building,
//! direct analysis, and the report panel.

use std::path::Path;

use async_trait::async_trait;
use stack_core::models::{
    DirectAnalysisOptions, Ecosystem, EffectiveVariant, ManifestPayload, ProjectData, Report,
};
use stack_core::AnalysisError;

/// Produces ecosystem-specific dependency data for a target.
#[async_trait]
pub trait ProjectDataProvider: Send + Sync {
    async fn effective_pom(&self, target: &Path) -> Result<ProjectData, AnalysisError>;

    async fn effective_package(&self, target: &Path) -> Result<ProjectData, AnalysisError>;

    async fn effective_pypi(&self, target: &Path) -> Result<ProjectData, AnalysisError>;

    async fn effective_golang(&self, target: &Path) -> Result<ProjectData, AnalysisError>;
}

/// Run the provider method selected by `variant`.
pub async fn resolve_project_data(
    provider: &dyn ProjectDataProvider,
    variant: EffectiveVariant,
    target: &Path,
) -> Result<ProjectData, AnalysisError> {
    match variant {
        EffectiveVariant::EffectivePom => provider.effective_pom(target).await,
        EffectiveVariant::EffectivePackage => provider.effective_package(target).await,
        EffectiveVariant::EffectivePypi => provider.effective_pypi(target).await,
        EffectiveVariant::EffectiveGolang => provider.effective_golang(target).await,
    }
}

/// Manifest resolution side effect. Payload construction reads its output,
/// so it always completes before the payload is built.
#[async_trait]
pub trait ManifestResolver: Send + Sync {
    async fn trigger(&self, workspace_root: &Path) -> Result<(), AnalysisError>;
}

/// Turns resolved project data into a submittable form.
pub trait PayloadBuilder: Send + Sync {
    fn build(
        &self,
        data: &ProjectData,
        ecosystem: Ecosystem,
    ) -> Result<ManifestPayload, AnalysisError>;
}

/// The synchronous analysis used by the direct strategy.
#[async_trait]
pub trait DirectAnalyzer: Send + Sync {
    /// Returns the rendered report bytes.
    async fn stack_analysis(
        &self,
        target: &Path,
        options: &DirectAnalysisOptions,
    ) -> Result<Vec<u8>, AnalysisError>;
}

/// What the report panel should display.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Report(Report),
    Error,
}

/// Report display surface owned by the host.
pub trait ReportPanel: Send + Sync {
    fn update(&self, content: PanelContent);
}
