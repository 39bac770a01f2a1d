//! Report persistence for the direct strategy.

use std::path::Path;

use stack_core::AnalysisError;

/// Write `bytes` to `path`, creating missing parent directories and
/// overwriting any previous report.
pub async fn persist_report(path: &Path, bytes: &[u8]) -> Result<(), AnalysisError> {
    let persistence_error = |e: std::io::Error| AnalysisError::Persistence {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(persistence_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(persistence_error)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "report written");
    Ok(())
}
