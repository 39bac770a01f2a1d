//! Ecosystem resolution: which path to analyse and which variant to run.

use std::path::{Path, PathBuf};

use stack_core::models::{AnalysisRequest, Ecosystem};

/// Derive the analysis target for `ecosystem`.
///
/// Pure: the same inputs always produce the same request.
pub fn resolve(
    ecosystem: Ecosystem,
    workspace_root: &Path,
    explicit_uri: Option<&Path>,
) -> AnalysisRequest {
    let target_path = match (ecosystem, explicit_uri) {
        (Ecosystem::Maven, Some(uri)) => uri.to_path_buf(),
        (Ecosystem::Maven, None) => workspace_root.join(Ecosystem::Maven.manifest_file_name()),
        (Ecosystem::Npm | Ecosystem::Pypi, Some(uri)) => {
            strip_manifest(uri, ecosystem.manifest_file_name())
        }
        (Ecosystem::Golang, Some(uri)) => uri.to_path_buf(),
        (_, None) => workspace_root.to_path_buf(),
    };

    AnalysisRequest {
        ecosystem,
        target_path,
        workspace_root: workspace_root.to_path_buf(),
        variant: ecosystem.variant(),
    }
}

/// Keep everything before the first occurrence of `manifest` in `path`.
/// Paths that don't mention the manifest are returned unchanged.
fn strip_manifest(path: &Path, manifest: &str) -> PathBuf {
    let text = path.to_string_lossy();
    let Some(idx) = text.find(manifest) else {
        return path.to_path_buf();
    };

    let prefix = &text[..idx];
    let trimmed = prefix.trim_end_matches(['/', '\\']);
    if !trimmed.is_empty() {
        PathBuf::from(trimmed)
    } else if !prefix.is_empty() {
        // The manifest sits directly under the filesystem root.
        PathBuf::from(&prefix[..1])
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_core::models::EffectiveVariant;

    #[test]
    fn strips_manifest_from_explicit_npm_path() {
        let req = resolve(
            Ecosystem::Npm,
            Path::new("/ws"),
            Some(Path::new("/ws/app/package.json")),
        );
        assert_eq!(req.target_path, PathBuf::from("/ws/app"));
        assert_eq!(req.variant, EffectiveVariant::EffectivePackage);
    }

    #[test]
    fn manifest_at_filesystem_root() {
        assert_eq!(
            strip_manifest(Path::new("/requirements.txt"), "requirements.txt"),
            PathBuf::from("/")
        );
        assert_eq!(
            strip_manifest(Path::new("requirements.txt"), "requirements.txt"),
            PathBuf::from(".")
        );
    }

    #[test]
    fn path_without_manifest_is_kept() {
        assert_eq!(
            strip_manifest(Path::new("/ws/app"), "package.json"),
            PathBuf::from("/ws/app")
        );
    }
}
