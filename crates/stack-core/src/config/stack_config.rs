//! Top-level stack analysis configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ApiConfig, PollingConfig, ReportConfig};
use crate::errors::ConfigError;

/// Name of the project-level config file, looked up in the workspace root.
pub const PROJECT_CONFIG_FILE: &str = "stack-analysis.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`STACK_ANALYSIS_*`)
/// 3. Project config (`stack-analysis.toml` in the workspace root)
/// 4. User config (`~/.stack-analysis/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StackConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub report: ReportConfig,
}

/// Override values supplied by the host (CLI flags, editor settings).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub crda_host: Option<String>,
    pub crda_snyk_token: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub report_file_path: Option<PathBuf>,
}

/// Supplies the configuration a lifecycle runs with. Read once per lifecycle.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<StackConfig, ConfigError>;
}

impl ConfigSource for StackConfig {
    fn load(&self) -> Result<StackConfig, ConfigError> {
        Self::validate(self)?;
        Ok(self.clone())
    }
}

/// Re-reads the layered configuration from disk and env on every load.
#[derive(Debug, Clone)]
pub struct LayeredConfigSource {
    root: PathBuf,
    overrides: ConfigOverrides,
}

impl LayeredConfigSource {
    pub fn new(root: impl Into<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self {
            root: root.into(),
            overrides,
        }
    }
}

impl ConfigSource for LayeredConfigSource {
    fn load(&self) -> Result<StackConfig, ConfigError> {
        StackConfig::load(&self.root, Some(&self.overrides))
    }
}

impl StackConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!("ignoring unreadable user config: {e}");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): explicit overrides
        if let Some(o) = overrides {
            Self::apply_overrides(&mut config, o);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &StackConfig) -> Result<(), ConfigError> {
        if config.polling.poll_interval_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "polling.poll_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.polling.request_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "polling.request_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.stack-analysis/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".stack-analysis").join("config.toml"))
    }

    fn merge_toml_file(config: &mut StackConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StackConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut StackConfig, other: &StackConfig) {
        // Api
        if other.api.host.is_some() {
            base.api.host = other.api.host.clone();
        }
        if other.api.api_key.is_some() {
            base.api.api_key = other.api.api_key.clone();
        }
        if other.api.crda_host.is_some() {
            base.api.crda_host = other.api.crda_host.clone();
        }
        if other.api.crda_snyk_token.is_some() {
            base.api.crda_snyk_token = other.api.crda_snyk_token.clone();
        }

        // Polling
        if other.polling.request_timeout_ms.is_some() {
            base.polling.request_timeout_ms = other.polling.request_timeout_ms;
        }
        if other.polling.poll_interval_ms.is_some() {
            base.polling.poll_interval_ms = other.polling.poll_interval_ms;
        }

        // Report
        if other.report.file_path.is_some() {
            base.report.file_path = other.report.file_path.clone();
        }
    }

    /// Pattern: `STACK_ANALYSIS_HOST`, `STACK_ANALYSIS_POLL_INTERVAL_MS`, etc.
    /// Unparseable numbers are ignored.
    fn apply_env_overrides(config: &mut StackConfig) {
        if let Ok(val) = std::env::var("STACK_ANALYSIS_HOST") {
            config.api.host = Some(val);
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_API_KEY") {
            config.api.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_CRDA_HOST") {
            config.api.crda_host = Some(val);
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_SNYK_TOKEN") {
            config.api.crda_snyk_token = Some(val);
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_REQUEST_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.polling.request_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_POLL_INTERVAL_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.polling.poll_interval_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STACK_ANALYSIS_REPORT_FILE_PATH") {
            config.report.file_path = Some(PathBuf::from(val));
        }
    }

    fn apply_overrides(config: &mut StackConfig, o: &ConfigOverrides) {
        if let Some(ref v) = o.host {
            config.api.host = Some(v.clone());
        }
        if let Some(ref v) = o.api_key {
            config.api.api_key = Some(v.clone());
        }
        if let Some(ref v) = o.crda_host {
            config.api.crda_host = Some(v.clone());
        }
        if let Some(ref v) = o.crda_snyk_token {
            config.api.crda_snyk_token = Some(v.clone());
        }
        if let Some(v) = o.request_timeout_ms {
            config.polling.request_timeout_ms = Some(v);
        }
        if let Some(v) = o.poll_interval_ms {
            config.polling.poll_interval_ms = Some(v);
        }
        if let Some(ref v) = o.report_file_path {
            config.report.file_path = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
