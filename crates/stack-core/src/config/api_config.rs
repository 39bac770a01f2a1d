//! Backend endpoints and credentials.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Where the analysis backend lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the stack analysis service.
    pub host: Option<String>,
    /// Key sent as the `user_key` query parameter.
    pub api_key: Option<String>,
    /// Base URL of the token validation and direct analysis service.
    pub crda_host: Option<String>,
    /// Vulnerability-provider token. Empty means not configured.
    pub crda_snyk_token: Option<String>,
}

impl ApiConfig {
    /// Host without a trailing slash, or an error if unset.
    pub fn require_host(&self) -> Result<&str, ConfigError> {
        require(self.host.as_deref(), "api.host").map(|h| h.trim_end_matches('/'))
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        require(self.api_key.as_deref(), "api.api_key")
    }

    pub fn require_crda_host(&self) -> Result<&str, ConfigError> {
        require(self.crda_host.as_deref(), "api.crda_host").map(|h| h.trim_end_matches('/'))
    }

    /// The configured token, with empty strings treated as absent.
    pub fn snyk_token(&self) -> Option<&str> {
        self.crda_snyk_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn require<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingSetting {
            key: key.to_string(),
        })
}
