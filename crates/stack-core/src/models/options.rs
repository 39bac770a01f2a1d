//! Typed per-request options. Built fresh for every network call.

use crate::constants::headers;

use super::ManifestPayload;

/// Headers attached to a backend request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub correlation_id: Option<String>,
    pub transitive_report: bool,
    pub token: Option<String>,
}

impl RequestHeaders {
    /// Headers for a correlated backend call.
    pub fn correlated(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn with_transitive_report(mut self) -> Self {
        self.transitive_report = true;
        self
    }

    /// Headers carrying only the provider token.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Wire representation, in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if self.transitive_report {
            pairs.push((headers::SHOW_TRANSITIVE_REPORT, "true".to_string()));
        }
        if let Some(ref id) = self.correlation_id {
            pairs.push((headers::CORRELATION_ID, id.clone()));
        }
        if let Some(ref token) = self.token {
            pairs.push((headers::SNYK_TOKEN, token.clone()));
        }
        pairs
    }
}

/// A multipart job submission.
#[derive(Debug, Clone)]
pub struct SubmissionOptions {
    pub endpoint_uri: String,
    pub payload: ManifestPayload,
    pub headers: RequestHeaders,
}

/// A plain GET (poll tick or token validation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOptions {
    pub endpoint_uri: String,
    pub headers: RequestHeaders,
}

/// Options handed to the direct (synchronous) analysis call. Built from the
/// configuration loaded for the current lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectAnalysisOptions {
    /// Base URL of the dependency-analysis service, without a trailing slash.
    pub crda_host: String,
    pub token: Option<String>,
}

impl DirectAnalysisOptions {
    /// Empty tokens are treated as absent.
    pub fn new(crda_host: impl Into<String>, token: Option<&str>) -> Self {
        Self {
            crda_host: crda_host.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    /// Headers carrying the token, if any.
    pub fn headers(&self) -> RequestHeaders {
        match self.token {
            Some(ref token) => RequestHeaders::token(token.as_str()),
            None => RequestHeaders::default(),
        }
    }
}
