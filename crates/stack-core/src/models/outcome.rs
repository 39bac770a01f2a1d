//! Job handles, reports, and the terminal outcome of a lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Server-assigned identifier of an in-progress analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finished analysis report.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Rendered report returned by the direct analysis.
    Html(Vec<u8>),
    /// Report payload returned by the polled job.
    Json(serde_json::Value),
}

impl Report {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Html(bytes) => bytes.clone(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }
}

/// Terminal result of a lifecycle. Exactly one is produced per request.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Success(Report),
    Failure(AnalysisError),
    Timeout { job_id: String, attempts: u64 },
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Success(report) => Some(report),
            _ => None,
        }
    }

    /// Collapse into a `Result`, turning a timeout into its error form.
    pub fn into_result(self) -> Result<Report, AnalysisError> {
        match self {
            Self::Success(report) => Ok(report),
            Self::Failure(err) => Err(err),
            Self::Timeout { job_id, attempts } => {
                Err(AnalysisError::PollTimeout { job_id, attempts })
            }
        }
    }
}
