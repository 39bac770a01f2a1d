//! Lifecycle errors. Every variant ends the lifecycle; none is retried.

use std::path::PathBuf;

use super::error_code::{self, StackErrorCode};
use super::{ConfigError, TransportError};
use crate::constants::POLL_TIMEOUT_MESSAGE;

/// Errors that terminate a stack analysis lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("unsupported ecosystem: {tag}")]
    InvalidEcosystem { tag: String },

    #[error("failed to resolve dependencies: {reason}")]
    Resolution { reason: String },

    #[error("failed to submit stack analysis: {0}")]
    Submission(#[source] TransportError),

    #[error("failed to fetch stack analysis {job_id}: {source}")]
    PollTransport {
        job_id: String,
        #[source]
        source: TransportError,
    },

    #[error("stack analysis {job_id} did not complete after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u64 },

    #[error("failed to write report to {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("a {ecosystem} analysis of {} is already running", target.display())]
    InFlight { ecosystem: String, target: PathBuf },

    #[error("stack analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn resolution(reason: impl Into<String>) -> Self {
        Self::Resolution {
            reason: reason.into(),
        }
    }

    /// Text shown to the user. The poll timeout gets the "try again later"
    /// wording instead of the diagnostic display text.
    pub fn user_message(&self) -> String {
        match self {
            Self::PollTimeout { .. } => POLL_TIMEOUT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure happened before the backend accepted any work.
    pub fn is_resolution_phase(&self) -> bool {
        matches!(
            self,
            Self::InvalidEcosystem { .. }
                | Self::Resolution { .. }
                | Self::Submission(_)
                | Self::Config(_)
        )
    }
}

impl StackErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEcosystem { .. } => error_code::INVALID_ECOSYSTEM,
            Self::Resolution { .. } => error_code::RESOLUTION_ERROR,
            Self::Submission(_) => error_code::SUBMISSION_ERROR,
            Self::PollTransport { .. } => error_code::POLL_TRANSPORT_ERROR,
            Self::PollTimeout { .. } => error_code::POLL_TIMEOUT,
            Self::Persistence { .. } => error_code::PERSISTENCE_ERROR,
            Self::Config(e) => e.error_code(),
            Self::InFlight { .. } => error_code::IN_FLIGHT,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
