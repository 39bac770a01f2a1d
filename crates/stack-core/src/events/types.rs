//! Event payload types.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::models::Ecosystem;

/// Progress status shown by the host while a lifecycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusMessage {
    Resolving,
    Analyzing,
    Success,
    AnalysisFailed,
    ResolutionFailed,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            Self::Resolving => "Resolving dependencies...",
            Self::Analyzing => "Analyzing dependencies...",
            Self::Success => "Successfully analyzed dependencies",
            Self::AnalysisFailed => "Failed to analyze dependencies",
            Self::ResolutionFailed => "Failed to resolve dependencies",
        }
    }

    /// Terminal statuses end a lifecycle; exactly one is emitted per lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::AnalysisFailed | Self::ResolutionFailed
        )
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Payload for `on_status`.
#[derive(Debug, Clone)]
pub struct StatusEvent {
    pub ecosystem: Ecosystem,
    pub status: StatusMessage,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn now(ecosystem: Ecosystem, status: StatusMessage) -> Self {
        Self {
            ecosystem,
            status,
            at: Utc::now(),
        }
    }
}

/// Payload for `on_error_message`.
#[derive(Debug, Clone)]
pub struct ErrorMessageEvent {
    pub code: &'static str,
    pub message: String,
}

/// Payload for `on_notice`.
#[derive(Debug, Clone)]
pub struct NoticeEvent {
    pub message: String,
}

/// Payload for `on_report_ready`.
#[derive(Debug, Clone)]
pub struct ReportReadyEvent {
    pub ecosystem: Ecosystem,
    /// Set when the report was also written to disk.
    pub report_file: Option<PathBuf>,
    pub size_bytes: usize,
}
