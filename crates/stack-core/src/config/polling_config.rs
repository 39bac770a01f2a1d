//! Poll loop budget.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS};

/// Configuration for the job status poll loop.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    /// Total time budget for a polled analysis. Default: 120000.
    pub request_timeout_ms: Option<u64>,
    /// Delay between poll ticks. Default: 2000.
    pub poll_interval_ms: Option<u64>,
}

impl PollingConfig {
    pub fn effective_request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub fn effective_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    /// `floor(timeout / interval)`, never below one so a lifecycle always
    /// polls at least once.
    pub fn max_attempts(&self) -> u64 {
        let timeout = self.effective_request_timeout().as_millis();
        let interval = self.effective_poll_interval().as_millis().max(1);
        ((timeout / interval) as u64).max(1)
    }
}
