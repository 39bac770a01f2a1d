//! Poll loop: query a submitted job on a fixed interval until it completes,
//! the attempt budget runs out, or a request fails.
//!
//! The loop owns its interval timer and cancellation token. Both are released
//! before `run` returns, so every terminal side effect happens in the caller
//! after polling has definitely stopped.

use std::sync::Arc;
use std::time::Duration;

use stack_core::config::PollingConfig;
use stack_core::models::{AnalysisOutcome, GetOptions, JobHandle, Report, RequestHeaders};
use stack_core::{poll_span, AnalysisError};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::transport::protocol::{self, PollStatus};
use crate::transport::Transport;

/// Mutable state of one poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    /// Pending responses still tolerated before giving up.
    pub remaining_attempts: u64,
    pub interval: Duration,
    pub handle: JobHandle,
}

impl PollState {
    pub fn new(handle: JobHandle, polling: &PollingConfig) -> Self {
        Self {
            remaining_attempts: polling.max_attempts(),
            interval: polling.effective_poll_interval(),
            handle,
        }
    }
}

/// A single-use polling task. Consumed by [`PollLoop::run`].
pub struct PollLoop {
    transport: Arc<dyn Transport>,
    request: GetOptions,
    state: PollState,
    cancel: CancellationToken,
}

impl PollLoop {
    pub fn new(transport: Arc<dyn Transport>, request: GetOptions, state: PollState) -> Self {
        Self {
            transport,
            request,
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Poll `{host}/api/v2/stack-analyses/{handle}` with the correlation header.
    pub fn for_job(
        transport: Arc<dyn Transport>,
        host: &str,
        api_key: &str,
        correlation_id: &str,
        handle: JobHandle,
        polling: &PollingConfig,
    ) -> Self {
        let request = GetOptions {
            endpoint_uri: protocol::poll_uri(host, &handle, api_key),
            headers: RequestHeaders::correlated(correlation_id),
        };
        Self::new(transport, request, PollState::new(handle, polling))
    }

    /// Stop polling when `parent` is cancelled. The loop cancels only its own
    /// child token on exit, never the parent.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Handle for cancelling this loop from outside.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Run until a terminal outcome.
    ///
    /// The first request goes out one interval after the call. Ticks never
    /// overlap: the next interval is awaited only after the previous request
    /// has returned.
    pub async fn run(self) -> AnalysisOutcome {
        let span = poll_span!(self.state.handle, self.state.remaining_attempts);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(mut self) -> AnalysisOutcome {
        let period = self.state.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let job_id = self.state.handle.to_string();
        let mut ticks: u64 = 0;

        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break AnalysisOutcome::Failure(AnalysisError::Cancelled),
                _ = ticker.tick() => {}
            }
            ticks += 1;

            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break AnalysisOutcome::Failure(AnalysisError::Cancelled),
                r = self.transport.get(&self.request) => r,
            };

            match response.and_then(|body| protocol::classify_poll_response(&body)) {
                Ok(PollStatus::Ready(report)) => {
                    info!(ticks, "stack report ready");
                    break AnalysisOutcome::Success(Report::Json(report));
                }
                Ok(PollStatus::Pending) => {
                    self.state.remaining_attempts = self.state.remaining_attempts.saturating_sub(1);
                    debug!(
                        remaining = self.state.remaining_attempts,
                        "polling for stack report"
                    );
                    if self.state.remaining_attempts == 0 {
                        warn!(ticks, "stack report not ready within the poll budget");
                        break AnalysisOutcome::Timeout {
                            job_id,
                            attempts: ticks,
                        };
                    }
                }
                Err(source) => {
                    warn!(ticks, "poll request failed: {source}");
                    break AnalysisOutcome::Failure(AnalysisError::PollTransport { job_id, source });
                }
            }
        };

        drop(ticker);
        self.cancel.cancel();
        outcome
    }
}

impl std::fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("state", &self.state)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
