//! Lifecycle orchestration: ecosystem resolution, submission strategy,
//! polling, terminal status, and central error handling.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stack_core::config::{ConfigSource, StackConfig};
use stack_core::errors::StackErrorCode;
use stack_core::events::{
    AnalysisEventHandler, ErrorMessageEvent, EventDispatcher, ReportReadyEvent, StatusEvent,
    StatusMessage,
};
use stack_core::models::{
    AnalysisOutcome, AnalysisRequest, DirectAnalysisOptions, Ecosystem, Report, RequestHeaders,
    SubmissionOptions, SubmissionStrategy,
};
use stack_core::{lifecycle_span, AnalysisError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use crate::poll::PollLoop;
use crate::ports::{
    resolve_project_data, DirectAnalyzer, ManifestResolver, PanelContent, PayloadBuilder,
    ProjectDataProvider, ReportPanel,
};
use crate::report::persist_report;
use crate::resolver;
use crate::single_flight::SingleFlight;
use crate::token::{self, TokenValidation};
use crate::transport::protocol;
use crate::transport::Transport;

/// Everything the engine needs from its host.
pub struct Collaborators {
    pub config: Arc<dyn ConfigSource>,
    pub transport: Arc<dyn Transport>,
    pub data_provider: Arc<dyn ProjectDataProvider>,
    pub manifest_resolver: Arc<dyn ManifestResolver>,
    pub payload_builder: Arc<dyn PayloadBuilder>,
    pub direct_analyzer: Arc<dyn DirectAnalyzer>,
}

/// The stack analysis orchestrator. One engine serves any number of
/// lifecycles; lifecycles for the same `(ecosystem, target)` never overlap.
pub struct StackAnalysisEngine {
    config: Arc<dyn ConfigSource>,
    transport: Arc<dyn Transport>,
    data_provider: Arc<dyn ProjectDataProvider>,
    manifest_resolver: Arc<dyn ManifestResolver>,
    payload_builder: Arc<dyn PayloadBuilder>,
    direct_analyzer: Arc<dyn DirectAnalyzer>,
    panel: Option<Arc<dyn ReportPanel>>,
    events: EventDispatcher,
    in_flight: SingleFlight,
}

/// Terminal result plus where the report landed on disk, if anywhere.
struct Completion {
    outcome: AnalysisOutcome,
    report_file: Option<PathBuf>,
}

impl From<AnalysisError> for Completion {
    fn from(err: AnalysisError) -> Self {
        Self {
            outcome: AnalysisOutcome::Failure(err),
            report_file: None,
        }
    }
}

impl StackAnalysisEngine {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            config: collaborators.config,
            transport: collaborators.transport,
            data_provider: collaborators.data_provider,
            manifest_resolver: collaborators.manifest_resolver,
            payload_builder: collaborators.payload_builder,
            direct_analyzer: collaborators.direct_analyzer,
            panel: None,
            events: EventDispatcher::new(),
            in_flight: SingleFlight::new(),
        }
    }

    /// Attach the report display surface.
    pub fn with_panel(mut self, panel: Arc<dyn ReportPanel>) -> Self {
        self.panel = Some(panel);
        self
    }

    /// Register an observer for status, messages, and report events.
    pub fn with_handler(mut self, handler: Arc<dyn AnalysisEventHandler>) -> Self {
        self.events.register(handler);
        self
    }

    pub fn in_flight(&self) -> &SingleFlight {
        &self.in_flight
    }

    /// Resolve the target for `ecosystem` and run a full lifecycle.
    pub async fn process_stack_analyses(
        &self,
        workspace_root: &Path,
        ecosystem: Ecosystem,
        uri: Option<&Path>,
    ) -> AnalysisOutcome {
        let request = resolver::resolve(ecosystem, workspace_root, uri);
        self.run(&request).await
    }

    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self.run_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Run one lifecycle. Cancelling `cancel` stops it at the next
    /// suspension point and resolves it as `Failure(Cancelled)`.
    pub async fn run_with_cancellation(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> AnalysisOutcome {
        let span = lifecycle_span!(request.ecosystem, request.target_path);
        async {
            // A rejected duplicate never started: it gets an error message but
            // must not touch the panel or status owned by the running lifecycle.
            let _guard = match self
                .in_flight
                .try_acquire(request.ecosystem, &request.target_path)
            {
                Ok(guard) => guard,
                Err(e) => {
                    self.show_error(&e);
                    return AnalysisOutcome::Failure(e);
                }
            };

            self.emit_status(request.ecosystem, StatusMessage::Resolving);
            let completion = self.drive(request, cancel).await;
            self.finish(request, completion)
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, request: &AnalysisRequest, cancel: &CancellationToken) -> Completion {
        let config = match self.config.load() {
            Ok(config) => config,
            Err(e) => return AnalysisError::from(e).into(),
        };

        let result = match request.ecosystem.strategy() {
            SubmissionStrategy::Direct => self.run_direct(request, &config, cancel).await,
            SubmissionStrategy::SubmitThenPoll => {
                self.run_submit_then_poll(request, &config, cancel).await
            }
        };
        result.unwrap_or_else(Completion::from)
    }

    async fn run_direct(
        &self,
        request: &AnalysisRequest,
        config: &StackConfig,
        cancel: &CancellationToken,
    ) -> Result<Completion, AnalysisError> {
        let crda_host = config.api.require_crda_host()?;

        cancellable(cancel, self.manifest_resolver.trigger(&request.workspace_root)).await?;
        self.emit_status(request.ecosystem, StatusMessage::Analyzing);

        let options = DirectAnalysisOptions::new(crda_host, config.api.snyk_token());
        let bytes = cancellable(
            cancel,
            self.direct_analyzer
                .stack_analysis(&request.target_path, &options),
        )
        .await?;

        let path = config.report.effective_file_path();
        persist_report(&path, &bytes).await?;

        Ok(Completion {
            outcome: AnalysisOutcome::Success(Report::Html(bytes)),
            report_file: Some(path),
        })
    }

    async fn run_submit_then_poll(
        &self,
        request: &AnalysisRequest,
        config: &StackConfig,
        cancel: &CancellationToken,
    ) -> Result<Completion, AnalysisError> {
        let host = config.api.require_host()?;
        let api_key = config.api.require_api_key()?;

        let data = cancellable(
            cancel,
            resolve_project_data(
                self.data_provider.as_ref(),
                request.variant,
                &request.target_path,
            ),
        )
        .await?;
        cancellable(cancel, self.manifest_resolver.trigger(&request.workspace_root)).await?;
        self.emit_status(request.ecosystem, StatusMessage::Analyzing);

        let payload = self.payload_builder.build(&data, request.ecosystem)?;

        let correlation_id = protocol::ambient_correlation_id();
        let submission = SubmissionOptions {
            endpoint_uri: protocol::submission_uri(host, api_key),
            payload,
            headers: RequestHeaders::correlated(correlation_id.as_str()).with_transitive_report(),
        };
        let body = cancellable(cancel, async {
            self.transport
                .post(&submission)
                .await
                .map_err(AnalysisError::Submission)
        })
        .await?;
        let handle = protocol::parse_job_handle(&body).map_err(AnalysisError::Submission)?;
        info!(job_id = %handle, "analyzing your stack");

        let outcome = PollLoop::for_job(
            Arc::clone(&self.transport),
            host,
            api_key,
            &correlation_id,
            handle,
            &config.polling,
        )
        .with_cancellation(cancel)
        .run()
        .await;

        Ok(Completion {
            outcome,
            report_file: None,
        })
    }

    /// Emit the single terminal status and route the outcome to the panel or
    /// the error handler.
    fn finish(&self, request: &AnalysisRequest, completion: Completion) -> AnalysisOutcome {
        let Completion {
            outcome,
            report_file,
        } = completion;

        match outcome {
            AnalysisOutcome::Success(ref report) => {
                self.emit_status(request.ecosystem, StatusMessage::Success);
                self.events.emit_report_ready(&ReportReadyEvent {
                    ecosystem: request.ecosystem,
                    report_file,
                    size_bytes: report.to_bytes().len(),
                });
                if let Some(ref panel) = self.panel {
                    panel.update(PanelContent::Report(report.clone()));
                }
            }
            AnalysisOutcome::Failure(ref err) => {
                let status = if err.is_resolution_phase() {
                    StatusMessage::ResolutionFailed
                } else {
                    StatusMessage::AnalysisFailed
                };
                self.emit_status(request.ecosystem, status);
                self.handle_error(err);
            }
            AnalysisOutcome::Timeout {
                ref job_id,
                attempts,
            } => {
                self.emit_status(request.ecosystem, StatusMessage::AnalysisFailed);
                self.handle_error(&AnalysisError::PollTimeout {
                    job_id: job_id.clone(),
                    attempts,
                });
            }
        }
        outcome
    }

    /// Central error handler: reset the panel to its error state and show the
    /// error to the user.
    pub fn handle_error(&self, err: &AnalysisError) {
        if let Some(ref panel) = self.panel {
            panel.update(PanelContent::Error);
        }
        self.show_error(err);
    }

    fn show_error(&self, err: &AnalysisError) {
        error!(code = err.error_code(), "stack analysis failed: {err}");
        self.events.emit_error_message(&ErrorMessageEvent {
            code: err.error_code(),
            message: err.user_message(),
        });
    }

    fn emit_status(&self, ecosystem: Ecosystem, status: StatusMessage) {
        info!(status = %status, "stack analysis status");
        self.events.emit_status(&StatusEvent::now(ecosystem, status));
    }

    /// Validate the configured token in the background, or tell the user that
    /// none is configured. Never fails.
    pub async fn validate_token(&self) -> TokenValidation {
        match self.config.load() {
            Ok(config) => token::validate_token(Arc::clone(&self.transport), &config.api, &self.events),
            Err(e) => {
                tracing::warn!("skipping token validation: {e}");
                TokenValidation::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for StackAnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackAnalysisEngine")
            .field("has_panel", &self.panel.is_some())
            .field("events", &self.events)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

/// Race `fut` against cancellation.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, AnalysisError>>,
) -> Result<T, AnalysisError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
        result = fut => result,
    }
}
