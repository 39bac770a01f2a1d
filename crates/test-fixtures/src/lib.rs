//! Test doubles for stack analysis lifecycles.
//!
//! Every double records what it was asked to do. The data provider, manifest
//! resolver, payload builder, and transport share one [`CallLog`] so tests
//! can assert the order in which a lifecycle touched them.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stack_analysis::payload::StandardPayloadBuilder;
use stack_analysis::{
    Collaborators, DirectAnalyzer, ManifestResolver, PanelContent, PayloadBuilder,
    ProjectDataProvider, ReportPanel, StackAnalysisEngine, Transport,
};
use stack_core::config::{ApiConfig, PollingConfig, ReportConfig};
use stack_core::events::{
    AnalysisEventHandler, ErrorMessageEvent, NoticeEvent, ReportReadyEvent, StatusEvent,
    StatusMessage,
};
use stack_core::models::{
    DirectAnalysisOptions, Ecosystem, GetOptions, ManifestPayload, ProjectData, SubmissionOptions,
};
use stack_core::{AnalysisError, StackConfig, TransportError};
use tokio::sync::Notify;

/// Ordered record of collaborator calls, shared between doubles.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Index of the first entry equal to `entry`.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == entry)
    }
}

// ---- Configuration ---------------------------------------------------------

/// Config pointing at fake hosts, with a 10s timeout / 1s interval budget.
pub fn test_config(report_file: &Path) -> StackConfig {
    StackConfig {
        api: ApiConfig {
            host: Some("https://stack.test".to_string()),
            api_key: Some("key-123".to_string()),
            crda_host: Some("https://crda.test".to_string()),
            crda_snyk_token: None,
        },
        polling: PollingConfig {
            request_timeout_ms: Some(10_000),
            poll_interval_ms: Some(1_000),
        },
        report: ReportConfig {
            file_path: Some(report_file.to_path_buf()),
        },
    }
}

/// Project data as a provider would return it for `manifest`.
pub fn sample_project_data(manifest: &Path) -> ProjectData {
    ProjectData {
        manifest_path: manifest.to_path_buf(),
        file_name: "dependencies.txt".to_string(),
        content_type: "text/plain".to_string(),
        content: b"express@4.18.2\nlodash@4.17.21\n".to_vec(),
    }
}

// ---- Transport -------------------------------------------------------------

/// One canned transport response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Body(String),
    Fail(TransportError),
    /// Never completes; only cancellation ends the request.
    Hang,
}

impl Scripted {
    pub fn body(body: impl Into<String>) -> Self {
        Self::Body(body.into())
    }

    /// A poll body the backend sends while the job is still running.
    pub fn pending() -> Self {
        Self::Body(r#"{"error":"Analysis for request ID is in progress"}"#.to_string())
    }

    pub fn ready(report: serde_json::Value) -> Self {
        Self::Body(report.to_string())
    }
}

/// Transport that replays scripted responses and records every request.
/// An exhausted script answers `pending()` to GETs and fails POSTs.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    posts: Mutex<VecDeque<Scripted>>,
    gets: Mutex<VecDeque<Scripted>>,
    post_calls: Mutex<Vec<SubmissionOptions>>,
    get_calls: Mutex<Vec<GetOptions>>,
    log: CallLog,
}

impl ScriptedTransport {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn push_post(&self, response: Scripted) -> &Self {
        self.posts.lock().unwrap().push_back(response);
        self
    }

    pub fn push_get(&self, response: Scripted) -> &Self {
        self.gets.lock().unwrap().push_back(response);
        self
    }

    pub fn post_calls(&self) -> Vec<SubmissionOptions> {
        self.post_calls.lock().unwrap().clone()
    }

    pub fn get_calls(&self) -> Vec<GetOptions> {
        self.get_calls.lock().unwrap().clone()
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.lock().unwrap().len()
    }

    async fn answer(response: Scripted) -> Result<String, TransportError> {
        match response {
            Scripted::Body(body) => Ok(body),
            Scripted::Fail(err) => Err(err),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, options: &SubmissionOptions) -> Result<String, TransportError> {
        self.log.record("post");
        self.post_calls.lock().unwrap().push(options.clone());
        let next = self.posts.lock().unwrap().pop_front();
        match next {
            Some(response) => Self::answer(response).await,
            None => Err(TransportError::network("no scripted POST response")),
        }
    }

    async fn get(&self, options: &GetOptions) -> Result<String, TransportError> {
        self.log.record("get");
        self.get_calls.lock().unwrap().push(options.clone());
        let next = self.gets.lock().unwrap().pop_front();
        Self::answer(next.unwrap_or_else(Scripted::pending)).await
    }
}

// ---- Host seams ------------------------------------------------------------

/// Provider returning [`sample_project_data`] for any target.
#[derive(Debug)]
pub struct StubDataProvider {
    log: CallLog,
    failure: Option<String>,
}

impl StubDataProvider {
    pub fn new(log: CallLog) -> Self {
        Self { log, failure: None }
    }

    pub fn failing(log: CallLog, reason: &str) -> Self {
        Self {
            log,
            failure: Some(reason.to_string()),
        }
    }

    fn provide(&self, variant: &str, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.log.record(format!("provider:{variant}"));
        match self.failure {
            Some(ref reason) => Err(AnalysisError::resolution(reason.clone())),
            None => Ok(sample_project_data(target)),
        }
    }
}

#[async_trait]
impl ProjectDataProvider for StubDataProvider {
    async fn effective_pom(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.provide("effectivePom", target)
    }

    async fn effective_package(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.provide("effectivePackage", target)
    }

    async fn effective_pypi(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.provide("effectivePypi", target)
    }

    async fn effective_golang(&self, target: &Path) -> Result<ProjectData, AnalysisError> {
        self.provide("effectiveGolang", target)
    }
}

#[derive(Debug)]
pub struct StubManifestResolver {
    log: CallLog,
}

impl StubManifestResolver {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl ManifestResolver for StubManifestResolver {
    async fn trigger(&self, _workspace_root: &Path) -> Result<(), AnalysisError> {
        self.log.record("resolver");
        Ok(())
    }
}

/// [`StandardPayloadBuilder`] that logs each build.
#[derive(Debug)]
pub struct RecordingPayloadBuilder {
    log: CallLog,
}

impl RecordingPayloadBuilder {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl PayloadBuilder for RecordingPayloadBuilder {
    fn build(
        &self,
        data: &ProjectData,
        ecosystem: Ecosystem,
    ) -> Result<ManifestPayload, AnalysisError> {
        self.log.record("build");
        StandardPayloadBuilder.build(data, ecosystem)
    }
}

/// Direct analyzer returning fixed bytes. With a gate it parks after
/// signalling `started` until the gate is notified.
#[derive(Debug)]
pub struct StubDirectAnalyzer {
    bytes: Vec<u8>,
    gate: Option<Arc<Notify>>,
    started: Arc<Notify>,
    calls: Mutex<Vec<(PathBuf, DirectAnalysisOptions)>>,
}

impl StubDirectAnalyzer {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            gate: None,
            started: Arc::new(Notify::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(bytes: &[u8], gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(bytes)
        }
    }

    /// Notified once a call has begun.
    pub fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }

    pub fn calls(&self) -> Vec<(PathBuf, DirectAnalysisOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectAnalyzer for StubDirectAnalyzer {
    async fn stack_analysis(
        &self,
        target: &Path,
        options: &DirectAnalysisOptions,
    ) -> Result<Vec<u8>, AnalysisError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.to_path_buf(), options.clone()));
        self.started.notify_one();
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        Ok(self.bytes.clone())
    }
}

// ---- Observers -------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingPanel {
    updates: Mutex<Vec<PanelContent>>,
}

impl RecordingPanel {
    pub fn updates(&self) -> Vec<PanelContent> {
        self.updates.lock().unwrap().clone()
    }
}

impl ReportPanel for RecordingPanel {
    fn update(&self, content: PanelContent) {
        self.updates.lock().unwrap().push(content);
    }
}

#[derive(Debug, Default)]
pub struct RecordingHandler {
    statuses: Mutex<Vec<StatusMessage>>,
    errors: Mutex<Vec<ErrorMessageEvent>>,
    notices: Mutex<Vec<String>>,
    reports: Mutex<Vec<ReportReadyEvent>>,
}

impl RecordingHandler {
    pub fn statuses(&self) -> Vec<StatusMessage> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn terminal_statuses(&self) -> Vec<StatusMessage> {
        self.statuses()
            .into_iter()
            .filter(StatusMessage::is_terminal)
            .collect()
    }

    pub fn errors(&self) -> Vec<ErrorMessageEvent> {
        self.errors.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<ReportReadyEvent> {
        self.reports.lock().unwrap().clone()
    }
}

impl AnalysisEventHandler for RecordingHandler {
    fn on_status(&self, event: &StatusEvent) {
        self.statuses.lock().unwrap().push(event.status);
    }

    fn on_error_message(&self, event: &ErrorMessageEvent) {
        self.errors.lock().unwrap().push(event.clone());
    }

    fn on_notice(&self, event: &NoticeEvent) {
        self.notices.lock().unwrap().push(event.message.clone());
    }

    fn on_report_ready(&self, event: &ReportReadyEvent) {
        self.reports.lock().unwrap().push(event.clone());
    }
}

// ---- Harness ---------------------------------------------------------------

/// An engine wired to recording doubles, with handles to each double.
pub struct Harness {
    pub engine: StackAnalysisEngine,
    pub log: CallLog,
    pub transport: Arc<ScriptedTransport>,
    pub direct: Arc<StubDirectAnalyzer>,
    pub panel: Arc<RecordingPanel>,
    pub handler: Arc<RecordingHandler>,
}

impl Harness {
    pub fn new(config: StackConfig) -> Self {
        Self::with_direct(config, StubDirectAnalyzer::new(b"<html>report</html>"))
    }

    pub fn with_direct(config: StackConfig, direct: StubDirectAnalyzer) -> Self {
        let log = CallLog::new();
        Self::build(config, direct, StubDataProvider::new(log.clone()), log)
    }

    pub fn with_failing_provider(config: StackConfig, reason: &str) -> Self {
        let log = CallLog::new();
        let provider = StubDataProvider::failing(log.clone(), reason);
        Self::build(
            config,
            StubDirectAnalyzer::new(b"<html>report</html>"),
            provider,
            log,
        )
    }

    fn build(
        config: StackConfig,
        direct: StubDirectAnalyzer,
        provider: StubDataProvider,
        log: CallLog,
    ) -> Self {
        let transport = Arc::new(ScriptedTransport::new(log.clone()));
        let direct = Arc::new(direct);
        let panel = Arc::new(RecordingPanel::default());
        let handler = Arc::new(RecordingHandler::default());

        let engine = StackAnalysisEngine::new(Collaborators {
            config: Arc::new(config),
            transport: Arc::clone(&transport) as Arc<dyn Transport>,
            data_provider: Arc::new(provider),
            manifest_resolver: Arc::new(StubManifestResolver::new(log.clone())),
            payload_builder: Arc::new(RecordingPayloadBuilder::new(log.clone())),
            direct_analyzer: Arc::clone(&direct) as Arc<dyn DirectAnalyzer>,
        })
        .with_panel(Arc::clone(&panel) as Arc<dyn ReportPanel>)
        .with_handler(Arc::clone(&handler) as Arc<dyn AnalysisEventHandler>);

        Self {
            engine,
            log,
            transport,
            direct,
            panel,
            handler,
        }
    }
}
