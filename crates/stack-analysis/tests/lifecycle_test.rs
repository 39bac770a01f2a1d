//! End-to-end lifecycles through the engine with recording collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stack_analysis::payload::{FILE_PATH_FIELD, MANIFEST_FIELD, ORIGIN, ORIGIN_FIELD};
use stack_analysis::{resolve, PanelContent};
use stack_core::events::StatusMessage;
use stack_core::{
    AnalysisError, AnalysisOutcome, ConfigError, Ecosystem, Report, StackConfig, TransportError,
};
use test_fixtures::{test_config, Harness, Scripted, StubDirectAnalyzer};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

fn report_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("nested").join("out").join("report.html")
}

// ---- Direct strategy -------------------------------------------------------

#[tokio::test]
async fn maven_report_is_persisted_and_shown() {
    let dir = tempfile::tempdir().unwrap();
    let report_file = report_path(&dir);
    let bytes = b"<html><body>3 vulnerable dependencies</body></html>";
    let h = Harness::with_direct(test_config(&report_file), StubDirectAnalyzer::new(bytes));

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Maven, None)
        .await;

    assert_eq!(outcome.report(), Some(&Report::Html(bytes.to_vec())));
    assert_eq!(std::fs::read(&report_file).unwrap(), bytes);
    assert_eq!(
        h.handler.statuses(),
        vec![
            StatusMessage::Resolving,
            StatusMessage::Analyzing,
            StatusMessage::Success
        ]
    );
    assert_eq!(
        h.panel.updates(),
        vec![PanelContent::Report(Report::Html(bytes.to_vec()))]
    );

    let reports = h.handler.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_file.as_deref(), Some(report_file.as_path()));
    assert_eq!(reports[0].size_bytes, bytes.len());

    let calls = h.direct.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PathBuf::from("/ws/pom.xml"));
    assert_eq!(calls[0].1.token, None);
    assert_eq!(calls[0].1.crda_host, "https://crda.test");
    assert!(h.transport.post_calls().is_empty());
    assert_eq!(h.log.entries(), vec!["resolver"]);
}

#[tokio::test]
async fn maven_explicit_pom_and_token_reach_the_analyzer() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&report_path(&dir));
    config.api.crda_snyk_token = Some("snyk-abc".into());
    let h = Harness::new(config);

    let outcome = h
        .engine
        .process_stack_analyses(
            Path::new("/ws"),
            Ecosystem::Maven,
            Some(Path::new("/ws/module-a/pom.xml")),
        )
        .await;

    assert!(outcome.is_success());
    let calls = h.direct.calls();
    assert_eq!(calls[0].0, PathBuf::from("/ws/module-a/pom.xml"));
    assert_eq!(calls[0].1.token.as_deref(), Some("snyk-abc"));
}

#[tokio::test]
async fn maven_without_analysis_host_is_a_config_failure() {
    let dir = tempfile::tempdir().unwrap();
    let report_file = report_path(&dir);
    let mut config = test_config(&report_file);
    config.api.crda_host = None;
    let h = Harness::new(config);

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Maven, None)
        .await;

    match outcome {
        AnalysisOutcome::Failure(AnalysisError::Config(ConfigError::MissingSetting { key })) => {
            assert_eq!(key, "api.crda_host")
        }
        other => panic!("Expected missing api.crda_host, got {other:?}"),
    }
    assert!(h.direct.calls().is_empty());
    assert!(h.log.entries().is_empty());
    assert!(!report_file.exists());
    assert_eq!(
        h.handler.statuses(),
        vec![StatusMessage::Resolving, StatusMessage::ResolutionFailed]
    );
    assert_eq!(h.handler.errors()[0].code, "CONFIG_ERROR");
}

#[tokio::test]
async fn unwritable_report_path_fails_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let h = Harness::new(test_config(&blocker.join("report.html")));

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Maven, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Persistence { .. })
    ));
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::AnalysisFailed]
    );
    assert_eq!(h.panel.updates(), vec![PanelContent::Error]);
    assert_eq!(h.handler.errors()[0].code, "PERSISTENCE_ERROR");
}

// ---- Submit-then-poll strategy ---------------------------------------------

#[tokio::test(start_paused = true)]
async fn npm_lifecycle_submits_then_polls() {
    let h = Harness::new(test_config(Path::new("/unused/report.html")));
    h.transport.push_post(Scripted::body("job-7"));
    h.transport
        .push_get(Scripted::pending())
        .push_get(Scripted::ready(json!({"result": [{"name": "express"}]})));

    let outcome = h
        .engine
        .process_stack_analyses(
            Path::new("/ws"),
            Ecosystem::Npm,
            Some(Path::new("/ws/app/package.json")),
        )
        .await;

    assert_eq!(
        outcome.report(),
        Some(&Report::Json(json!({"result": [{"name": "express"}]})))
    );
    assert_eq!(
        h.log.entries(),
        vec!["provider:effectivePackage", "resolver", "build", "post", "get", "get"]
    );
    assert_eq!(
        h.handler.statuses(),
        vec![
            StatusMessage::Resolving,
            StatusMessage::Analyzing,
            StatusMessage::Success
        ]
    );

    let posts = h.transport.post_calls();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(
        post.endpoint_uri,
        "https://stack.test/api/v2/stack-analyses?user_key=key-123"
    );
    assert!(post.headers.transitive_report);
    let correlation = post.headers.correlation_id.clone().unwrap();
    assert!(!correlation.is_empty());

    assert_eq!(post.payload.files.len(), 1);
    assert_eq!(post.payload.files[0].field, MANIFEST_FIELD);
    assert_eq!(post.payload.field(FILE_PATH_FIELD), Some("/ws/app"));
    assert_eq!(post.payload.field(ORIGIN_FIELD), Some(ORIGIN));

    // Every tick is correlated with the submission.
    for get in h.transport.get_calls() {
        assert_eq!(
            get.endpoint_uri,
            "https://stack.test/api/v2/stack-analyses/job-7?user_key=key-123"
        );
        assert_eq!(get.headers.correlation_id.as_deref(), Some(correlation.as_str()));
    }
}

#[tokio::test(start_paused = true)]
async fn each_ecosystem_uses_its_variant() {
    for (ecosystem, entry) in [
        (Ecosystem::Npm, "provider:effectivePackage"),
        (Ecosystem::Pypi, "provider:effectivePypi"),
        (Ecosystem::Golang, "provider:effectiveGolang"),
    ] {
        let h = Harness::new(test_config(Path::new("/unused/report.html")));
        h.transport.push_post(Scripted::body(r#"{"id":"j"}"#));
        h.transport.push_get(Scripted::ready(json!({})));

        let outcome = h
            .engine
            .process_stack_analyses(Path::new("/ws"), ecosystem, None)
            .await;

        assert!(outcome.is_success(), "{ecosystem} failed: {outcome:?}");
        assert_eq!(h.log.entries()[0], entry);
    }
}

#[tokio::test(start_paused = true)]
async fn poll_budget_exhaustion_reports_try_again() {
    let h = Harness::new(test_config(Path::new("/unused/report.html")));
    h.transport.push_post(Scripted::body("job-slow"));

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Pypi, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Timeout { ref job_id, attempts: 10 } if job_id == "job-slow"
    ));
    assert_eq!(h.transport.get_count(), 10);
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::AnalysisFailed]
    );
    let errors = h.handler.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "POLL_TIMEOUT");
    assert_eq!(
        errors[0].message,
        "Failed to trigger application's stack analysis, try in a while."
    );
    assert_eq!(h.panel.updates(), vec![PanelContent::Error]);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_stops_before_submission() {
    let h = Harness::with_failing_provider(
        test_config(Path::new("/unused/report.html")),
        "npm ls exited with 1",
    );

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Npm, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Resolution { .. })
    ));
    assert_eq!(h.log.entries(), vec!["provider:effectivePackage"]);
    assert_eq!(
        h.handler.statuses(),
        vec![StatusMessage::Resolving, StatusMessage::ResolutionFailed]
    );
    assert_eq!(h.panel.updates(), vec![PanelContent::Error]);
    assert!(h.handler.errors()[0].message.contains("npm ls exited with 1"));
}

#[tokio::test(start_paused = true)]
async fn submission_failure_never_polls() {
    let h = Harness::new(test_config(Path::new("/unused/report.html")));
    h.transport.push_post(Scripted::Fail(TransportError::Http {
        status: 401,
        body: "unauthorized".into(),
    }));

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Golang, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Submission(TransportError::Http {
            status: 401,
            ..
        }))
    ));
    assert_eq!(h.transport.get_count(), 0);
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::ResolutionFailed]
    );
    assert_eq!(h.handler.errors()[0].code, "SUBMISSION_ERROR");
}

#[tokio::test(start_paused = true)]
async fn missing_backend_settings_fail_fast() {
    let mut config = test_config(Path::new("/unused/report.html"));
    config.api.host = None;
    let h = Harness::new(config);

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Npm, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Config(_))
    ));
    assert!(h.log.entries().is_empty());
    assert_eq!(h.handler.errors()[0].code, "CONFIG_ERROR");
}

#[tokio::test(start_paused = true)]
async fn invalid_config_fails_the_lifecycle() {
    let mut config = test_config(Path::new("/unused/report.html"));
    config.polling.poll_interval_ms = Some(0);
    let h = Harness::new(config);

    let outcome = h
        .engine
        .process_stack_analyses(Path::new("/ws"), Ecosystem::Npm, None)
        .await;

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Config(_))
    ));
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::ResolutionFailed]
    );
}

// ---- Cancellation and single flight ----------------------------------------

#[tokio::test(start_paused = true)]
async fn cancellation_mid_poll_ends_the_lifecycle() {
    let h = Harness::new(test_config(Path::new("/unused/report.html")));
    h.transport.push_post(Scripted::body("job-c"));
    h.transport.push_get(Scripted::pending()).push_get(Scripted::Hang);

    let request = resolve(Ecosystem::Npm, Path::new("/ws"), None);
    let cancel = CancellationToken::new();

    let (outcome, ()) = tokio::join!(h.engine.run_with_cancellation(&request, &cancel), async {
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        cancel.cancel();
    });

    assert!(matches!(
        outcome,
        AnalysisOutcome::Failure(AnalysisError::Cancelled)
    ));
    assert_eq!(h.transport.get_count(), 2);
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::AnalysisFailed]
    );
    assert!(h.engine.in_flight().is_empty());
}

#[tokio::test]
async fn duplicate_request_is_rejected_while_running() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let direct = StubDirectAnalyzer::gated(b"<html/>", Arc::clone(&gate));
    let started = direct.started();
    let h = Harness::with_direct(test_config(&report_path(&dir)), direct);

    let request = resolve(Ecosystem::Maven, Path::new("/ws"), None);

    let (first, second) = tokio::join!(h.engine.run(&request), async {
        started.notified().await;
        assert!(h.engine.in_flight().is_running(Ecosystem::Maven, &request.target_path));
        let second = h.engine.run(&request).await;
        gate.notify_one();
        second
    });

    assert!(first.is_success());
    assert!(matches!(
        second,
        AnalysisOutcome::Failure(AnalysisError::InFlight { .. })
    ));

    // The rejected duplicate neither reset the panel nor emitted a status.
    assert_eq!(h.handler.terminal_statuses(), vec![StatusMessage::Success]);
    assert_eq!(h.panel.updates().len(), 1);
    assert!(matches!(h.panel.updates()[0], PanelContent::Report(_)));
    let errors = h.handler.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "IN_FLIGHT");
    assert_eq!(h.direct.calls().len(), 1);

    // The claim is released once the first lifecycle ends.
    assert!(h.engine.in_flight().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sequential_runs_are_independent() {
    let h = Harness::new(test_config(Path::new("/unused/report.html")));
    for job in ["a", "b"] {
        h.transport.push_post(Scripted::body(job));
        h.transport.push_get(Scripted::ready(json!({"job": job})));
    }

    let request = resolve(Ecosystem::Golang, Path::new("/ws"), None);
    assert!(h.engine.run(&request).await.is_success());
    assert!(h.engine.run(&request).await.is_success());

    assert_eq!(h.transport.post_calls().len(), 2);
    assert_eq!(
        h.handler.terminal_statuses(),
        vec![StatusMessage::Success, StatusMessage::Success]
    );
}

#[test]
fn default_config_is_not_enough_for_polling() {
    let config = StackConfig::default();
    assert!(config.api.require_host().is_err());
    assert!(config.api.require_api_key().is_err());
}
