//! Tests for error codes and user-facing messages.

use std::path::PathBuf;

use stack_core::errors::StackErrorCode;
use stack_core::{AnalysisError, AnalysisOutcome, ConfigError, Ecosystem, TransportError};

#[test]
fn test_every_analysis_error_has_a_code() {
    let cases = vec![
        (
            AnalysisError::InvalidEcosystem { tag: "cargo".into() },
            "INVALID_ECOSYSTEM",
        ),
        (AnalysisError::resolution("no manifest"), "RESOLUTION_ERROR"),
        (
            AnalysisError::Submission(TransportError::network("refused")),
            "SUBMISSION_ERROR",
        ),
        (
            AnalysisError::PollTransport {
                job_id: "j1".into(),
                source: TransportError::Http {
                    status: 503,
                    body: String::new(),
                },
            },
            "POLL_TRANSPORT_ERROR",
        ),
        (
            AnalysisError::PollTimeout {
                job_id: "j1".into(),
                attempts: 60,
            },
            "POLL_TIMEOUT",
        ),
        (
            AnalysisError::Persistence {
                path: PathBuf::from("/ro/report.html"),
                reason: "read-only".into(),
            },
            "PERSISTENCE_ERROR",
        ),
        (
            AnalysisError::from(ConfigError::MissingSetting {
                key: "api.host".into(),
            }),
            "CONFIG_ERROR",
        ),
        (
            AnalysisError::InFlight {
                ecosystem: "npm".into(),
                target: PathBuf::from("/ws"),
            },
            "IN_FLIGHT",
        ),
        (AnalysisError::Cancelled, "CANCELLED"),
    ];

    for (err, code) in cases {
        assert_eq!(err.error_code(), code, "wrong code for {err}");
    }
}

#[test]
fn test_timeout_uses_try_again_wording() {
    let err = AnalysisError::PollTimeout {
        job_id: "j1".into(),
        attempts: 3,
    };
    assert_eq!(
        err.user_message(),
        "Failed to trigger application's stack analysis, try in a while."
    );
    assert!(err.to_string().contains("j1"));

    let other = AnalysisError::resolution("npm ls failed");
    assert_eq!(other.user_message(), other.to_string());
}

#[test]
fn test_resolution_phase_classification() {
    assert!(AnalysisError::resolution("x").is_resolution_phase());
    assert!(AnalysisError::Submission(TransportError::decode("bad")).is_resolution_phase());
    assert!(!AnalysisError::Cancelled.is_resolution_phase());
    assert!(!AnalysisError::PollTimeout {
        job_id: "j".into(),
        attempts: 1
    }
    .is_resolution_phase());
}

#[test]
fn test_unknown_ecosystem_tag() {
    let err = "cargo".parse::<Ecosystem>().unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidEcosystem { ref tag } if tag == "cargo"));
    assert_eq!(" NPM ".parse::<Ecosystem>().unwrap(), Ecosystem::Npm);
}

#[test]
fn test_timeout_outcome_collapses_to_error() {
    let outcome = AnalysisOutcome::Timeout {
        job_id: "abc".into(),
        attempts: 5,
    };
    assert!(!outcome.is_success());
    assert!(outcome.report().is_none());
    match outcome.into_result() {
        Err(AnalysisError::PollTimeout { job_id, attempts }) => {
            assert_eq!(job_id, "abc");
            assert_eq!(attempts, 5);
        }
        other => panic!("Expected PollTimeout, got {other:?}"),
    }
}
