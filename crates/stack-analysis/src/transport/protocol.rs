//! Wire protocol: endpoint layout, job id decoding, poll response polarity.

use stack_core::constants::CORRELATION_ID_ENV;
use stack_core::models::{Ecosystem, JobHandle};
use stack_core::TransportError;

/// `POST` target for a new stack analysis job.
pub fn submission_uri(host: &str, api_key: &str) -> String {
    format!("{host}/api/v2/stack-analyses?user_key={api_key}")
}

/// `GET` target for the status of `handle`.
pub fn poll_uri(host: &str, handle: &JobHandle, api_key: &str) -> String {
    format!("{host}/api/v2/stack-analyses/{handle}?user_key={api_key}")
}

pub fn token_uri(crda_host: &str) -> String {
    format!("{crda_host}/api/v3/token")
}

pub fn direct_analysis_uri(crda_host: &str, ecosystem: Ecosystem) -> String {
    format!("{crda_host}/api/v3/dependency-analysis/{ecosystem}")
}

/// Correlation id from the process environment, or a fresh one when the
/// host never set it.
pub fn ambient_correlation_id() -> String {
    match std::env::var(CORRELATION_ID_ENV) {
        Ok(id) if !id.trim().is_empty() => id,
        _ => {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::debug!(correlation_id = %id, "no {CORRELATION_ID_ENV} in environment, generated one");
            id
        }
    }
}

/// Decode the submission response into a job handle.
///
/// Accepts a bare id, a JSON string, or a JSON object with an `id` field.
pub fn parse_job_handle(body: &str) -> Result<JobHandle, TransportError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(TransportError::decode("empty submission response"));
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(id)) if !id.is_empty() => Ok(JobHandle::new(id)),
        Ok(serde_json::Value::Object(map)) => match map.get("id") {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(JobHandle::new(id.clone())),
            Some(serde_json::Value::Number(n)) => Ok(JobHandle::new(n.to_string())),
            _ => Err(TransportError::decode(format!(
                "submission response has no job id: {}",
                trimmed.chars().take(200).collect::<String>()
            ))),
        },
        Ok(serde_json::Value::Number(n)) => Ok(JobHandle::new(n.to_string())),
        Ok(_) => Err(TransportError::decode("unexpected submission response shape")),
        Err(_) => Ok(JobHandle::new(trimmed)),
    }
}

/// Classification of one poll response.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// No top-level `error` key: the body is the finished report.
    Ready(serde_json::Value),
    /// A top-level `error` key is present: the job is still running.
    Pending,
}

/// Classify a poll body.
///
/// Any JSON document lacking a top-level `error` key counts as the finished
/// report, even if it is not a complete one.
// TODO: revisit once the backend exposes an explicit status field; a
// transient response without `error` is currently taken as the report.
pub fn classify_poll_response(body: &str) -> Result<PollStatus, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| TransportError::decode(format!("poll response is not JSON: {e}")))?;
    let pending = value
        .as_object()
        .is_some_and(|map| map.contains_key("error"));
    if pending {
        Ok(PollStatus::Pending)
    } else {
        Ok(PollStatus::Ready(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_match_backend_layout() {
        assert_eq!(
            submission_uri("https://h", "k"),
            "https://h/api/v2/stack-analyses?user_key=k"
        );
        assert_eq!(
            poll_uri("https://h", &JobHandle::new("42ab"), "k"),
            "https://h/api/v2/stack-analyses/42ab?user_key=k"
        );
        assert_eq!(token_uri("https://c"), "https://c/api/v3/token");
        assert_eq!(
            direct_analysis_uri("https://c", Ecosystem::Maven),
            "https://c/api/v3/dependency-analysis/maven"
        );
    }

    #[test]
    fn job_handle_shapes() {
        assert_eq!(parse_job_handle("abc123\n").unwrap().as_str(), "abc123");
        assert_eq!(parse_job_handle("\"abc\"").unwrap().as_str(), "abc");
        assert_eq!(
            parse_job_handle(r#"{"id":"f00","submitted_at":"now"}"#).unwrap().as_str(),
            "f00"
        );
        assert!(parse_job_handle("   ").is_err());
        assert!(parse_job_handle(r#"{"status":"queued"}"#).is_err());
    }

    #[test]
    fn error_key_means_pending() {
        assert_eq!(
            classify_poll_response(r#"{"error":"Analysis in progress"}"#).unwrap(),
            PollStatus::Pending
        );
        // Even a null error counts: only key presence matters.
        assert_eq!(
            classify_poll_response(r#"{"error":null}"#).unwrap(),
            PollStatus::Pending
        );
    }

    #[test]
    fn missing_error_key_means_ready() {
        let body = json!({"result": [{"recommendation": {}}], "request_id": "x"});
        assert_eq!(
            classify_poll_response(&body.to_string()).unwrap(),
            PollStatus::Ready(body)
        );
        // Nested `error` keys do not count.
        let nested = json!({"result": {"error": "inner"}});
        assert!(matches!(
            classify_poll_response(&nested.to_string()).unwrap(),
            PollStatus::Ready(_)
        ));
    }

    #[test]
    fn non_json_poll_body_is_a_decode_error() {
        let err = classify_poll_response("<html>502</html>").unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }
}
