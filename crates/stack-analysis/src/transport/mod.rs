//! HTTP transport: the `Transport` seam and its reqwest implementation.

pub mod protocol;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use stack_core::models::{GetOptions, ManifestPayload, SubmissionOptions};
use stack_core::TransportError;

/// Performs the backend requests. Returns the response body or fails with a
/// network/HTTP error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Multipart POST of a job submission.
    async fn post(&self, options: &SubmissionOptions) -> Result<String, TransportError>;

    /// Plain GET.
    async fn get(&self, options: &GetOptions) -> Result<String, TransportError>;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("stack-analysis/{}", stack_core::constants::VERSION),
        }
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// POST a raw body and return the response bytes.
    pub async fn post_bytes(
        &self,
        uri: &str,
        headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        let mut request = self.client.post(uri).body(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send().await.map_err(network_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(network_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post(&self, options: &SubmissionOptions) -> Result<String, TransportError> {
        let form = to_form(&options.payload)?;
        let mut request = self.client.post(&options.endpoint_uri).multipart(form);
        for (name, value) in options.headers.to_pairs() {
            request = request.header(name, value);
        }
        tracing::debug!(uri = %redact(&options.endpoint_uri), "POST");
        let response = request.send().await.map_err(network_error)?;
        let response = check_status(response).await?;
        response.text().await.map_err(network_error)
    }

    async fn get(&self, options: &GetOptions) -> Result<String, TransportError> {
        let mut request = self.client.get(&options.endpoint_uri);
        for (name, value) in options.headers.to_pairs() {
            request = request.header(name, value);
        }
        tracing::debug!(uri = %redact(&options.endpoint_uri), "GET");
        let response = request.send().await.map_err(network_error)?;
        let response = check_status(response).await?;
        response.text().await.map_err(network_error)
    }
}

fn to_form(payload: &ManifestPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for file in &payload.files {
        let part = Part::bytes(file.content.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                TransportError::decode(format!("invalid content type '{}': {e}", file.content_type))
            })?;
        form = form.part(file.field.clone(), part);
    }
    for field in &payload.fields {
        form = form.text(field.name.clone(), field.value.clone());
    }
    Ok(form)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Http {
        status: status.as_u16(),
        body,
    })
}

fn network_error(e: reqwest::Error) -> TransportError {
    TransportError::network(e.to_string())
}

/// Strip the query string so keys never reach the logs.
fn redact(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(base, _)| base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_drops_query() {
        assert_eq!(
            redact("https://h/api/v2/stack-analyses?user_key=secret"),
            "https://h/api/v2/stack-analyses"
        );
        assert_eq!(redact("https://h/api/v3/token"), "https://h/api/v3/token");
    }
}
