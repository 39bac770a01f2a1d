//! Direct (synchronous) analysis over HTTP.

use std::path::Path;

use async_trait::async_trait;
use stack_core::models::{DirectAnalysisOptions, Ecosystem};
use stack_core::AnalysisError;

use crate::ports::DirectAnalyzer;
use crate::transport::protocol;
use crate::transport::HttpClient;

/// Posts a Maven manifest to the dependency-analysis endpoint and returns the
/// HTML report. The endpoint host comes with each call's options.
#[derive(Debug, Clone)]
pub struct HttpDirectAnalyzer {
    client: HttpClient,
}

impl HttpDirectAnalyzer {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

/// URI and headers of one direct analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectRequest {
    pub uri: String,
    pub headers: Vec<(&'static str, String)>,
}

impl DirectRequest {
    pub fn build(options: &DirectAnalysisOptions) -> Self {
        let mut headers = vec![
            ("Accept", "text/html".to_string()),
            ("Content-Type", "application/xml".to_string()),
        ];
        headers.extend(options.headers().to_pairs());

        Self {
            uri: protocol::direct_analysis_uri(&options.crda_host, Ecosystem::Maven),
            headers,
        }
    }
}

#[async_trait]
impl DirectAnalyzer for HttpDirectAnalyzer {
    async fn stack_analysis(
        &self,
        target: &Path,
        options: &DirectAnalysisOptions,
    ) -> Result<Vec<u8>, AnalysisError> {
        let manifest = tokio::fs::read(target).await.map_err(|e| {
            AnalysisError::resolution(format!("cannot read {}: {e}", target.display()))
        })?;

        let request = DirectRequest::build(options);
        self.client
            .post_bytes(&request.uri, &request.headers, manifest)
            .await
            .map_err(AnalysisError::Submission)
    }
}
