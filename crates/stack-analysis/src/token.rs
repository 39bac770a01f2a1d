//! Best-effort validation of the vulnerability-provider token.

use std::sync::Arc;

use stack_core::config::ApiConfig;
use stack_core::constants::SNYK_TOKEN_URL;
use stack_core::events::{EventDispatcher, NoticeEvent};
use stack_core::models::{GetOptions, RequestHeaders};
use stack_core::token_span;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::transport::protocol;
use crate::transport::Transport;

/// What `validate_token` did.
#[derive(Debug)]
pub enum TokenValidation {
    /// One validation request is running in the background. Awaiting the
    /// handle is optional.
    Dispatched(JoinHandle<()>),
    /// No token configured; the user was told how to get one.
    MissingToken,
    /// A token is configured but there is nowhere to validate it.
    Skipped { reason: String },
}

/// Fire a token validation request, or notify the user that no token is
/// configured. Failures are logged, never returned.
///
/// Must be called from within a Tokio runtime.
pub fn validate_token(
    transport: Arc<dyn Transport>,
    api: &ApiConfig,
    events: &EventDispatcher,
) -> TokenValidation {
    let Some(token) = api.snyk_token() else {
        events.emit_notice(&NoticeEvent {
            message: missing_token_notice(),
        });
        return TokenValidation::MissingToken;
    };

    let crda_host = match api.require_crda_host() {
        Ok(host) => host,
        Err(e) => {
            tracing::warn!("skipping token validation: {e}");
            return TokenValidation::Skipped {
                reason: e.to_string(),
            };
        }
    };

    let request = GetOptions {
        endpoint_uri: protocol::token_uri(crda_host),
        headers: RequestHeaders::token(token),
    };

    let handle = tokio::spawn(
        async move {
            match transport.get(&request).await {
                Ok(_) => tracing::info!("token validation request accepted"),
                Err(e) => tracing::warn!("token validation failed: {e}"),
            }
        }
        .instrument(token_span!()),
    );
    TokenValidation::Dispatched(handle)
}

fn missing_token_notice() -> String {
    format!(
        "No Snyk token is configured, so Snyk vulnerabilities will not be shown in the \
         dependency report. Obtain a token at {SNYK_TOKEN_URL} and add it to your settings."
    )
}
