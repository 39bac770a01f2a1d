//! Subscriber installation and span definitions per lifecycle operation.

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over the default
/// `info` filter. Calling this twice is a no-op.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Create a lifecycle span.
#[macro_export]
macro_rules! lifecycle_span {
    ($ecosystem:expr, $target:expr) => {
        tracing::info_span!(
            "stack.lifecycle",
            ecosystem = %$ecosystem,
            path = %$target.display()
        )
    };
}

/// Create a poll loop span.
#[macro_export]
macro_rules! poll_span {
    ($job_id:expr, $max_attempts:expr) => {
        tracing::info_span!("stack.poll", job_id = %$job_id, max_attempts = $max_attempts)
    };
}

/// Create a token validation span.
#[macro_export]
macro_rules! token_span {
    () => {
        tracing::info_span!("stack.token_validation")
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const LIFECYCLE: &str = "stack.lifecycle";
    pub const POLL: &str = "stack.poll";
    pub const TOKEN_VALIDATION: &str = "stack.token_validation";
}
