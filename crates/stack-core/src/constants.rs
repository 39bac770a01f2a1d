/// Stack analysis version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default total time budget for a polled analysis, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Default delay between two poll ticks, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// File name of the report written when no path is configured.
pub const DEFAULT_REPORT_FILE_NAME: &str = "dependency-analytics-report.html";

/// Where users obtain a vulnerability-provider token.
pub const SNYK_TOKEN_URL: &str = "https://app.snyk.io/redhat/snyk-token";

/// Environment variable holding the process-wide correlation id.
pub const CORRELATION_ID_ENV: &str = "UUID";

/// Wire header names.
pub mod headers {
    pub const SHOW_TRANSITIVE_REPORT: &str = "showTransitiveReport";
    pub const CORRELATION_ID: &str = "uuid";
    pub const SNYK_TOKEN: &str = "Crda-Snyk-Token";
}

/// User-facing title of the analysis progress indicator.
pub const EXT_TITLE: &str = "Dependency Analytics";

/// Message shown when the poll budget runs out.
pub const POLL_TIMEOUT_MESSAGE: &str =
    "Failed to trigger application's stack analysis, try in a while.";
