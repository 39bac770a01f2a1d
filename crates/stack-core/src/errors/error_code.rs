//! Stable machine-readable error codes.

/// Implemented by every error type so hosts can branch on a stable code
/// instead of the display text.
pub trait StackErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const INVALID_ECOSYSTEM: &str = "INVALID_ECOSYSTEM";
pub const RESOLUTION_ERROR: &str = "RESOLUTION_ERROR";
pub const SUBMISSION_ERROR: &str = "SUBMISSION_ERROR";
pub const POLL_TRANSPORT_ERROR: &str = "POLL_TRANSPORT_ERROR";
pub const POLL_TIMEOUT: &str = "POLL_TIMEOUT";
pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const IN_FLIGHT: &str = "IN_FLIGHT";
pub const CANCELLED: &str = "CANCELLED";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const HTTP_ERROR: &str = "HTTP_ERROR";
pub const DECODE_ERROR: &str = "DECODE_ERROR";
