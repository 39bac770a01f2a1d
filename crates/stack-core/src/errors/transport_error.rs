//! Transport-level failures.

use super::error_code::{self, StackErrorCode};

/// A request that never produced a usable response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode response: {reason}")]
    Decode { reason: String },
}

impl TransportError {
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}

impl StackErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network { .. } => error_code::NETWORK_ERROR,
            Self::Http { .. } => error_code::HTTP_ERROR,
            Self::Decode { .. } => error_code::DECODE_ERROR,
        }
    }
}
