//! Error handling for stack analysis.
//! One error enum per concern, `thiserror` only.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod transport_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use error_code::StackErrorCode;
pub use transport_error::TransportError;
