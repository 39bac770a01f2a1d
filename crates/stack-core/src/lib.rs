//! # stack-core
//!
//! Foundation crate for stack analysis.
//! Defines the request/outcome model, errors, config, events, tracing setup,
//! and constants shared by the orchestrator and its hosts.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod models;
pub mod tracing_setup;

// Re-export the most commonly used types at the crate root.
pub use config::StackConfig;
pub use errors::{AnalysisError, ConfigError, TransportError};
pub use models::{AnalysisOutcome, AnalysisRequest, Ecosystem, EffectiveVariant, JobHandle, Report};
