//! Lifecycle event system: status transitions, user messages, report notices.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::AnalysisEventHandler;
pub use types::*;
