//! Synchronous fan-out of lifecycle events to registered handlers.

use std::sync::Arc;

use super::handler::AnalysisEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn AnalysisEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn AnalysisEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Handlers that panic are caught and do not prevent subsequent handlers
    /// from receiving the event.
    fn emit<F: Fn(&dyn AnalysisEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::error!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    pub fn emit_status(&self, event: &StatusEvent) {
        self.emit(|h| h.on_status(event));
    }

    pub fn emit_error_message(&self, event: &ErrorMessageEvent) {
        self.emit(|h| h.on_error_message(event));
    }

    pub fn emit_notice(&self, event: &NoticeEvent) {
        self.emit(|h| h.on_notice(event));
    }

    pub fn emit_report_ready(&self, event: &ReportReadyEvent) {
        self.emit(|h| h.on_report_ready(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
