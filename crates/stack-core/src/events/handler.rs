//! Handler trait implemented by hosts that observe lifecycles.

use super::types::*;

/// Receives lifecycle events. Every method defaults to a no-op so hosts
/// implement only what they display.
pub trait AnalysisEventHandler: Send + Sync {
    fn on_status(&self, _event: &StatusEvent) {}

    fn on_error_message(&self, _event: &ErrorMessageEvent) {}

    fn on_notice(&self, _event: &NoticeEvent) {}

    fn on_report_ready(&self, _event: &ReportReadyEvent) {}
}
