//! Data model of one stack analysis lifecycle.

pub mod ecosystem;
pub mod options;
pub mod outcome;
pub mod payload;
pub mod request;

pub use ecosystem::{Ecosystem, EffectiveVariant, SubmissionStrategy};
pub use options::{DirectAnalysisOptions, GetOptions, RequestHeaders, SubmissionOptions};
pub use outcome::{AnalysisOutcome, JobHandle, Report};
pub use payload::{FormField, ManifestFile, ManifestPayload, ProjectData};
pub use request::AnalysisRequest;
