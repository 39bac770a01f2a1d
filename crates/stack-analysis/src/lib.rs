//! # stack-analysis
//!
//! Turns a long-running backend analysis job into a bounded, cancellable,
//! observable lifecycle: resolve the ecosystem, build the manifest payload,
//! submit, poll until the report is ready, and hand the outcome to the host.

pub mod direct;
pub mod engine;
pub mod payload;
pub mod poll;
pub mod ports;
pub mod report;
pub mod resolver;
pub mod single_flight;
pub mod token;
pub mod transport;

pub use engine::{Collaborators, StackAnalysisEngine};
pub use poll::{PollLoop, PollState};
pub use ports::{
    DirectAnalyzer, ManifestResolver, PanelContent, PayloadBuilder, ProjectDataProvider,
    ReportPanel,
};
pub use resolver::resolve;
pub use single_flight::{FlightGuard, SingleFlight};
pub use token::TokenValidation;
pub use transport::{HttpClient, HttpClientConfig, Transport};
