//! Configuration system for stack analysis.
//! TOML-based, 4-layer resolution: overrides > env > project > user > defaults.

pub mod api_config;
pub mod polling_config;
pub mod report_config;
pub mod stack_config;

pub use api_config::ApiConfig;
pub use polling_config::PollingConfig;
pub use report_config::ReportConfig;
pub use stack_config::{ConfigOverrides, ConfigSource, LayeredConfigSource, StackConfig};
