//! FIS-B Telemetry
//!
//! Structured logging setup and lightweight in-process metrics.

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{Counter, Gauge, Histogram, HistogramSnapshot};
pub use tracing_setup::{build_filter, init_tracing};

/// Initialize logging from the environment, naming the service
/// `default_service` unless `SERVICE_NAME` says otherwise.
pub fn init(default_service: &str) -> Result<TelemetryConfig, TelemetryError> {
    let config = TelemetryConfig::from_env(default_service);
    init_tracing(&config)?;
    Ok(config)
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}
