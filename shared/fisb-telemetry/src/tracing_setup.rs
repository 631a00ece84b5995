//! Subscriber installation

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Driver crates that are chatty at `info`
const QUIET_TARGETS: [&str; 3] = ["tokio_postgres=warn", "deadpool_postgres=warn", "hyper=warn"];

/// `RUST_LOG` when set, else the configured level with the driver crates
/// held at `warn`.
pub fn build_filter(config: &TelemetryConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    QUIET_TARGETS.iter().fold(
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        |filter, directive| match directive.parse() {
            Ok(d) => filter.add_directive(d),
            Err(_) => filter,
        },
    )
}

/// Install the global subscriber, JSON lines or human-readable.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let (json, plain) = if config.json_logs {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true);
        (Some(layer), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().with_target(true)))
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(json)
        .with(plain)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}
