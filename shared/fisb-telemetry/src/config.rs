//! Telemetry configuration

/// Log output settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub json_logs: bool,
}

impl TelemetryConfig {
    pub fn from_env(default_service: &str) -> Self {
        Self::from_lookup(default_service, |key| std::env::var(key).ok())
    }

    /// `SERVICE_NAME`, `LOG_LEVEL` and `JSON_LOGS` from an arbitrary source.
    ///
    /// `JSON_LOGS` is on unless explicitly `false`/`0`/`no`/`off`.
    pub fn from_lookup<F>(default_service: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let json_logs = lookup("JSON_LOGS")
            .map(|v| {
                !matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "false" | "0" | "no" | "off"
                )
            })
            .unwrap_or(true);

        Self {
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| default_service.to_string()),
            log_level: lookup("LOG_LEVEL")
                .filter(|level| !level.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
            json_logs,
        }
    }
}
