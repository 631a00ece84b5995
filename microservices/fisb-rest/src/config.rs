//! FIS-B REST configuration

use fisb_core::{FisbError, Result, ServiceConfig};
use fisb_docstore::PoolConfig;
use std::time::Duration;

const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct FisbRestConfig {
    pub http_bind: String,
    pub pool: PoolConfig,
    pub query_timeout: Duration,
}

impl FisbRestConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = ServiceConfig::from_lookup(&lookup)?;

        let query_timeout_ms = match lookup("QUERY_TIMEOUT_MS") {
            None => DEFAULT_QUERY_TIMEOUT_MS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(FisbError::Config(format!(
                        "Invalid QUERY_TIMEOUT_MS: {}",
                        raw
                    )))
                }
            },
        };

        let pool = PoolConfig::from_lookup(&lookup);

        Ok(Self {
            http_bind: service.http_bind,
            pool,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }
}
