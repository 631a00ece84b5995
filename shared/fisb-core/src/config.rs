//! Configuration management for services

use crate::error::{FisbError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub http_bind: String,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_bind = lookup("HTTP_BIND").unwrap_or_else(|| "0.0.0.0:7214".to_string());
        http_bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| FisbError::Config(format!("Invalid HTTP_BIND: {}", e)))?;

        Ok(Self {
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "fisb-rest".to_string()),
            http_bind,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
