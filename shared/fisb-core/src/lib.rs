//! FIS-B Core - Shared service infrastructure
//!
//! This crate provides:
//! - Standard service trait the gateway implements
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::{FisbError, Result};
pub use service::{DependencyStatus, FisbService, HealthStatus, MicroserviceRuntime, ReadinessStatus};
