//! Service infrastructure shared by all FIS-B services

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::Result;

/// Health status for liveness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub service_id: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness status for readiness probes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    pub dependencies: Vec<DependencyStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

/// Standard trait every service implements
#[async_trait]
pub trait FisbService: Send + Sync + 'static {
    /// Service identifier (e.g., "fisb-rest")
    fn service_id(&self) -> &'static str;

    /// Service version
    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Health check - is the service alive?
    async fn health(&self) -> HealthStatus;

    /// Readiness check - are all dependencies available?
    async fn ready(&self) -> ReadinessStatus;

    /// Graceful shutdown
    async fn shutdown(&self) -> Result<()>;

    /// Start serving; returns when the server stops
    async fn start(&self) -> Result<()>;
}

/// Standard service runtime bootstrap
pub struct MicroserviceRuntime {
    config: ServiceConfig,
    start_time: std::time::Instant,
}

impl MicroserviceRuntime {
    /// Create new runtime from environment
    pub fn new() -> Result<Self> {
        let config = ServiceConfig::from_env()?;
        Ok(Self {
            config,
            start_time: std::time::Instant::now(),
        })
    }

    /// Run a service until it stops on its own or a shutdown signal arrives
    pub async fn run<S: FisbService>(service: Arc<S>) -> Result<()> {
        let runtime = Self::new()?;

        info!(
            service_id = service.service_id(),
            version = service.version(),
            service_name = %runtime.config.service_name,
            "Starting service"
        );

        let readiness = service.ready().await;
        for dep in &readiness.dependencies {
            info!(
                dependency = %dep.name,
                available = dep.available,
                latency_ms = ?dep.latency_ms,
                "Dependency status at startup"
            );
        }
        if !readiness.ready {
            warn!("Starting while not ready");
        }

        let service_clone = service.clone();
        let mut service_handle = tokio::spawn(async move { service_clone.start().await });

        let outcome = tokio::select! {
            _ = Self::wait_for_shutdown() => {
                info!("Shutdown signal received, gracefully stopping...");
                Ok(())
            }
            joined = &mut service_handle => match joined {
                Ok(Ok(())) => {
                    warn!("Service stopped without a shutdown signal");
                    Ok(())
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Service error");
                    Err(e)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Service task aborted");
                    Err(crate::FisbError::Internal(e.to_string()))
                }
            },
        };

        if let Err(e) = service.shutdown().await {
            warn!("Error during shutdown: {}", e);
        }

        service_handle.abort();

        info!(
            uptime_seconds = runtime.start_time.elapsed().as_secs(),
            "Service stopped"
        );

        outcome
    }

    async fn wait_for_shutdown() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FisbError;

    struct OneShot {
        outcome: fn() -> Result<()>,
    }

    #[async_trait]
    impl FisbService for OneShot {
        fn service_id(&self) -> &'static str {
            "one-shot"
        }

        async fn health(&self) -> HealthStatus {
            HealthStatus {
                healthy: true,
                service_id: self.service_id().to_string(),
                version: self.version().to_string(),
                uptime_seconds: 0,
            }
        }

        async fn ready(&self) -> ReadinessStatus {
            ReadinessStatus {
                ready: true,
                dependencies: vec![],
            }
        }

        async fn shutdown(&self) -> Result<()> {
            Ok(())
        }

        async fn start(&self) -> Result<()> {
            (self.outcome)()
        }
    }

    #[tokio::test]
    async fn test_run_propagates_service_error() {
        let service = Arc::new(OneShot {
            outcome: || Err(FisbError::Database("store unreachable".into())),
        });
        let result = MicroserviceRuntime::run(service).await;
        assert!(matches!(result, Err(FisbError::Database(_))));
    }

    #[tokio::test]
    async fn test_run_returns_when_service_stops() {
        let service = Arc::new(OneShot { outcome: || Ok(()) });
        assert!(MicroserviceRuntime::run(service).await.is_ok());
    }
}
