//! FIS-B REST Query Gateway
//!
//! Read-only HTTP access to decoded FIS-B weather and airspace messages:
//! - Cursor-based polling on message insert time
//! - Optional point-in-polygon and altitude-band filtering
//! - Uniform JSON envelope for every product

use fisb_core::{
    FisbError, FisbService, HealthStatus, MicroserviceRuntime, ReadinessStatus, Result,
};
use fisb_docstore::{DocStoreError, DocStorePool, DocumentStore, PgDocumentStore};
use fisb_query::QueryExecutor;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod routes;
mod server;


pub use config::FisbRestConfig;
use server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    fisb_telemetry::init("fisb-rest").map_err(|e| FisbError::Config(e.to_string()))?;

    info!("Starting FIS-B REST gateway");

    let config = FisbRestConfig::from_env()?;
    let service = match FisbRestService::connect(config).await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Startup failed");
            return Err(e);
        }
    };
    MicroserviceRuntime::run(service).await
}

pub struct FisbRestService {
    config: FisbRestConfig,
    state: AppState,
}

impl FisbRestService {
    /// Create the pool and make sure the store answers before serving
    pub async fn connect(config: FisbRestConfig) -> Result<Self> {
        let pool_config = config
            .pool
            .clone()
            .with_statement_timeout(config.query_timeout);
        let pool = DocStorePool::new(pool_config).map_err(store_error)?;
        let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));

        if !store.ping().await {
            return Err(FisbError::Database(
                "document store is unreachable".to_string(),
            ));
        }

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: FisbRestConfig, store: Arc<dyn DocumentStore>) -> Self {
        let executor = QueryExecutor::new(store).with_query_timeout(config.query_timeout);
        Self {
            config,
            state: AppState::new(executor),
        }
    }
}

fn store_error(e: DocStoreError) -> FisbError {
    match e {
        DocStoreError::Timeout(after) => FisbError::Timeout(format!("{:?}", after)),
        other => FisbError::Database(other.to_string()),
    }
}

#[async_trait::async_trait]
impl FisbService for FisbRestService {
    fn service_id(&self) -> &'static str {
        "fisb-rest"
    }

    async fn health(&self) -> HealthStatus {
        self.state.health()
    }

    async fn ready(&self) -> ReadinessStatus {
        self.state.readiness().await
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down FIS-B REST gateway");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            query_timeout_ms = self.config.query_timeout.as_millis() as u64,
            "Starting FIS-B REST server"
        );

        let app = build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
