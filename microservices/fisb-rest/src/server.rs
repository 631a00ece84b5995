//! HTTP surface

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use fisb_core::{DependencyStatus, HealthStatus, ReadinessStatus};
use fisb_query::{MetricsSnapshot, QueryExecutor, QueryResponse};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::routes::{Dispatch, RouteSpec, ROUTES};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
    pub service_id: &'static str,
    pub version: &'static str,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            executor,
            service_id: "fisb-rest",
            version: env!("CARGO_PKG_VERSION"),
            start_time: Instant::now(),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id.to_string(),
            version: self.version.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    pub async fn readiness(&self) -> ReadinessStatus {
        let store = self.executor.store();
        let probe_started = Instant::now();
        let available = store.ping().await;
        ReadinessStatus {
            ready: available,
            dependencies: vec![DependencyStatus {
                name: store.backend_name().to_string(),
                available,
                latency_ms: Some(probe_started.elapsed().as_millis() as u64),
            }],
        }
    }
}

/// Build the full router: operational endpoints plus every row of the route table
pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler));

    for route in ROUTES {
        for path in route.paths {
            app = app.route(
                path,
                get(
                    move |State(state): State<AppState>,
                          Query(query): Query<HashMap<String, String>>| async move {
                        dispatch(&state, route, None, &query).await
                    },
                ),
            );

            if route.keyed.is_some() {
                app = app.route(
                    &format!("{}/{{id}}", path),
                    get(
                        move |State(state): State<AppState>,
                              Path(id): Path<String>,
                              Query(query): Query<HashMap<String, String>>| async move {
                            dispatch(&state, route, Some(id), &query).await
                        },
                    ),
                );
            }
        }
    }

    app.with_state(state)
}

/// Run the operation a route row names. Always HTTP 200; errors travel in the envelope.
pub async fn dispatch(
    state: &AppState,
    route: &'static RouteSpec,
    id: Option<String>,
    query: &HashMap<String, String>,
) -> Json<QueryResponse> {
    let filter = route.filter(id.as_deref());
    let executor = &state.executor;
    debug!(path = route.paths[0], id = ?id, "Dispatching query");

    let response = match route.dispatch_for(id.is_some()) {
        Dispatch::One => executor.return_one(filter, query).await,
        Dispatch::Many => executor.return_many(filter, query).await,
        Dispatch::StaticOne => executor.return_static_one(filter, query).await,
    };
    Json(response)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.health())
}

async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = state.readiness().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.executor.metrics().snapshot())
}
