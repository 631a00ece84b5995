//! Query execution
//!
//! Each request moves through validation, the store query, per-document
//! filtering and normalization, and finally the envelope. Validation errors
//! short-circuit before the store is touched. Store failures and timeouts are
//! logged and answered with the operation's empty response.

use fisb_docstore::{
    Collection, DocStoreError, Document, DocumentStore, Filter, FindOptions,
};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

use crate::altitude::within_band;
use crate::envelope::QueryResponse;
use crate::geometry::contains_point;
use crate::metrics::QueryMetrics;
use crate::normalize::{normalize, present_static};
use crate::params::{parse_query_params, QueryParams};
use crate::timestamp::format_timestamp;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the four query shapes against an injected store
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn DocumentStore>,
    query_timeout: Duration,
    metrics: QueryMetrics,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            metrics: QueryMetrics::new(),
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    /// Zero or one message newer than the cursor
    #[instrument(skip_all, fields(op = "return_one"))]
    pub async fn return_one(&self, filter: Filter, query: &HashMap<String, String>) -> QueryResponse {
        let params = match self.admit(query) {
            Ok(params) => params,
            Err(rejection) => return rejection,
        };
        let requested_after = format_timestamp(&params.after);
        let filter = filter.inserted_after(params.after);

        let in_flight = self.begin();
        let fetched = self
            .bounded(self.store.find_one(Collection::Msg, &filter))
            .await;
        let found = self.keep_one(fetched, &params);
        self.finish(in_flight, usize::from(found.is_some()));

        match found {
            Some(doc) => {
                let after = cursor_of(&doc).unwrap_or(requested_after);
                QueryResponse::single(Some(normalize(&doc)), Some(after))
            }
            None => QueryResponse::single(None, Some(requested_after)),
        }
    }

    /// Messages newer than the cursor, oldest first, at most `limit` examined
    #[instrument(skip_all, fields(op = "return_many"))]
    pub async fn return_many(&self, filter: Filter, query: &HashMap<String, String>) -> QueryResponse {
        let params = match self.admit(query) {
            Ok(params) => params,
            Err(rejection) => return rejection,
        };
        let requested_after = format_timestamp(&params.after);
        let filter = filter.inserted_after(params.after);
        let options = FindOptions::default()
            .oldest_first()
            .limit(params.limit);

        let in_flight = self.begin();
        let retained = self.collect(Collection::Msg, &filter, options, &params).await;
        self.finish(in_flight, retained.len());

        // Documents dropped by the geo/altitude filters are still behind the
        // returned cursor; a follow-up poll will not see them again.
        let after = retained
            .last()
            .and_then(cursor_of)
            .unwrap_or(requested_after);
        let results = retained.iter().map(normalize).collect();
        QueryResponse::many(results, Some(after))
    }

    /// Zero or one static document
    #[instrument(skip_all, fields(op = "return_static_one"))]
    pub async fn return_static_one(
        &self,
        filter: Filter,
        query: &HashMap<String, String>,
    ) -> QueryResponse {
        let params = match self.admit(query) {
            Ok(params) => params,
            Err(rejection) => return rejection,
        };

        let in_flight = self.begin();
        let fetched = self
            .bounded(self.store.find_one(Collection::Static, &filter))
            .await;
        let found = self.keep_one(fetched, &params);
        self.finish(in_flight, usize::from(found.is_some()));

        QueryResponse::single(found.as_ref().map(present_static), None)
    }

    /// Static documents in store order, at most `limit` examined
    #[instrument(skip_all, fields(op = "return_static_many"))]
    pub async fn return_static_many(
        &self,
        filter: Filter,
        query: &HashMap<String, String>,
    ) -> QueryResponse {
        let params = match self.admit(query) {
            Ok(params) => params,
            Err(rejection) => return rejection,
        };
        let options = FindOptions::default().limit(params.limit);

        let in_flight = self.begin();
        let retained = self.collect(Collection::Static, &filter, options, &params).await;
        self.finish(in_flight, retained.len());

        QueryResponse::many(retained.iter().map(present_static).collect(), None)
    }

    fn admit(&self, query: &HashMap<String, String>) -> Result<QueryParams, QueryResponse> {
        self.metrics.requests.inc();
        let params = parse_query_params(query);
        if params.has_error() {
            self.metrics.rejected.inc();
            let text = params.error_text();
            debug!(error = %text, "Rejected query parameters");
            return Err(QueryResponse::error(text));
        }
        debug!(
            after = %format_timestamp(&params.after),
            limit = params.limit,
            point = ?params.point,
            altitude = ?params.altitude,
            "Querying store"
        );
        Ok(params)
    }

    fn begin(&self) -> InFlight<'_> {
        self.metrics.in_flight.inc();
        InFlight {
            metrics: &self.metrics,
            started: Instant::now(),
        }
    }

    fn finish(&self, in_flight: InFlight<'_>, returned: usize) {
        self.metrics.documents_returned.add(returned as u64);
        drop(in_flight);
    }

    async fn bounded<T, F>(&self, fut: F) -> fisb_docstore::Result<T>
    where
        F: std::future::Future<Output = fisb_docstore::Result<T>>,
    {
        tokio::time::timeout(self.query_timeout, fut)
            .await
            .unwrap_or_else(|_| Err(DocStoreError::Timeout(self.query_timeout)))
    }

    fn keep_one(
        &self,
        fetched: fisb_docstore::Result<Option<Document>>,
        params: &QueryParams,
    ) -> Option<Document> {
        match fetched {
            Ok(Some(doc)) if passes_filters(&doc, params) => Some(doc),
            Ok(Some(_)) => {
                self.metrics.documents_filtered.inc();
                None
            }
            Ok(None) => None,
            Err(e) => {
                self.metrics.store_errors.inc();
                error!(error = %e, "Document lookup failed");
                None
            }
        }
    }

    /// Stream candidates through the filters, keeping the survivors.
    async fn collect(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
        params: &QueryParams,
    ) -> Vec<Document> {
        let scan = async {
            let mut stream = self.store.find(collection, filter, options).await?;
            let mut retained = Vec::new();
            while let Some(next) = stream.next().await {
                match next {
                    Ok(doc) if passes_filters(&doc, params) => retained.push(doc),
                    Ok(_) => self.metrics.documents_filtered.inc(),
                    Err(DocStoreError::MalformedDocument(reason)) => {
                        warn!(%reason, "Skipping unreadable document");
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok::<_, DocStoreError>(retained)
        };

        match self.bounded(scan).await {
            Ok(retained) => retained,
            Err(e) => {
                self.metrics.store_errors.inc();
                error!(
                    error = %e,
                    collection = collection.table_name(),
                    "Document query failed"
                );
                Vec::new()
            }
        }
    }
}

/// One in-flight store query. Released on drop, so a request future that is
/// cancelled mid-query still gives its slot back.
struct InFlight<'a> {
    metrics: &'a QueryMetrics,
    started: Instant,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.dec();
        self.metrics
            .latency_ms
            .record(self.started.elapsed().as_secs_f64() * 1000.0);
    }
}

fn passes_filters(doc: &Document, params: &QueryParams) -> bool {
    if let Some(point) = params.point {
        if !contains_point(doc, point) {
            return false;
        }
    }
    if let Some(band) = params.altitude {
        if !within_band(doc, band) {
            return false;
        }
    }
    true
}

fn cursor_of(doc: &Document) -> Option<String> {
    doc.insert_time.as_ref().map(format_timestamp)
}
