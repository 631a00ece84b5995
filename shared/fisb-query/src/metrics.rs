//! Query pipeline metrics

use fisb_telemetry::{Counter, Gauge, Histogram, HistogramSnapshot};
use serde::Serialize;

#[derive(Clone)]
pub struct QueryMetrics {
    pub requests: Counter,
    pub rejected: Counter,
    pub store_errors: Counter,
    pub documents_returned: Counter,
    pub documents_filtered: Counter,
    pub in_flight: Gauge,
    pub latency_ms: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub rejected: u64,
    pub store_errors: u64,
    pub documents_returned: u64,
    pub documents_filtered: u64,
    pub in_flight: u64,
    pub latency_ms: HistogramSnapshot,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self {
            requests: Counter::new(),
            rejected: Counter::new(),
            store_errors: Counter::new(),
            documents_returned: Counter::new(),
            documents_filtered: Counter::new(),
            in_flight: Gauge::new(),
            latency_ms: Histogram::new(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.get(),
            rejected: self.rejected.get(),
            store_errors: self.store_errors.get(),
            documents_returned: self.documents_returned.get(),
            documents_filtered: self.documents_filtered.get(),
            in_flight: self.in_flight.get(),
            latency_ms: self.latency_ms.snapshot(),
        }
    }
}

impl Default for QueryMetrics {
    fn default() -> Self {
        Self::new()
    }
}
