//! FIS-B query pipeline
//!
//! Validates the standard query string, pulls candidate documents from the
//! store, applies the point-in-polygon and altitude-band filters, normalizes
//! each retained message for presentation and wraps everything in the
//! response envelope.

pub mod altitude;
pub mod envelope;
pub mod executor;
pub mod geometry;
pub mod metrics;
pub mod normalize;
pub mod params;
pub mod timestamp;


pub use envelope::QueryResponse;
pub use executor::QueryExecutor;
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use normalize::{normalize, present_static};
pub use params::{parse_query_params, AltitudeBand, GeoPoint, QueryParams, DEFAULT_LIMIT};
pub use timestamp::format_timestamp;
