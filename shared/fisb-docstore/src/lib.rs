//! FIS-B Document Store
//!
//! Read-only access to the message documents written by the ingestion side.
//! Provides the `DocumentStore` seam, a declarative `Filter`, a pooled
//! PostgreSQL-wire backend storing documents as JSONB, and an in-memory
//! backend for tests and local runs.

mod error;
mod filter;
mod memory;
mod pool;
mod postgres;
mod store;
mod types;

pub use error::{DocStoreError, Result};
pub use filter::{Condition, Filter, KEY_FIELD};
pub use memory::MemoryStore;
pub use pool::{DocStorePool, PoolConfig};
pub use postgres::PgDocumentStore;
pub use store::{DocumentStore, DocumentStream};
pub use types::{parse_stored_time, Collection, Document, FindOptions};
