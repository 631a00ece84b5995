//! Document store error types

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocStoreError>;

#[derive(Debug, Error)]
pub enum DocStoreError {
    #[error("Query error: {0}")]
    Query(tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
