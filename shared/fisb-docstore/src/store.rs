//! The document store seam

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::filter::Filter;
use crate::types::{Collection, Document, FindOptions};
use crate::Result;

/// Lazily consumed result cursor
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Read-only access to a document collection.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs and readiness output
    fn backend_name(&self) -> &'static str;

    /// Stream every document matching `filter`, honoring `options`
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<DocumentStream>;

    /// First matching document in the store's natural order
    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let mut stream = self
            .find(collection, filter, FindOptions::default().limit(1))
            .await?;
        stream.next().await.transpose()
    }

    /// Cheap liveness probe
    async fn ping(&self) -> bool;
}
