//! In-memory document store

use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::filter::Filter;
use crate::store::{DocumentStore, DocumentStream};
use crate::types::{Collection, Document, FindOptions};
use crate::{DocStoreError, Result};

/// Vec-backed store holding both collections.
///
/// Documents keep their insertion order, which is the natural order returned
/// when no sort is requested.
#[derive(Default)]
pub struct MemoryStore {
    messages: RwLock<Vec<Document>>,
    statics: RwLock<Vec<Document>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: Collection, doc: Document) {
        self.collection(collection).write().push(doc);
    }

    /// Insert a full stored JSON object (with `_id` / `insert_time` inline)
    pub fn insert_value(&self, collection: Collection, value: Value) -> Result<()> {
        let doc = Document::from_value(value)?;
        self.insert(collection, doc);
        Ok(())
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collection(collection).read().len()
    }

    /// Make every subsequent query fail, as a dropped connection would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn collection(&self, collection: Collection) -> &RwLock<Vec<Document>> {
        match collection {
            Collection::Msg => &self.messages,
            Collection::Static => &self.statics,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<DocumentStream> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DocStoreError::Unavailable("memory store marked unavailable".into()));
        }

        let mut matched: Vec<Document> = self
            .collection(collection)
            .read()
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();

        if options.oldest_first {
            matched.sort_by_key(|d| d.insert_time);
        }

        if let Some(limit) = options.limit {
            matched.truncate(limit);
        }

        Ok(futures_util::stream::iter(matched.into_iter().map(Ok)).boxed())
    }

    async fn ping(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
