use async_trait::async_trait;

use crate::{Document, DocumentId, Filter, Result, UpdateAck, UpdatePatch};

/// Core trait for document store implementations.
///
/// A document store holds named collections of JSON documents, each keyed
/// by its `_id`. Every operation is a single round-trip; there are no
/// cross-collection transactions. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its identifier.
    ///
    /// A document without `_id` is assigned a fresh one. Inserting an `_id`
    /// that already exists in the collection fails with `DuplicateKey`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<DocumentId>;

    /// Returns the first document matching the filter, if any.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Returns every document matching the filter.
    ///
    /// Documents are returned in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Applies a `$set` patch to the first document matching the filter.
    ///
    /// Matching nothing is not an error; the acknowledgement reports it.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdatePatch,
    ) -> Result<UpdateAck>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Fetches a single document by `_id`.
    async fn find_by_id(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        self.find_one(collection, &Filter::by_id(id)).await
    }

    /// Counts the documents matching a filter.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
        Ok(self.find(collection, filter).await?.len())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}
