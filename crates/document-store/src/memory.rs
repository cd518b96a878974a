use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Document, DocumentId, Filter, Result, StoreError, UpdateAck, UpdatePatch,
    store::DocumentStore,
};

/// A store operation, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InsertOne,
    FindOne,
    Find,
    UpdateOne,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::InsertOne => "insert_one",
            Operation::FindOne => "find_one",
            Operation::Find => "find",
            Operation::UpdateOne => "update_one",
        }
    }
}

/// In-memory document store implementation for testing.
///
/// Collections keep documents in insertion order. Faults can be injected per
/// operation and collection to simulate an unavailable backend.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    faults: Arc<RwLock<HashSet<(Operation, String)>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Clears all collections and faults.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
        self.faults.write().await.clear();
    }

    /// Makes every `operation` against `collection` fail with `Unavailable`
    /// until [`clear_faults`](Self::clear_faults) is called.
    pub async fn fail_on(&self, operation: Operation, collection: impl Into<String>) {
        self.faults
            .write()
            .await
            .insert((operation, collection.into()));
    }

    /// Removes all injected faults.
    pub async fn clear_faults(&self) {
        self.faults.write().await.clear();
    }

    async fn check_fault(&self, operation: Operation, collection: &str) -> Result<()> {
        let faults = self.faults.read().await;
        if faults.contains(&(operation, collection.to_string())) {
            return Err(StoreError::Unavailable {
                operation: operation.as_str(),
                collection: collection.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<DocumentId> {
        self.check_fault(Operation::InsertOne, collection).await?;

        let id = match document.get(crate::ID_FIELD) {
            Some(_) => document.require_id()?,
            None => {
                let id = DocumentId::new();
                document.set_id(id);
                id
            }
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.iter().any(|d| d.id() == Some(id)) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                id,
            });
        }

        documents.push(document);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        self.check_fault(Operation::FindOne, collection).await?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        self.check_fault(Operation::Find, collection).await?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &UpdatePatch,
    ) -> Result<UpdateAck> {
        self.check_fault(Operation::UpdateOne, collection).await?;
        patch.validate()?;

        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(UpdateAck::unmatched());
        };

        let modified = patch.apply_to(document);
        Ok(UpdateAck {
            matched: 1,
            modified: u64::from(modified),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::DocumentStoreExt;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_missing_id() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one("users", doc(json!({ "name": "Ada" })))
            .await
            .unwrap();

        let stored = store.find_by_id("users", id).await.unwrap().unwrap();
        assert_eq!(stored.id(), Some(id));
        assert_eq!(stored.get("name"), Some(&json!("Ada")));
    }

    #[tokio::test]
    async fn insert_keeps_provided_id() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();
        let mut document = doc(json!({ "name": "Ada" }));
        document.set_id(id);

        let returned = store.insert_one("users", document).await.unwrap();
        assert_eq!(returned, id);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let mut document = doc(json!({}));
        document.set_id(DocumentId::new());

        store.insert_one("users", document.clone()).await.unwrap();
        let result = store.insert_one("users", document).await;

        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(store.document_count("users").await, 1);
    }

    #[tokio::test]
    async fn same_id_in_different_collections_is_allowed() {
        let store = InMemoryDocumentStore::new();
        let mut document = doc(json!({}));
        document.set_id(DocumentId::new());

        store.insert_one("users", document.clone()).await.unwrap();
        assert!(store.insert_one("orders", document).await.is_ok());
    }

    #[tokio::test]
    async fn find_returns_insertion_order() {
        let store = InMemoryDocumentStore::new();
        for n in 0..5 {
            store
                .insert_one("orders", doc(json!({ "n": n })))
                .await
                .unwrap();
        }

        let all = store.find("orders", &Filter::new()).await.unwrap();
        let ns: Vec<_> = all.iter().map(|d| d.get("n").cloned().unwrap()).collect();
        assert_eq!(ns, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[tokio::test]
    async fn find_in_unknown_collection_is_empty() {
        let store = InMemoryDocumentStore::new();
        let found = store.find("products", &Filter::new()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn bulk_find_by_id_set() {
        let store = InMemoryDocumentStore::new();
        let a = store.insert_one("products", doc(json!({}))).await.unwrap();
        let _b = store.insert_one("products", doc(json!({}))).await.unwrap();
        let c = store.insert_one("products", doc(json!({}))).await.unwrap();

        let found = store
            .find("products", &Filter::id_in([a, c]))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().filter_map(Document::id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[tokio::test]
    async fn update_one_sets_fields_on_first_match() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert_one("users", doc(json!({ "cart": { "items": [1] } })))
            .await
            .unwrap();

        let patch = UpdatePatch::set("cart", &json!({ "items": [] })).unwrap();
        let ack = store
            .update_one("users", &Filter::by_id(id), &patch)
            .await
            .unwrap();
        assert_eq!(ack, UpdateAck { matched: 1, modified: 1 });

        let stored = store.find_by_id("users", id).await.unwrap().unwrap();
        assert_eq!(stored.get("cart"), Some(&json!({ "items": [] })));
    }

    #[tokio::test]
    async fn update_one_without_match_is_acknowledged() {
        let store = InMemoryDocumentStore::new();
        let patch = UpdatePatch::set("cart", &json!({})).unwrap();
        let ack = store
            .update_one("users", &Filter::by_id(DocumentId::new()), &patch)
            .await
            .unwrap();
        assert!(!ack.is_matched());
    }

    #[tokio::test]
    async fn injected_fault_fails_only_targeted_operation() {
        let store = InMemoryDocumentStore::new();
        store.fail_on(Operation::Find, "products").await;

        let result = store.find("products", &Filter::new()).await;
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));

        assert!(store.find("orders", &Filter::new()).await.is_ok());
        assert!(store.insert_one("products", doc(json!({}))).await.is_ok());

        store.clear_faults().await;
        assert!(store.find("products", &Filter::new()).await.is_ok());
    }

    #[tokio::test]
    async fn count_uses_filter() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_one("orders", doc(json!({ "user": { "name": "a" } })))
            .await
            .unwrap();
        store
            .insert_one("orders", doc(json!({ "user": { "name": "b" } })))
            .await
            .unwrap();

        let count = store
            .count("orders", &Filter::field("user.name", json!("a")))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
