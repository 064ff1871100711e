//! In-memory storage implementation for document stores.
//!
//! This module provides a simple backend that keeps documents as BSON in per-collection
//! vectors behind an async-safe read-write lock.

use std::{collections::{HashMap, HashSet}, sync::Arc, time::Duration};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use futures::{StreamExt, stream::iter};
use log::debug;
use mea::rwlock::RwLock;

use docstore_core::{
    backend::{Connection, DocumentStream, Namespace, StoreBackend, StoreBackendBuilder, split_id},
    document::ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
};

use crate::evaluator::{index_key, matches, values_equal};

#[derive(Debug, Default)]
struct CollectionData {
    documents: Vec<Document>,
    /// Fields carrying a unique index
    unique: Vec<String>,
}

impl CollectionData {
    fn position(&self, filter: &Filter) -> Option<usize> {
        self.documents.iter().position(|doc| matches(doc, filter))
    }

    /// Checks `candidate` against `_id` and every unique index, ignoring the document at `skip`.
    fn check_unique(&self, candidate: &Document, skip: Option<usize>) -> DocumentStoreResult<()> {
        let fields = std::iter::once(ID_FIELD).chain(self.unique.iter().map(String::as_str));

        for field in fields {
            let key = index_key(candidate, field);
            let duplicate = self
                .documents
                .iter()
                .enumerate()
                .filter(|(position, _)| Some(*position) != skip)
                .any(|(_, existing)| values_equal(index_key(existing, field), key));

            if duplicate {
                return Err(DocumentStoreError::backend(format!(
                    "duplicate key error: {field} {key}"
                )));
            }
        }

        Ok(())
    }
}

type StoreMap = HashMap<Namespace, CollectionData>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones share
/// the same documents. Connection URIs are accepted as-is and all of them see the same data;
/// the store remembers which URIs have been connected.
///
/// Unique indices are enforced on insert, upsert and update. Queries scan the whole
/// collection.
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
    connected: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder
    }

    /// The number of distinct URIs connected so far.
    pub async fn connection_count(&self) -> usize {
        self.connected.read().await.len()
    }

    /// The number of documents stored in `namespace`.
    pub async fn count(&self, namespace: &Namespace) -> usize {
        self.store
            .read()
            .await
            .get(namespace)
            .map_or(0, |collection| collection.documents.len())
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    type Connection = InMemoryConnection;

    async fn connect(&self, uri: &str, _timeout: Duration) -> DocumentStoreResult<Self::Connection> {
        if self.connected.write().await.insert(uri.to_string()) {
            debug!("opened in-memory connection for {uri}");
        }

        Ok(InMemoryConnection {
            store: Arc::clone(&self.store),
        })
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.connected.write().await.clear();

        Ok(())
    }
}

/// A handle onto the shared state of an [`InMemoryStore`].
#[derive(Clone, Debug)]
pub struct InMemoryConnection {
    store: Arc<RwLock<StoreMap>>,
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn insert_one(&self, namespace: &Namespace, mut document: Document) -> DocumentStoreResult<Option<ObjectId>> {
        let id = match document.get(ID_FIELD) {
            Some(Bson::ObjectId(id)) => Some(*id),
            Some(_) => None,
            None => {
                let id = ObjectId::new();
                document.insert(ID_FIELD, id);
                Some(id)
            }
        };

        let mut store = self.store.write().await;
        let collection = store.entry(namespace.clone()).or_default();
        collection.check_unique(&document, None)?;
        collection.documents.push(document);

        Ok(id)
    }

    async fn find_one(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<Option<Document>> {
        Ok(
            self.store
                .read()
                .await
                .get(namespace)
                .and_then(|collection| collection.position(filter).map(|i| collection.documents[i].clone()))
        )
    }

    async fn find(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<DocumentStream> {
        let documents = match self.store.read().await.get(namespace) {
            Some(collection) => collection
                .documents
                .iter()
                .filter(|doc| matches(doc, filter))
                .cloned()
                .collect::<Vec<_>>(),
            None => vec![],
        };

        Ok(iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn upsert_one(&self, namespace: &Namespace, filter: &Filter, document: Document) -> DocumentStoreResult<()> {
        let (id, fields) = split_id(document);

        let mut store = self.store.write().await;
        let collection = store.entry(namespace.clone()).or_default();

        match collection.position(filter) {
            Some(position) => {
                let mut updated = collection.documents[position].clone();
                for (field, value) in fields {
                    updated.insert(field, value);
                }
                collection.check_unique(&updated, Some(position))?;
                collection.documents[position] = updated;
            }
            None => {
                // New documents start from the filter's equality constraints, like MongoDB.
                let mut inserted = Document::new();
                inserted.insert(ID_FIELD, id.unwrap_or_else(|| Bson::ObjectId(ObjectId::new())));
                for (field, value) in filter.iter() {
                    if field != ID_FIELD {
                        inserted.insert(field.clone(), value.clone());
                    }
                }
                for (field, value) in fields {
                    inserted.insert(field, value);
                }
                collection.check_unique(&inserted, None)?;
                collection.documents.push(inserted);
            }
        }

        Ok(())
    }

    async fn update_one(&self, namespace: &Namespace, filter: &Filter, document: Document) -> DocumentStoreResult<u64> {
        let (_, fields) = split_id(document);

        let mut store = self.store.write().await;
        let Some(collection) = store.get_mut(namespace) else {
            return Ok(0);
        };
        let Some(position) = collection.position(filter) else {
            return Ok(0);
        };

        let current = &collection.documents[position];
        let changed = fields.iter().any(|(field, value)| current.get(field) != Some(value));
        if !changed {
            return Ok(0);
        }

        let mut updated = current.clone();
        for (field, value) in fields {
            updated.insert(field, value);
        }
        collection.check_unique(&updated, Some(position))?;
        collection.documents[position] = updated;

        Ok(1)
    }

    async fn delete_one(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection) = store.get_mut(namespace) else {
            return Ok(0);
        };

        Ok(match collection.position(filter) {
            Some(position) => {
                collection.documents.remove(position);
                1
            }
            None => 0,
        })
    }

    async fn create_unique_index(&self, namespace: &Namespace, field: &str) -> DocumentStoreResult<String> {
        let name = format!("{field}_1");

        let mut store = self.store.write().await;
        let collection = store.entry(namespace.clone()).or_default();
        if collection.unique.iter().any(|existing| existing == field) {
            return Ok(name);
        }

        for (position, document) in collection.documents.iter().enumerate() {
            let key = index_key(document, field);
            let duplicate = collection.documents[position + 1..]
                .iter()
                .any(|other| values_equal(index_key(other, field), key));

            if duplicate {
                return Err(DocumentStoreError::backend(format!(
                    "cannot build unique index {name} on {namespace}: duplicate key {key}"
                )));
            }
        }

        collection.unique.push(field.to_string());

        Ok(name)
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
