use std::time::Duration;

use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::{StreamExt, TryStreamExt};
use mongodb::{Client, Collection as MongoCollection, IndexModel, options::IndexOptions};

use docstore_core::{
    backend::{Connection, DocumentStream, Namespace, StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
};

use crate::{pool::ConnectionPool, query::MongoQueryTranslator};

/// MongoDB storage backend.
///
/// Connections come from a [`ConnectionPool`], so every store built on the same pool (or on
/// clones of one backend) shares one client per URI.
#[derive(Debug, Clone, Default)]
pub struct MongoDbStore {
    pool: ConnectionPool,
}

impl MongoDbStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn builder() -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::default()
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    type Connection = MongoConnection;

    async fn connect(&self, uri: &str, timeout: Duration) -> DocumentStoreResult<Self::Connection> {
        Ok(MongoConnection {
            client: self.pool.connect(uri, timeout).await?,
        })
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.pool.shutdown().await;

        Ok(())
    }
}

/// A connected MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoConnection {
    client: Client,
}

impl MongoConnection {
    fn collection(&self, namespace: &Namespace) -> MongoCollection<Document> {
        self.client
            .database(&namespace.database)
            .collection(&namespace.collection)
    }
}

fn backend_error(e: mongodb::error::Error) -> DocumentStoreError {
    DocumentStoreError::backend(e.to_string()).with_source(e)
}

#[async_trait]
impl Connection for MongoConnection {
    async fn insert_one(&self, namespace: &Namespace, document: Document) -> DocumentStoreResult<Option<ObjectId>> {
        let result = self
            .collection(namespace)
            .insert_one(document)
            .await
            .map_err(backend_error)?;

        Ok(match result.inserted_id {
            Bson::ObjectId(id) => Some(id),
            _ => None,
        })
    }

    async fn find_one(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<Option<Document>> {
        self.collection(namespace)
            .find_one(MongoQueryTranslator::filter(filter))
            .await
            .map_err(backend_error)
    }

    async fn find(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<DocumentStream> {
        Ok(
            self.collection(namespace)
                .find(MongoQueryTranslator::filter(filter))
                .await
                .map_err(backend_error)?
                .map_err(backend_error)
                .boxed()
        )
    }

    async fn upsert_one(&self, namespace: &Namespace, filter: &Filter, document: Document) -> DocumentStoreResult<()> {
        let mut update = MongoQueryTranslator::upsert(document);
        if update.is_empty() {
            // The server rejects updates without operators.
            update.insert("$setOnInsert", doc! { "_id": ObjectId::new() });
        }

        self.collection(namespace)
            .update_one(MongoQueryTranslator::filter(filter), update)
            .upsert(true)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn update_one(&self, namespace: &Namespace, filter: &Filter, document: Document) -> DocumentStoreResult<u64> {
        let Some(update) = MongoQueryTranslator::set(document) else {
            return Ok(0);
        };

        Ok(
            self.collection(namespace)
                .update_one(MongoQueryTranslator::filter(filter), update)
                .await
                .map_err(backend_error)?
                .modified_count
        )
    }

    async fn delete_one(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<u64> {
        Ok(
            self.collection(namespace)
                .delete_one(MongoQueryTranslator::filter(filter))
                .await
                .map_err(backend_error)?
                .deleted_count
        )
    }

    async fn create_unique_index(&self, namespace: &Namespace, field: &str) -> DocumentStoreResult<String> {
        Ok(
            self.collection(namespace)
                .create_index(
                    IndexModel::builder()
                    .keys(doc! { field: 1 })
                    .options(
                        IndexOptions::builder()
                        .unique(true)
                        .build()
                    )
                    .build()
                )
                .await
                .map_err(backend_error)?
                .index_name
        )
    }
}

/// Builder for [`MongoDbStore`].
///
/// Without an explicit pool the store gets a fresh one.
#[derive(Default)]
pub struct MongoDbStoreBuilder {
    pool: Option<ConnectionPool>,
}

impl MongoDbStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares an existing pool with the built store.
    pub fn pool(mut self, pool: ConnectionPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore::new(self.pool.unwrap_or_default()))
    }
}
