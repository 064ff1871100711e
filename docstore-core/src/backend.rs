//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over concrete storage implementations so
//! the [`DocumentStore`](crate::store::DocumentStore) facade can drive MongoDB in production
//! and an in-memory store in development and tests.
//!
//! # Traits
//!
//! - [`StoreBackend`]: establishes (and caches) connections and releases them on shutdown
//! - [`Connection`]: the per-collection operations the facade needs
//! - [`StoreBackendBuilder`]: factory trait for creating backend instances
//!
//! # Error Handling
//!
//! Backends report failures as `Backend` errors, or `Connection` errors from
//! [`StoreBackend::connect`]. The facade wraps them into the error kind of the operation
//! being performed, keeping the backend error as the cause.

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, oid::ObjectId};
use futures::stream::BoxStream;
use std::{fmt::{self, Debug}, time::Duration};

use crate::{error::DocumentStoreResult, filter::Filter};

/// A stream of stored records produced by [`Connection::find`].
pub type DocumentStream = BoxStream<'static, DocumentStoreResult<BsonDocument>>;

/// The database and collection an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Abstract interface for storage backends.
///
/// A backend owns its connections. The first successful [`connect`](StoreBackend::connect)
/// for a URI creates the connection and every later call for that URI returns the same
/// handle. Implementations must make first-time creation happen at most once per URI even
/// under concurrent callers.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// The shared connection handle handed to the facade.
    type Connection: Connection;

    /// Returns the connection for `uri`, creating it on first use.
    ///
    /// Creation must complete within `timeout`, including the initial handshake.
    async fn connect(&self, uri: &str, timeout: Duration) -> DocumentStoreResult<Self::Connection>;

    /// Releases every connection held by this backend.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    type Connection = B::Connection;

    async fn connect(&self, uri: &str, timeout: Duration) -> DocumentStoreResult<Self::Connection> {
        (**self).connect(uri, timeout).await
    }
}

/// Operations against an established connection.
///
/// Filters are flat equality constraints; every operation targets a single [`Namespace`].
#[async_trait]
pub trait Connection: Clone + Send + Sync + Debug + 'static {
    /// Inserts one document and returns its identity if the store generated or reported one.
    async fn insert_one(
        &self,
        namespace: &Namespace,
        document: BsonDocument,
    ) -> DocumentStoreResult<Option<ObjectId>>;

    /// Returns the first document matching `filter`, if any.
    async fn find_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> DocumentStoreResult<Option<BsonDocument>>;

    /// Starts a find and returns the matching documents as a stream.
    ///
    /// An `Err` means the find could not start; an `Err` item means it failed while
    /// iterating.
    async fn find(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<DocumentStream>;

    /// Sets every non-`_id` field of `document` on the first match, inserting a new document
    /// if nothing matches. `_id`, when present, is only written on insert.
    async fn upsert_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        document: BsonDocument,
    ) -> DocumentStoreResult<()>;

    /// Sets every non-`_id` field of `document` on the first match and returns how many
    /// documents were modified.
    async fn update_one(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        document: BsonDocument,
    ) -> DocumentStoreResult<u64>;

    /// Deletes the first match and returns how many documents were deleted.
    async fn delete_one(&self, namespace: &Namespace, filter: &Filter) -> DocumentStoreResult<u64>;

    /// Creates a unique ascending index on `field` and returns its name.
    async fn create_unique_index(&self, namespace: &Namespace, field: &str) -> DocumentStoreResult<String>;
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder: Send {
    type Backend: StoreBackend;

    /// Builds and returns the backend instance.
    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}

/// Splits `document` into its `_id` (if any) and the remaining fields.
pub fn split_id(mut document: BsonDocument) -> (Option<Bson>, BsonDocument) {
    let id = document.remove(crate::document::ID_FIELD);
    (id, document)
}
