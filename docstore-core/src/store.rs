//! The document store facade.
//!
//! [`DocumentStore`] pairs a backend with a [`StoreConfig`] and exposes generic CRUD over any
//! [`Document`]. Every operation resolves the target namespace (document override, else the
//! configured default), obtains the backend's shared connection for the resolved URI, runs
//! against it under a single deadline derived from the configured timeout, and wraps every
//! backend failure into a [`DocumentStoreError`] of the operation's kind.
//!
//! # Example
//!
//! ```ignore
//! use docstore::{prelude::*, memory::InMemoryStore};
//!
//! let store = DocumentStore::new(
//!     InMemoryStore::new(),
//!     StoreConfig::builder().database("testdb").collection("people").build(),
//! );
//!
//! let mut person = Person::new("John", "Doe");
//! store.create(&mut person).await?;
//!
//! let hex = person.id().unwrap().to_hex();
//! let mut found = Person::default();
//! store.get_by_id(&mut found, &hex).await?;
//! ```

use std::{future::Future, time::Duration};

use bson::{Bson, oid::ObjectId};
use futures::TryStreamExt;
use log::{debug, warn};
use tokio::time::{Instant, timeout_at};

use crate::{
    backend::{Connection, DocumentStream, Namespace, StoreBackend},
    config::{StoreConfig, non_empty},
    document::{Document, DocumentExt, ID_FIELD},
    error::{DocumentStoreError, DocumentStoreResult, ErrorKind, code},
    filter::Filter,
};

/// One deadline shared by every round trip of a single operation.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    async fn run<T, F>(&self, future: F) -> DocumentStoreResult<T>
    where
        F: Future<Output = DocumentStoreResult<T>>,
    {
        timeout_at(self.at, future).await.unwrap_or_else(|_| {
            Err(DocumentStoreError::backend(format!(
                "operation timed out after {:?}",
                self.timeout
            )))
        })
    }
}

/// Generic, connection-managed CRUD over any [`Document`].
///
/// # Type Parameters
///
/// * `B` - The backend implementation type. Pass `&backend` to share one backend (and so
///   one set of connections) between several stores.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
    config: StoreConfig,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend and configuration.
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the shared connection for the configured URI, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns a `Connection` error if the client cannot be built or the handshake does not
    /// complete within the configured timeout.
    pub async fn connect(&self) -> DocumentStoreResult<B::Connection> {
        self.open(self.config.uri(), &self.deadline()).await
    }

    /// Inserts `document` and writes the generated identity back into it.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Serialization` if the document cannot be converted to BSON
    /// - `Write` if the insert fails
    pub async fn create<D: Document>(&self, document: &mut D) -> DocumentStoreResult<()> {
        let namespace = self.namespace(document)?;
        let record = document.to_document()?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let inserted = deadline
            .run(connection.insert_one(&namespace, record))
            .await
            .map_err(|e| {
                DocumentStoreError::write(code::CREATE, format!("failed to insert document into {namespace}"))
                    .with_source(e)
            })?;

        if let Some(id) = inserted {
            document.set_id(id);
        }
        debug!("inserted document {inserted:?} into {namespace}");

        Ok(())
    }

    /// Inserts `document` if nothing matches the filter, otherwise replaces the fields of the
    /// first match.
    ///
    /// With no `filter_fields` the filter is identity equality. Otherwise it is built from the
    /// current values of the named (serialized) fields. When the document's identity is unset
    /// the store is probed first: a match lends its identity to `document`, no match mints a
    /// new one. An identity that is already set is never overwritten.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `UnknownField` if a filter field is not registered on the document type
    /// - `Lookup` if the existence probe fails
    /// - `Write` if the upsert fails
    pub async fn upsert<D: Document>(
        &self,
        document: &mut D,
        filter_fields: &[&str],
    ) -> DocumentStoreResult<()> {
        let namespace = self.namespace(document)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let filter = if filter_fields.is_empty() {
            // A freshly minted identity cannot match anything, so there is nothing to probe.
            let id = match document.identity() {
                Some(id) => id,
                None => mint(document),
            };
            Filter::by_id(id)
        } else {
            let filter = Filter::from_fields(document, filter_fields)?;

            if document.identity().is_none() {
                let existing = deadline
                    .run(connection.find_one(&namespace, &filter))
                    .await
                    .map_err(|e| {
                        DocumentStoreError::lookup(code::UPSERT, format!("existence check in {namespace} failed"))
                            .with_source(e)
                    })?;

                match existing.as_ref().and_then(|record| record.get(ID_FIELD)).and_then(Bson::as_object_id) {
                    Some(id) => document.set_id(id),
                    None => {
                        mint(document);
                    }
                }
            }

            filter
        };

        let record = document.to_document()?;
        deadline
            .run(connection.upsert_one(&namespace, &filter, record))
            .await
            .map_err(|e| {
                DocumentStoreError::write(code::UPSERT, format!("failed to upsert document into {namespace}"))
                    .with_source(e)
            })
    }

    /// Fetches the document with identity `id` and decodes it into `document` in place.
    ///
    /// # Errors
    ///
    /// - `Validation` if `id` is not a valid identity
    /// - `NotFound` if no document has that identity
    /// - `Lookup` on any other read failure
    /// - `Decode` if the stored record does not fit the document type
    pub async fn get_by_id<D: Document>(&self, document: &mut D, id: &str) -> DocumentStoreResult<()> {
        let id = parse_id(id, code::GET_BY_ID)?;
        let namespace = self.namespace(document)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let record = deadline
            .run(connection.find_one(&namespace, &Filter::by_id(id)))
            .await
            .map_err(|e| {
                DocumentStoreError::lookup(code::GET_BY_ID, format!("failed to read {id} from {namespace}"))
                    .with_source(e)
            })?
            .ok_or_else(|| {
                DocumentStoreError::not_found(code::GET_BY_ID, format!("no document {id} in {namespace}"))
            })?;

        *document = D::from_document(record)?;

        Ok(())
    }

    /// Finds every document matching alternating field-name / value arguments.
    ///
    /// Each match is decoded into a new instance of `D`. A repeated field keeps its last
    /// value. If the find itself cannot start the result is empty rather than an error; the
    /// failure is only logged.
    ///
    /// # Errors
    ///
    /// - `Validation` if `args` has an odd length or a non-string key (checked before any
    ///   network call)
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Lookup` if the cursor fails after the find started
    /// - `Decode` if a match does not fit the document type
    pub async fn query<D: Document>(&self, document: &D, args: &[Bson]) -> DocumentStoreResult<Vec<D>> {
        let filter = Filter::from_pairs(args)?;
        self.query_filter(document, filter).await
    }

    /// Same as [`query`](Self::query) with a prebuilt [`Filter`].
    pub async fn query_filter<D: Document>(&self, document: &D, filter: Filter) -> DocumentStoreResult<Vec<D>> {
        let namespace = self.namespace(document)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let stream = match deadline.run(connection.find(&namespace, &filter)).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("query on {namespace} could not start, returning no documents: {e}");
                return Ok(Vec::new());
            }
        };

        decode_all(stream, &deadline, code::QUERY).await
    }

    /// Returns every document in the resolved collection.
    ///
    /// An empty collection yields an empty vector.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Lookup` if the find cannot start or the cursor fails
    /// - `Decode` if a record does not fit the document type
    pub async fn get_all<D: Document>(&self, document: &D) -> DocumentStoreResult<Vec<D>> {
        let namespace = self.namespace(document)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let stream = deadline
            .run(connection.find(&namespace, &Filter::new()))
            .await
            .map_err(|e| {
                DocumentStoreError::lookup(code::GET_ALL, format!("failed to list documents in {namespace}"))
                    .with_source(e)
            })?;

        decode_all(stream, &deadline, code::GET_ALL).await
    }

    /// Sets every field of the document with identity `id` to the values of `document`.
    ///
    /// Matching nothing is not an error; the modified count is logged at debug level.
    ///
    /// # Errors
    ///
    /// - `Validation` if `id` is not a valid identity
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Write` if the update fails
    pub async fn update<D: Document>(&self, document: &D, id: &str) -> DocumentStoreResult<()> {
        let id = parse_id(id, code::UPDATE)?;
        let namespace = self.namespace(document)?;
        let record = document.to_document()?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let modified = deadline
            .run(connection.update_one(&namespace, &Filter::by_id(id), record))
            .await
            .map_err(|e| {
                DocumentStoreError::write(code::UPDATE, format!("failed to update {id} in {namespace}"))
                    .with_source(e)
            })?;
        debug!("updated {modified} document(s) in {namespace}");

        Ok(())
    }

    /// Deletes the document with identity `id`.
    ///
    /// Deleting nothing is not an error; the deleted count is logged at debug level.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Validation` if `id` is not a valid identity
    /// - `Write` if the delete fails
    pub async fn delete<D: Document>(&self, document: &D, id: &str) -> DocumentStoreResult<()> {
        let namespace = self.namespace(document)?;
        let id = parse_id(id, code::DELETE)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let deleted = deadline
            .run(connection.delete_one(&namespace, &Filter::by_id(id)))
            .await
            .map_err(|e| {
                DocumentStoreError::write(code::DELETE, format!("failed to delete {id} from {namespace}"))
                    .with_source(e)
            })?;
        debug!("deleted {deleted} document(s) from {namespace}");

        Ok(())
    }

    /// Creates a unique index for each field, in order, and returns the index names.
    ///
    /// Stops at the first failure. Indices created earlier in the same call are kept.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the collection or database cannot be resolved
    /// - `Index` naming the failed attempt and field
    pub async fn create_indices<D: Document>(
        &self,
        document: &D,
        fields: &[&str],
    ) -> DocumentStoreResult<Vec<String>> {
        let namespace = self.namespace(document)?;
        let deadline = self.deadline();
        let connection = self.open(self.uri_for(document), &deadline).await?;

        let mut created = Vec::with_capacity(fields.len());
        for (attempt, field) in fields.iter().enumerate() {
            let name = deadline
                .run(connection.create_unique_index(&namespace, field))
                .await
                .map_err(|e| {
                    DocumentStoreError::index(format!(
                        "attempt {} of {}: failed to create unique index on `{field}` in {namespace}",
                        attempt + 1,
                        fields.len(),
                    ))
                    .with_source(e)
                })?;
            created.push(name);
        }

        Ok(created)
    }

    /// Returns the current value of the field serialized as `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if no field of the document type carries that name.
    pub fn get_field_value<D: Document>(&self, document: &D, name: &str) -> DocumentStoreResult<Bson> {
        document.field_value(name)
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }

    fn deadline(&self) -> Deadline {
        Deadline::after(self.config.timeout())
    }

    fn uri_for<'a, D: Document>(&'a self, document: &'a D) -> &'a str {
        document
            .connection_uri()
            .and_then(non_empty)
            .unwrap_or_else(|| self.config.uri())
    }

    fn namespace<D: Document>(&self, document: &D) -> DocumentStoreResult<Namespace> {
        let database = document.database_name().and_then(non_empty).or(self.config.database());
        let collection = document.collection_name().and_then(non_empty).or(self.config.collection());

        match (database, collection) {
            (Some(database), Some(collection)) => Ok(Namespace::new(database, collection)),
            (database, collection) => Err(DocumentStoreError::configuration(format!(
                "cannot resolve target of {}: database {:?}, collection {:?}",
                std::any::type_name::<D>(),
                database,
                collection,
            ))),
        }
    }

    async fn open(&self, uri: &str, deadline: &Deadline) -> DocumentStoreResult<B::Connection> {
        deadline
            .run(self.backend.connect(uri, self.config.timeout()))
            .await
            .map_err(|e| {
                if e.is(ErrorKind::Connection) {
                    e
                } else {
                    DocumentStoreError::connection(code::HANDSHAKE, format!("could not connect to {uri}"))
                        .with_source(e)
                }
            })
    }
}

fn mint<D: Document>(document: &mut D) -> ObjectId {
    let id = ObjectId::new();
    document.set_id(id);
    id
}

fn parse_id(id: &str, code: u32) -> DocumentStoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| {
        DocumentStoreError::validation(code, format!("`{id}` is not a valid identity")).with_source(e)
    })
}

async fn decode_all<D: Document>(
    stream: DocumentStream,
    deadline: &Deadline,
    code: u32,
) -> DocumentStoreResult<Vec<D>> {
    deadline
        .run(stream.try_collect::<Vec<_>>())
        .await
        .map_err(|e| DocumentStoreError::lookup(code, "cursor failed while reading documents").with_source(e))?
        .into_iter()
        .map(D::from_document)
        .collect()
}
