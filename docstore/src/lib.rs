//! Main docstore crate providing generic document CRUD over pluggable backends.
//!
//! This crate is the primary entry point. It re-exports the core types from the sub-crates,
//! the `DocumentFields` derive, the storage backends, the file logger and the YAML settings
//! loader.
//!
//! # Features
//!
//! - **Generic CRUD** - Create, upsert, lookup, query, update and delete any serde type
//! - **Multiple backends** - MongoDB for production (`mongodb` feature) and an in-memory store
//! - **Shared connections** - One connection per URI, created on first use
//! - **File logging** - Queue-backed logger with size rotation into zip archives
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{prelude::*, memory::InMemoryStore};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, DocumentFields)]
//! pub struct Person {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     #[serde(rename = "firstName")]
//!     pub first_name: String,
//!     #[serde(rename = "lastName")]
//!     pub last_name: String,
//! }
//!
//! impl Document for Person {
//!     fn id(&self) -> Option<ObjectId> { self.id }
//!     fn set_id(&mut self, id: ObjectId) { self.id = Some(id); }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(".")?;
//!     let store = DocumentStore::new(
//!         InMemoryStore::builder().build().await?,
//!         settings.mongo_configs().remove(0),
//!     );
//!
//!     let mut person = Person {
//!         first_name: "John".into(),
//!         last_name: "Doe".into(),
//!         ..Default::default()
//!     };
//!     store.create(&mut person).await?;
//!
//!     let matches = store
//!         .query(&Person::default(), &["lastName".into(), "Doe".into()])
//!         .await?;
//!     println!("found {matches:?}");
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - `mongodb` - MongoDB backend (requires the `mongodb` feature)

pub mod prelude;
pub mod settings;

pub use docstore_core::{backend, config, document, error, filter, store};
pub use docstore_macros::DocumentFields;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docstore_memory::{InMemoryConnection, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docstore_mongodb::{ConnectionPool, MongoConnection, MongoDbStore, MongoDbStoreBuilder};
}

/// Asynchronous rotating file logging.
pub mod logging {
    pub use docstore_logging::{
        FileLogger, FileLoggerBuilder, LogLevel, Logger, LoggerError, LoggerResult, install, render,
    };
}
