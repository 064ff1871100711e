//! In-memory document storage backend for docstore.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development
//! and tests, where running a MongoDB server is not practical.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **MongoDB equality** - Numbers compare by value across integer and float types
//! - **Unique indices** - Enforced on every write once created
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().build().await?;
//!     let store = DocumentStore::new(backend, StoreConfig::default());
//!
//!     let mut person = Person::new("John", "Doe");
//!     store.create(&mut person).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstore_memory;

mod evaluator;
pub mod store;

pub use store::{InMemoryConnection, InMemoryStore, InMemoryStoreBuilder};
