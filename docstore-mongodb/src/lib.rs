//! MongoDB backend implementation for docstore.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait on top of
//! the official async driver.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docstore = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! Clients are created lazily by a [`ConnectionPool`], one per connection URI, and verified
//! with a `ping` against the `admin` database before first use. Every store sharing a pool
//! shares its clients.
//!
//! # Example
//!
//! ```ignore
//! use docstore::{prelude::*, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(
//!         MongoDbStore::builder().build().await?,
//!         StoreConfig::builder()
//!             .uri("mongodb://localhost:27017")
//!             .database("testdb")
//!             .collection("people")
//!             .build(),
//!     );
//!
//!     store.connect().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstore_mongodb;

pub mod pool;
mod query;
pub mod store;

pub use pool::ConnectionPool;
pub use store::{MongoConnection, MongoDbStore, MongoDbStoreBuilder};
