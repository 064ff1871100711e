//! Generic document CRUD over pluggable storage backends.
//!
//! This crate is the core of the docstore project and provides:
//!
//! - **Document traits** ([`document`]) - The capability contract and field registry every stored type implements
//! - **Filters** ([`filter`]) - Flat field-equality filters
//! - **Configuration** ([`config`]) - Connection URI, timeout and default names for a store
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing different storage backends
//! - **Document store** ([`store`]) - The facade exposing create, upsert, lookups, queries, updates, deletes and indices
//! - **Error handling** ([`error`]) - The uniform error type and result alias
//!
//! # Example
//!
//! ```ignore
//! use docstore::prelude::*;
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
//!     fn id(&self) -> Option<ObjectId> {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: ObjectId) {
//!         self.id = Some(id);
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docstore_core;

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod store;

// Generated field registries refer to BSON through this re-export.
pub use bson;
