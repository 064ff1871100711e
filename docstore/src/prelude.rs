//! Convenient re-exports of commonly used types from docstore.
//!
//! ```ignore
//! use docstore::prelude::*;
//! ```

pub use docstore_core::{
    backend::{Connection, StoreBackend, StoreBackendBuilder},
    config::StoreConfig,
    document::{Document, DocumentExt, FieldRegistry},
    error::{DocumentStoreError, DocumentStoreResult, ErrorKind},
    filter::Filter,
    store::DocumentStore,
};
pub use docstore_logging::{FileLogger, LogLevel, Logger};
pub use docstore_macros::DocumentFields;

pub use crate::settings::Settings;
