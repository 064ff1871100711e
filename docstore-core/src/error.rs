//! Error types and result types for document store operations.
//!
//! Every fallible facade operation returns [`DocumentStoreResult<T>`]. Failures carry an
//! [`ErrorKind`] to branch on, a diagnostic numeric code, a human readable message and,
//! when there is one, the underlying cause reachable through [`std::error::Error::source`].

use std::fmt;

use bson::error::Error as BsonError;
use thiserror::Error;

/// Boxed cause attached to a [`DocumentStoreError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Diagnostic codes grouped by the operation that failed.
///
/// The values are meant for logs and troubleshooting, not for matching by value.
pub mod code {
    pub const CLIENT: u32 = 1000;
    pub const HANDSHAKE: u32 = 1001;
    pub const CONFIGURATION: u32 = 1002;
    pub const CREATE: u32 = 1003;
    pub const GET_BY_ID: u32 = 1004;
    pub const GET_ALL: u32 = 1005;
    pub const DELETE: u32 = 1006;
    pub const QUERY: u32 = 1007;
    pub const UPDATE: u32 = 1008;
    pub const UPSERT: u32 = 1009;
    pub const INDEX: u32 = 1010;
    pub const FIELD_LOOKUP: u32 = 1011;
    pub const SERIALIZATION: u32 = 1100;
    pub const BACKEND: u32 = 1200;
}

/// The category of a [`DocumentStoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backing store could not be reached or the client could not be built.
    Connection,
    /// The collection or database name could not be resolved.
    Configuration,
    /// Caller input was malformed (identity hex, query arguments).
    Validation,
    /// A read failed for a reason other than "not found".
    Lookup,
    /// No document matched.
    NotFound,
    /// An insert, update, upsert or delete failed.
    Write,
    /// A stored record could not be materialized into the target type.
    Decode,
    /// An index could not be created.
    Index,
    /// No field of the document type carries the requested serialized name.
    UnknownField,
    /// A document could not be converted to BSON.
    Serialization,
    /// A raw failure reported by a storage backend, before the facade wraps it.
    Backend,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Connection => "Connection error",
            ErrorKind::Configuration => "Configuration error",
            ErrorKind::Validation => "Validation error",
            ErrorKind::Lookup => "Lookup error",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Write => "Write error",
            ErrorKind::Decode => "Decode error",
            ErrorKind::Index => "Index error",
            ErrorKind::UnknownField => "Unknown field",
            ErrorKind::Serialization => "Serialization error",
            ErrorKind::Backend => "Backend error",
        })
    }
}

/// The uniform failure type surfaced by every store operation.
#[derive(Error, Debug)]
#[error("{kind} ({code}): {message}")]
pub struct DocumentStoreError {
    kind: ErrorKind,
    code: u32,
    message: String,
    #[source]
    source: Option<BoxError>,
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl DocumentStoreError {
    /// Creates an error without an underlying cause.
    pub fn new(kind: ErrorKind, code: u32, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn connection(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, code, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, code::CONFIGURATION, message)
    }

    pub fn validation(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    pub fn lookup(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lookup, code, message)
    }

    pub fn not_found(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub fn write(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Write, code, message)
    }

    pub fn decode(code: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, code, message)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, code::INDEX, message)
    }

    /// No field of `type_name` is serialized under `field`.
    pub fn unknown_field(field: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownField,
            code::FIELD_LOOKUP,
            format!("no field of {type_name} is serialized as `{field}`"),
        )
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, code::BACKEND, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::new(ErrorKind::Serialization, code::SERIALIZATION, err.to_string())
            .with_source(err)
    }
}
