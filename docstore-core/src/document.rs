//! Core traits for document representation and serialization.
//!
//! This module provides the capability contract every stored type implements, the
//! compile-time field registry used to build filters from named fields, and helpers for
//! converting documents to and from BSON.

use bson::{Bson, Document as BsonDocument, oid::ObjectId};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DocumentStoreError, DocumentStoreResult, code};

/// The serialized key of a document's identity.
pub const ID_FIELD: &str = "_id";

/// Core trait that all documents stored through a document store must implement.
///
/// Collection, database and URI lookups return `None` (or an empty string) to defer to the
/// defaults configured on the store. The identity is optional: `None` marks a document that
/// has not been stored yet.
///
/// # Example
///
/// ```ignore
/// use docstore::prelude::*;
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize, DocumentFields)]
/// pub struct Person {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     #[serde(rename = "firstName")]
///     pub first_name: String,
/// }
///
/// impl Document for Person {
///     fn collection_name(&self) -> Option<&str> {
///         Some("people")
///     }
///
///     fn id(&self) -> Option<ObjectId> {
///         self.id
///     }
///
///     fn set_id(&mut self, id: ObjectId) {
///         self.id = Some(id);
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + FieldRegistry + Send + Sync + 'static {
    /// Overrides the store's default collection.
    fn collection_name(&self) -> Option<&str> {
        None
    }

    /// Overrides the store's default database.
    fn database_name(&self) -> Option<&str> {
        None
    }

    /// Overrides the store's configured connection URI.
    fn connection_uri(&self) -> Option<&str> {
        None
    }

    /// Returns this document's identity, or `None` when unset.
    fn id(&self) -> Option<ObjectId>;

    /// Sets this document's identity.
    fn set_id(&mut self, id: ObjectId);
}

/// Compile-time mapping from serialized field names to field values.
///
/// Usually generated with `#[derive(DocumentFields)]`, which honors serde's `rename`,
/// `rename_all` and `skip` attributes so lookups use the stored name rather than the Rust
/// field name.
pub trait FieldRegistry {
    /// The serialized names of every registered field, in declaration order.
    fn field_names() -> &'static [&'static str];

    /// Returns the current value of the field serialized as `name`.
    ///
    /// # Errors
    ///
    /// Returns an `UnknownField` error if no field carries that name, or a serialization
    /// error if the value cannot be represented as BSON.
    fn field_value(&self, name: &str) -> DocumentStoreResult<Bson>;
}

/// Converts a single field value to BSON. Used by the generated field registry.
pub fn field_to_bson<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Bson> {
    Ok(bson::ser::serialize_to_bson(value)?)
}

/// Returns `true` if `id` marks a document that has not been stored yet.
pub fn is_unset(id: Option<ObjectId>) -> bool {
    match id {
        None => true,
        Some(id) => id.bytes() == [0; 12],
    }
}

/// Extension trait providing BSON conversions for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Serializes this document, dropping an unset `_id` so the backend can assign one.
    fn to_document(&self) -> DocumentStoreResult<BsonDocument>;

    /// Decodes a stored record into this document type.
    fn from_document(document: BsonDocument) -> DocumentStoreResult<Self>;

    /// The identity, normalized so that an all-zero id reads as `None`.
    fn identity(&self) -> Option<ObjectId>;
}

impl<D: Document> DocumentExt for D {
    fn to_document(&self) -> DocumentStoreResult<BsonDocument> {
        let mut document = bson::ser::serialize_to_document(self)?;

        let unset = match document.get(ID_FIELD) {
            Some(Bson::Null) => true,
            Some(Bson::ObjectId(id)) => is_unset(Some(*id)),
            _ => false,
        };
        if unset {
            document.remove(ID_FIELD);
        }

        Ok(document)
    }

    fn from_document(document: BsonDocument) -> DocumentStoreResult<Self> {
        bson::de::deserialize_from_document(document).map_err(|e| {
            DocumentStoreError::decode(
                code::SERIALIZATION,
                format!("failed to decode record into {}", std::any::type_name::<D>()),
            )
            .with_source(e)
        })
    }

    fn identity(&self) -> Option<ObjectId> {
        self.id().filter(|id| !is_unset(Some(*id)))
    }
}
