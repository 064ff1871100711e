//! Translation from docstore filters and documents to MongoDB command documents.

use bson::{Bson, Document, doc};

use docstore_core::{backend::split_id, filter::Filter};

/// Translates [`Filter`] constraints into MongoDB `$eq` predicates.
///
/// Explicit `$eq` keeps array and document values from being read as element or
/// sub-document matches.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    pub(crate) fn filter(filter: &Filter) -> Document {
        filter
            .iter()
            .map(|(field, value)| (field.clone(), Bson::Document(doc! { "$eq": value.clone() })))
            .collect()
    }

    /// The update applied to the first match. `None` when `document` has nothing but `_id`.
    pub(crate) fn set(document: Document) -> Option<Document> {
        let (_, fields) = split_id(document);

        (!fields.is_empty()).then(|| doc! { "$set": fields })
    }

    /// The upsert update: non-`_id` fields are set, `_id` is only written on insert.
    pub(crate) fn upsert(document: Document) -> Document {
        let (id, fields) = split_id(document);

        let mut update = Document::new();
        if !fields.is_empty() {
            update.insert("$set", fields);
        }
        if let Some(id) = id {
            update.insert("$setOnInsert", doc! { "_id": id });
        }

        update
    }
}
