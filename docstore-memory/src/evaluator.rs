//! Equality evaluation for in-memory document filtering.
//!
//! Stored values are compared the way MongoDB compares them for equality: numbers compare by
//! value across Int32, Int64 and Double, embedded documents compare field by field in stored
//! order, and everything else compares by type and value.

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use docstore_core::filter::Filter;

/// Type-erased, comparable representation of BSON values.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    /// All integers and floats normalized to f64
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Array(Vec<Comparable<'a>>),
    /// Embedded document fields in stored order
    Map(Vec<(&'a str, Comparable<'a>)>),
    /// Values without a normalized form compare structurally
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<Vec<_>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

/// Returns `true` if two stored values are equal under MongoDB equality.
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    Comparable::from(left) == Comparable::from(right)
}

/// Returns `true` if `document` satisfies every constraint of `filter`.
pub(crate) fn matches(document: &Document, filter: &Filter) -> bool {
    filter.matches_with(document, values_equal)
}

/// The value a unique index sees for `field`: missing fields index as null.
pub(crate) fn index_key<'a>(document: &'a Document, field: &str) -> &'a Bson {
    const NULL: &Bson = &Bson::Null;
    document.get(field).unwrap_or(NULL)
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn numbers_compare_across_types() {
        assert!(values_equal(&Bson::Int32(3), &Bson::Int64(3)));
        assert!(values_equal(&Bson::Int64(3), &Bson::Double(3.0)));
        assert!(!values_equal(&Bson::Int32(3), &Bson::String("3".into())));
    }

    #[test]
    fn embedded_documents_compare_in_field_order() {
        let stored = Bson::Document(doc! { "city": "Oslo", "zip": 150 });

        assert!(values_equal(&stored, &Bson::Document(doc! { "city": "Oslo", "zip": 150.0 })));
        assert!(!values_equal(&stored, &Bson::Document(doc! { "zip": 150, "city": "Oslo" })));
        assert!(!values_equal(&stored, &Bson::Document(doc! { "city": "Oslo" })));
    }

    #[test]
    fn filter_matches_all_constraints() {
        let document = doc! { "firstName": "John", "lastName": "Doe", "age": 42 };

        assert!(matches(&document, &Filter::new().eq("firstName", "John").eq("age", 42i64)));
        assert!(!matches(&document, &Filter::new().eq("firstName", "John").eq("lastName", "Roe")));
    }

    #[test]
    fn missing_field_indexes_as_null() {
        let document = doc! { "firstName": "John" };

        assert_eq!(index_key(&document, "email"), &Bson::Null);
    }
}
