//! Flat equality filters.
//!
//! A [`Filter`] is an ordered set of `field == value` constraints. Setting the same field
//! twice keeps the field's original position and replaces its value, so the last write wins.

use bson::{Bson, Document as BsonDocument, oid::ObjectId};

use crate::{
    document::{FieldRegistry, ID_FIELD},
    error::{DocumentStoreError, DocumentStoreResult, code},
};

/// Field-equality constraints narrowing which stored documents an operation targets.
///
/// # Example
///
/// ```ignore
/// use docstore::filter::Filter;
///
/// let filter = Filter::new()
///     .eq("firstName", "John")
///     .eq("lastName", "Doe");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    constraints: BsonDocument,
}

impl Filter {
    /// Creates an empty filter, which matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the document with the given identity.
    pub fn by_id(id: ObjectId) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Adds (or replaces) an equality constraint.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.constraints.insert(field.into(), value.into());
        self
    }

    /// Builds a filter from alternating field names and values.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `args` has an odd length or if any key is not a string.
    pub fn from_pairs(args: &[Bson]) -> DocumentStoreResult<Self> {
        if args.len() % 2 != 0 {
            return Err(DocumentStoreError::validation(
                code::QUERY,
                format!("expected alternating field names and values, got {} arguments", args.len()),
            ));
        }

        args.chunks_exact(2)
            .enumerate()
            .try_fold(Self::new(), |filter, (position, pair)| match &pair[0] {
                Bson::String(key) => Ok(filter.eq(key.as_str(), pair[1].clone())),
                other => Err(DocumentStoreError::validation(
                    code::QUERY,
                    format!("key at argument {} must be a string, got {:?}", position * 2, other.element_type()),
                )),
            })
    }

    /// Builds a filter from the current values of the named fields of `document`.
    ///
    /// # Errors
    ///
    /// Returns an `UnknownField` error if a name is not registered on the document type.
    pub fn from_fields<D: FieldRegistry>(document: &D, fields: &[&str]) -> DocumentStoreResult<Self> {
        fields
            .iter()
            .try_fold(Self::new(), |filter, field| {
                Ok(filter.eq(*field, document.field_value(field)?))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.constraints.get(field)
    }

    /// Iterates over the constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bson)> {
        self.constraints.iter()
    }

    /// Returns `true` if every constraint holds for `document` under `eq`.
    pub fn matches_with<F>(&self, document: &BsonDocument, mut eq: F) -> bool
    where
        F: FnMut(&Bson, &Bson) -> bool,
    {
        self.constraints.iter().all(|(field, expected)| {
            document
                .get(field)
                .map_or(matches!(expected, Bson::Null), |actual| eq(actual, expected))
        })
    }
}

impl From<BsonDocument> for Filter {
    fn from(constraints: BsonDocument) -> Self {
        Self { constraints }
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn later_pairs_overwrite_earlier_ones_in_place() {
        let filter = Filter::from_pairs(&[
            "firstName".into(),
            "John".into(),
            "lastName".into(),
            "Doe".into(),
            "firstName".into(),
            "Jane".into(),
        ])
        .unwrap();

        let fields: Vec<_> = filter.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            fields,
            vec![
                ("firstName".to_string(), Bson::from("Jane")),
                ("lastName".to_string(), Bson::from("Doe")),
            ]
        );
    }

    #[test]
    fn odd_argument_count_is_rejected() {
        let err = Filter::from_pairs(&["firstName".into()]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn non_string_key_is_rejected() {
        let err = Filter::from_pairs(&[Bson::Int32(1), "John".into()]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn empty_pairs_build_an_empty_filter() {
        assert!(Filter::from_pairs(&[]).unwrap().is_empty());
    }

    #[test]
    fn missing_field_only_matches_null() {
        let document = doc! { "name": "a" };

        assert!(Filter::new().eq("age", Bson::Null).matches_with(&document, |a, b| a == b));
        assert!(!Filter::new().eq("age", 3).matches_with(&document, |a, b| a == b));
        assert!(Filter::new().matches_with(&document, |a, b| a == b));
    }
}
