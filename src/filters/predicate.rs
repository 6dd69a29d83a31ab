//! Metadata predicates for constrained similarity search.
//!
//! A predicate is a conjunction of equality conditions over the store's
//! namespaced metadata keys. Keys are a closed enum so a mismatch between
//! what ingestion writes and what retrieval filters on cannot compile.

use super::QueryFilters;
use serde::Serialize;

/// A metadata field the store can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    UserId,
    Language,
}

impl MetadataField {
    /// Namespaced key understood by the vector store.
    pub fn key(&self) -> &'static str {
        match self {
            MetadataField::UserId => "metadata.user_id",
            MetadataField::Language => "metadata.language",
        }
    }
}

/// A single equality condition over a metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCondition {
    pub field: MetadataField,
    pub value: String,
}

/// A conjunction of conditions; a match must satisfy all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub must: Vec<FieldCondition>,
}

/// Build a predicate from extracted filters.
///
/// Returns `None` when no filters are present. An unconstrained search must
/// be expressed as an absent predicate, not an empty conjunction, which some
/// stores would treat as "match nothing".
pub fn build(filters: &QueryFilters) -> Option<Predicate> {
    let mut must = Vec::new();

    if let Some(user_id) = &filters.user_id {
        must.push(FieldCondition {
            field: MetadataField::UserId,
            value: user_id.clone(),
        });
    }
    if let Some(language) = &filters.language {
        must.push(FieldCondition {
            field: MetadataField::Language,
            value: language.clone(),
        });
    }

    if must.is_empty() {
        None
    } else {
        Some(Predicate { must })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_build_no_predicate() {
        assert_eq!(build(&QueryFilters::default()), None);
    }

    #[test]
    fn test_single_filter_builds_one_condition() {
        let filters = QueryFilters {
            user_id: Some("user_204".to_string()),
            language: None,
        };
        let predicate = build(&filters).unwrap();
        assert_eq!(predicate.must.len(), 1);
        assert_eq!(predicate.must[0].field.key(), "metadata.user_id");
        assert_eq!(predicate.must[0].value, "user_204");
    }

    #[test]
    fn test_both_filters_build_two_conditions() {
        let filters = QueryFilters {
            user_id: Some("user_204".to_string()),
            language: Some("hi".to_string()),
        };
        let predicate = build(&filters).unwrap();
        assert_eq!(predicate.must.len(), 2);
        assert_eq!(predicate.must[1].field.key(), "metadata.language");
        assert_eq!(predicate.must[1].value, "hi");
    }
}
