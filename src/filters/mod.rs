//! Structured filter extraction from free-text queries.
//!
//! Queries like "Show transcripts from user id 204 in Hindi" carry
//! constraints the vector store can apply as a metadata predicate. The
//! extractor pulls those out with simple pattern rules; the matching
//! strategy lives behind the [`FilterExtractor`] trait so it can be swapped
//! without touching retrieval.

pub mod predicate;

pub use predicate::{FieldCondition, MetadataField, Predicate};

use crate::language::Language;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured constraints extracted from a query.
///
/// Absent fields mean "no constraint", never a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Canonical user identifier (`user_<N>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Short language code (e.g. "hi").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl QueryFilters {
    /// True when no constraints were extracted.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.language.is_none()
    }
}

/// Extracts structured filters from a free-text query.
///
/// Extraction is total: a query with no recognizable constraints yields an
/// empty filter set, never an error. Implementations favor precision over
/// recall, since a wrong filter silently excludes correct results while a
/// missed one merely widens the search.
pub trait FilterExtractor: Send + Sync {
    /// Extract filters from a query.
    fn extract(&self, query: &str) -> QueryFilters;
}

/// Rule-based extractor using regular expressions.
pub struct RegexFilterExtractor {
    user_id: Regex,
    language: Regex,
}

impl RegexFilterExtractor {
    /// Create the extractor with the built-in patterns.
    pub fn new() -> Self {
        Self {
            user_id: Regex::new(r"(?i)user\s*id[:\s]*([0-9]+)")
                .expect("user id pattern is valid"),
            language: Regex::new(r"(?i)\b(hindi|tamil|telugu|malayalam)\b")
                .expect("language pattern is valid"),
        }
    }
}

impl Default for RegexFilterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterExtractor for RegexFilterExtractor {
    fn extract(&self, query: &str) -> QueryFilters {
        let mut filters = QueryFilters::default();

        // First match wins when a pattern recurs.
        if let Some(caps) = self.user_id.captures(query) {
            filters.user_id = Some(format!("user_{}", &caps[1]));
        }

        if let Some(caps) = self.language.captures(query) {
            if let Some(lang) = Language::from_name(&caps[1]) {
                filters.language = Some(lang.code().to_string());
            }
        }

        filters
    }
}
