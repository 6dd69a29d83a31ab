//! Vector store abstraction for Svar.
//!
//! Provides a trait-based interface for vector database backends. Stores
//! apply metadata predicates natively alongside similarity ranking, so `k`
//! bounds the constrained result set.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use crate::filters::{MetadataField, Predicate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One indexed transcript record; the atomic unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Normalized transcript text.
    pub text: String,
    /// Opaque user identifier in canonical `user_<N>` form.
    pub user_id: String,
    /// Short language code (e.g. "hi").
    pub language: String,
    /// Caller-supplied timestamp string, stored verbatim.
    pub timestamp: String,
    /// Originating file or record, informational only.
    pub source: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl TranscriptChunk {
    /// Create a new chunk ready for indexing.
    pub fn new(
        text: String,
        user_id: String,
        language: String,
        timestamp: String,
        source: String,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            user_id,
            language,
            timestamp,
            source,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Metadata view of this chunk, as exposed in search responses.
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            user_id: self.user_id.clone(),
            language: self.language.clone(),
            timestamp: self.timestamp.clone(),
            source: self.source.clone(),
        }
    }

    /// Value of a filterable metadata field.
    pub fn field_value(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::UserId => &self.user_id,
            MetadataField::Language => &self.language,
        }
    }
}

/// Chunk metadata as serialized in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub user_id: String,
    pub language: String,
    pub timestamp: String,
    pub source: String,
}

/// A search result with similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: TranscriptChunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index a batch of chunks, returning their IDs.
    async fn index_batch(&self, chunks: &[TranscriptChunk]) -> Result<Vec<Uuid>>;

    /// Similarity search constrained by an optional metadata predicate.
    ///
    /// `None` means unconstrained. Results come back in the store's native
    /// similarity order, at most `k` of them; an empty result is not an
    /// error.
    async fn search(
        &self,
        query_embedding: &[f32],
        predicate: Option<&Predicate>,
        k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Total number of indexed chunks.
    async fn count(&self) -> Result<usize>;
}

/// Evaluate a predicate against a chunk's metadata.
pub(crate) fn predicate_matches(chunk: &TranscriptChunk, predicate: &Predicate) -> bool {
    predicate
        .must
        .iter()
        .all(|cond| chunk.field_value(cond.field) == cond.value)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FieldCondition;

    fn chunk(user_id: &str, language: &str) -> TranscriptChunk {
        TranscriptChunk::new(
            "content".to_string(),
            user_id.to_string(),
            language.to_string(),
            "2024-05-01 10:00".to_string(),
            "test.csv".to_string(),
            vec![1.0, 0.0],
        )
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_predicate_matches_all_conditions() {
        let predicate = Predicate {
            must: vec![
                FieldCondition {
                    field: MetadataField::UserId,
                    value: "user_204".to_string(),
                },
                FieldCondition {
                    field: MetadataField::Language,
                    value: "hi".to_string(),
                },
            ],
        };

        assert!(predicate_matches(&chunk("user_204", "hi"), &predicate));
        assert!(!predicate_matches(&chunk("user_204", "ta"), &predicate));
        assert!(!predicate_matches(&chunk("user_7", "hi"), &predicate));
    }
}
