//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, predicate_matches, ScoredChunk, TranscriptChunk, VectorStore};
use crate::error::Result;
use crate::filters::Predicate;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory vector store.
pub struct MemoryVectorStore {
    chunks: RwLock<HashMap<Uuid, TranscriptChunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn index_batch(&self, chunks: &[TranscriptChunk]) -> Result<Vec<Uuid>> {
        let mut store = self.chunks.write().unwrap();
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            store.insert(chunk.id, chunk.clone());
            ids.push(chunk.id);
        }
        Ok(ids)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        predicate: Option<&Predicate>,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().unwrap();

        let mut results: Vec<ScoredChunk> = chunks
            .values()
            .filter(|chunk| match predicate {
                Some(p) => predicate_matches(chunk, p),
                None => true,
            })
            .map(|chunk| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().unwrap().len())
    }
}
