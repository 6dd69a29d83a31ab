//! Query-to-filtered-retrieval pipeline.
//!
//! Ties the filter extractor, predicate builder, embedder, and vector store
//! together: a free-text query comes in, similarity-ranked transcript chunks
//! constrained by any extracted metadata filters come out.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::filters::{predicate, FilterExtractor, QueryFilters, RegexFilterExtractor};
use crate::vector_store::{ScoredChunk, VectorStore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of results for interactive search.
pub const DEFAULT_K: usize = 5;

/// Retrieval orchestrator.
///
/// Holds shared collaborator handles; per-request state is local, so one
/// retriever serves concurrent requests.
pub struct Retriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn FilterExtractor>,
}

impl Retriever {
    /// Create a retriever with the default regex-based filter extractor.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            extractor: Arc::new(RegexFilterExtractor::new()),
        }
    }

    /// Swap in a different filter extraction strategy.
    pub fn with_extractor(mut self, extractor: Arc<dyn FilterExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extract structured filters from a query. Total; never fails.
    pub fn extract_filters(&self, query: &str) -> QueryFilters {
        self.extractor.extract(query)
    }

    /// Retrieve up to `k` chunks for a query, applying extracted filters.
    #[instrument(skip(self), fields(query = %query, k = k))]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let filters = self.extract_filters(query);
        self.retrieve_with_filters(query, &filters, k).await
    }

    /// Retrieve with pre-extracted filters.
    ///
    /// The query goes to the embedder as-is; normalization is an
    /// ingestion-time concern.
    pub async fn retrieve_with_filters(
        &self,
        query: &str,
        filters: &QueryFilters,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let predicate = predicate::build(filters);
        debug!(?filters, constrained = predicate.is_some(), "searching");

        let query_embedding = self.embedder.embed(query).await?;
        self.vector_store
            .search(&query_embedding, predicate.as_ref(), k)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{MemoryVectorStore, TranscriptChunk, VectorStore};
    use async_trait::async_trait;

    /// Embedder stub returning a constant vector.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn chunk(text: &str, user_id: &str, language: &str) -> TranscriptChunk {
        TranscriptChunk::new(
            text.to_string(),
            user_id.to_string(),
            language.to_string(),
            "2024-05-01".to_string(),
            "test.csv".to_string(),
            vec![1.0, 0.0],
        )
    }

    async fn retriever_with_data() -> Retriever {
        let store = MemoryVectorStore::new();
        store
            .index_batch(&[
                chunk("billing complaint", "user_204", "hi"),
                chunk("refund follow-up", "user_204", "ta"),
                chunk("network issue", "user_7", "hi"),
            ])
            .await
            .unwrap();
        Retriever::new(Arc::new(store), Arc::new(StubEmbedder))
    }

    #[tokio::test]
    async fn test_filtered_query_constrains_search() {
        let retriever = retriever_with_data().await;
        let results = retriever
            .retrieve("Show transcripts from user id 204 in Hindi", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "billing complaint");
    }

    #[tokio::test]
    async fn test_plain_query_is_unconstrained() {
        let retriever = retriever_with_data().await;
        let results = retriever
            .retrieve("What did the customer say about billing?", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_k_bounds_results() {
        let retriever = retriever_with_data().await;
        let results = retriever.retrieve("anything", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
