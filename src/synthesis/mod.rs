//! Answer synthesis over retrieved transcript context.
//!
//! Takes retrieval results, builds a deterministic context block with
//! per-chunk provenance, fills the fixed QA prompt, and delegates to the
//! language-model collaborator for the final answer.

pub mod context;
mod rewrite;

pub use context::{enrich_chunk, format_context};
pub use rewrite::rewrite_query;

use crate::config::Prompts;
use crate::error::Result;
use crate::filters::QueryFilters;
use crate::llm::CompletionModel;
use crate::retrieval::Retriever;
use crate::vector_store::ChunkMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Default context size for synthesis; larger than interactive search since
/// context quality matters more than latency here.
pub const DEFAULT_CONTEXT_CHUNKS: usize = 10;

/// A source chunk as returned to the caller: enriched presentation text
/// plus the stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Synthesis output with the full provenance trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub original_query: String,
    /// Equals `original_query` when rewriting is disabled, so the caller can
    /// always audit the rewrite.
    pub rewritten_query: String,
    pub filters_used: QueryFilters,
    pub answer: String,
    pub sources: Vec<SourceChunk>,
}

/// Answer synthesis engine.
pub struct AnswerEngine {
    retriever: Retriever,
    llm: Arc<dyn CompletionModel>,
    prompts: Prompts,
    max_context_chunks: usize,
    rewrite_queries: bool,
}

impl AnswerEngine {
    /// Create an engine with default context size and rewriting disabled.
    pub fn new(retriever: Retriever, llm: Arc<dyn CompletionModel>, prompts: Prompts) -> Self {
        Self {
            retriever,
            llm,
            prompts,
            max_context_chunks: DEFAULT_CONTEXT_CHUNKS,
            rewrite_queries: false,
        }
    }

    /// Set the number of chunks retrieved for context.
    pub fn with_max_context_chunks(mut self, max_context_chunks: usize) -> Self {
        self.max_context_chunks = max_context_chunks;
        self
    }

    /// Enable or disable the LLM query rewrite step.
    pub fn with_rewrite(mut self, rewrite_queries: bool) -> Self {
        self.rewrite_queries = rewrite_queries;
        self
    }

    /// Answer a question from indexed transcript context.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn ask(&self, query: &str) -> Result<AnswerResponse> {
        let rewritten_query = if self.rewrite_queries {
            rewrite_query(self.llm.as_ref(), &self.prompts, query).await?
        } else {
            query.to_string()
        };

        let filters = self.retriever.extract_filters(&rewritten_query);
        let chunks = self
            .retriever
            .retrieve_with_filters(&rewritten_query, &filters, self.max_context_chunks)
            .await?;

        info!(
            retrieved = chunks.len(),
            constrained = !filters.is_empty(),
            "building answer context"
        );

        let sources: Vec<SourceChunk> = chunks
            .iter()
            .map(|scored| SourceChunk {
                text: enrich_chunk(&scored.chunk),
                metadata: scored.chunk.metadata(),
            })
            .collect();

        let enriched: Vec<String> = sources.iter().map(|s| s.text.clone()).collect();
        let context_block = format_context(&enriched);

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_block);
        vars.insert("question".to_string(), rewritten_query.clone());
        let prompt = self.prompts.render_with_custom(&self.prompts.qa.template, &vars);

        // An empty context still goes to the model; the prompt contract makes
        // it answer "I don't know." rather than hallucinate.
        let answer = self.llm.complete(&prompt).await?;

        Ok(AnswerResponse {
            original_query: query.to_string(),
            rewritten_query,
            filters_used: filters,
            answer,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::error::SvarError;
    use crate::vector_store::{MemoryVectorStore, TranscriptChunk, VectorStore};
    use async_trait::async_trait;

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

    /// Deterministic stub enforcing the prompt contract: echoes the context
    /// line count, or answers the sentinel when the context slot is empty.
    struct StubModel;

    #[async_trait]
    impl CompletionModel for StubModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            let context = prompt
                .split("Context:")
                .nth(1)
                .and_then(|rest| rest.split("Question:").next())
                .map(str::trim)
                .unwrap_or("");
            if context.is_empty() {
                Ok("I don't know.".to_string())
            } else {
                Ok(format!("answered from {} context chars", context.len()))
            }
        }
    }

    struct FailingModel;

    #[async_trait]
    impl CompletionModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(SvarError::Synthesis("model unavailable".to_string()))
        }
    }

    async fn engine_with(
        chunks: Vec<TranscriptChunk>,
        llm: Arc<dyn CompletionModel>,
    ) -> AnswerEngine {
        let store = MemoryVectorStore::new();
        store.index_batch(&chunks).await.unwrap();
        let retriever = Retriever::new(Arc::new(store), Arc::new(StubEmbedder));
        AnswerEngine::new(retriever, llm, Prompts::default())
    }

    fn chunk(text: &str, user_id: &str, language: &str) -> TranscriptChunk {
        TranscriptChunk::new(
            text.to_string(),
            user_id.to_string(),
            language.to_string(),
            "2024-05-01".to_string(),
            "calls.csv".to_string(),
            vec![1.0, 0.0],
        )
    }

    #[tokio::test]
    async fn test_answer_carries_filters_and_sources() {
        let engine = engine_with(
            vec![
                chunk("overcharged on my plan", "user_204", "hi"),
                chunk("slow internet", "user_7", "ta"),
            ],
            Arc::new(StubModel),
        )
        .await;

        let response = engine.ask("what did user id 204 say in Hindi?").await.unwrap();
        assert_eq!(response.original_query, response.rewritten_query);
        assert_eq!(response.filters_used.user_id.as_deref(), Some("user_204"));
        assert_eq!(response.filters_used.language.as_deref(), Some("hi"));
        assert_eq!(response.sources.len(), 1);
        assert!(response.sources[0].text.starts_with("User ID: user_204"));
        assert!(response.answer.starts_with("answered from"));
    }

    #[tokio::test]
    async fn test_empty_retrieval_yields_dont_know() {
        let engine = engine_with(Vec::new(), Arc::new(StubModel)).await;
        let response = engine.ask("anything at all?").await.unwrap();
        assert_eq!(response.answer, "I don't know.");
        assert!(response.sources.is_empty());
        assert!(response.filters_used.is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_is_synthesis_failure() {
        let engine = engine_with(
            vec![chunk("text", "user_1", "hi")],
            Arc::new(FailingModel),
        )
        .await;
        let err = engine.ask("question").await.unwrap_err();
        assert!(!err.is_retrieval_failure());
    }
}
