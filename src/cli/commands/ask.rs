//! Ask command implementation.

use super::{build_embedder, open_vector_store};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OpenAICompletion;
use crate::retrieval::Retriever;
use crate::synthesis::AnswerEngine;
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    max_chunks: usize,
    rewrite: bool,
    settings: Settings,
) -> Result<()> {
    let vector_store = open_vector_store(&settings)?;
    let embedder = build_embedder(&settings);
    let retriever = Retriever::new(vector_store, embedder);

    let model = model.unwrap_or_else(|| settings.synthesis.model.clone());
    let llm = Arc::new(OpenAICompletion::new(
        &model,
        settings.synthesis.temperature,
        settings.synthesis.streaming,
    ));

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let engine = AnswerEngine::new(retriever, llm, prompts)
        .with_max_context_chunks(max_chunks)
        .with_rewrite(rewrite || settings.synthesis.rewrite_queries);

    let spinner = Output::spinner("Searching transcripts...");
    let result = engine.ask(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            if response.rewritten_query != response.original_query {
                Output::kv("Rewritten query", &response.rewritten_query);
            }

            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    println!("\n{}", source.text);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
