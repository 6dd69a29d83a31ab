//! Search command implementation.

use super::{build_embedder, open_vector_store};
use crate::cli::Output;
use crate::config::Settings;
use crate::retrieval::Retriever;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    let vector_store = open_vector_store(&settings)?;
    let embedder = build_embedder(&settings);
    let retriever = Retriever::new(vector_store, embedder);

    let filters = retriever.extract_filters(query);
    if !filters.is_empty() {
        if let Some(user_id) = &filters.user_id {
            Output::kv("User filter", user_id);
        }
        if let Some(language) = &filters.language {
            Output::kv("Language filter", language);
        }
    }

    let spinner = Output::spinner("Searching...");
    let results = retriever
        .retrieve_with_filters(query, &filters, limit)
        .await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));
                for scored in &chunks {
                    Output::search_result(
                        &scored.chunk.user_id,
                        &scored.chunk.language,
                        &scored.chunk.timestamp,
                        scored.score,
                        &scored.chunk.text,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
