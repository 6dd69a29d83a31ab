//! Optional LLM query rewriting.
//!
//! Rewriting normalizes informal queries (spelled-out language names,
//! canonical user-id phrasing, resolved dates) before retrieval. It trades
//! latency and cost for recall with no accuracy guarantee on the rewrite, so
//! it is an explicit configuration choice, off by default.

use crate::config::Prompts;
use crate::error::Result;
use crate::llm::CompletionModel;
use std::collections::HashMap;
use tracing::debug;

/// Rewrite a query via the language model.
pub async fn rewrite_query(
    llm: &dyn CompletionModel,
    prompts: &Prompts,
    query: &str,
) -> Result<String> {
    let mut vars = HashMap::new();
    vars.insert("query".to_string(), query.to_string());

    let prompt = prompts.render_with_custom(&prompts.rewrite.template, &vars);
    let rewritten = llm.complete(&prompt).await?;
    let rewritten = rewritten.trim().to_string();

    debug!(original = %query, rewritten = %rewritten, "query rewritten");
    Ok(rewritten)
}
