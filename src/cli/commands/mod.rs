//! CLI command implementations.

mod ask;
mod config;
mod ingest;
mod search;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use ingest::run_ingest;
pub use search::run_search;
pub use serve::run_serve;

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;

/// Open the configured vector store.
pub(crate) fn open_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(SvarError::Config(format!(
            "Unknown vector store provider: {}",
            other
        ))),
    }
}

/// Build the configured embedder.
pub(crate) fn build_embedder(settings: &Settings) -> Arc<dyn Embedder> {
    Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ))
}
