//! Svar - Transcript Search and Q&A
//!
//! A local-first service for indexing multilingual call transcripts and
//! answering questions over them with retrieval-augmented generation.
//!
//! The name "Svar" comes from the Norwegian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Ingest call transcripts from CSV/JSON exports into a vector index
//! - Search transcripts semantically, with structured filters (user id,
//!   language) extracted straight from the query text
//! - Ask questions and get AI-generated answers grounded in retrieved
//!   transcript chunks, with a full provenance trail
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `normalize` - Transcript text normalization
//! - `language` - Language code registry
//! - `filters` - Filter extraction and metadata predicates
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `llm` - Language model collaborator
//! - `retrieval` - Query-to-filtered-retrieval pipeline
//! - `synthesis` - Answer synthesis with provenance
//! - `ingestion` - Bulk transcript loading
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svar::config::Settings;
//! use svar::embedding::OpenAIEmbedder;
//! use svar::retrieval::Retriever;
//! use svar::vector_store::SqliteVectorStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
//!     let embedder = Arc::new(OpenAIEmbedder::with_config(
//!         &settings.embedding.model,
//!         settings.embedding.dimensions as usize,
//!     ));
//!
//!     let retriever = Retriever::new(store, embedder);
//!     let results = retriever.retrieve("billing complaints in Hindi", 5).await?;
//!     println!("Found {} chunks", results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod filters;
pub mod ingestion;
pub mod language;
pub mod llm;
pub mod normalize;
pub mod openai;
pub mod retrieval;
pub mod synthesis;
pub mod vector_store;

pub use error::{Result, SvarError};
