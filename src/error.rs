//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Answer synthesis failed: {0}")]
    Synthesis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SvarError {
    /// True when the failure happened on the vector-store side rather than
    /// the language-model side. The HTTP layer uses this to report retrieval
    /// and synthesis failures distinctly.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            SvarError::VectorStore(_)
                | SvarError::Database(_)
                | SvarError::Retrieval(_)
                | SvarError::Embedding(_)
        )
    }
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;
