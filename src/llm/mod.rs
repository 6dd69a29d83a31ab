//! Language model collaborator for answer synthesis.
//!
//! Only the call contract matters here: a filled prompt goes in, completed
//! text comes out. The handle is constructed once and shared across requests.

mod openai;

pub use openai::OpenAICompletion;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion models.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete a prompt, returning the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
