//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts, RewritePrompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, PromptSettings, RetrievalSettings, ServerSettings,
    Settings, SynthesisSettings, VectorStoreSettings,
};
