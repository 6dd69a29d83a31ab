//! CLI module for Svar.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Transcript Search and Q&A
///
/// A local-first tool for indexing multilingual call transcripts and asking
/// questions over them. The name "Svar" comes from the Norwegian word for
/// "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest transcript files (CSV/JSON) from a directory into the index
    Ingest {
        /// Directory or file to ingest
        path: String,
    },

    /// Search for relevant transcript chunks
    Search {
        /// Search query (filters like "user id 204" or a language name are
        /// extracted automatically)
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value = "5")]
        limit: usize,
    },

    /// Ask a question and get an answer grounded in indexed transcripts
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum number of context chunks to include
        #[arg(short = 'c', long, default_value = "10")]
        max_chunks: usize,

        /// Rewrite the query with the LLM before retrieval
        #[arg(long)]
        rewrite: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
