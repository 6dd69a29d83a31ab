//! Ingest command implementation.

use super::{build_embedder, open_vector_store};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingestion::Ingestor;
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(path: &str, settings: Settings) -> Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        Output::error(&format!("Path does not exist: {}", path.display()));
        anyhow::bail!("path not found");
    }

    let vector_store = open_vector_store(&settings)?;
    let embedder = build_embedder(&settings);
    let ingestor = Ingestor::new(embedder, vector_store);

    let spinner = Output::spinner("Ingesting transcripts...");
    let result = ingestor.ingest_path(path).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!("Indexed {} chunks", report.indexed));
            if report.skipped > 0 {
                Output::warning(&format!(
                    "Skipped {} records with missing required fields",
                    report.skipped
                ));
            }
            if !report.failures.is_empty() {
                Output::header("Failed files");
                for failure in &report.failures {
                    Output::kv(&failure.path.display().to_string(), &failure.reason);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            Err(e.into())
        }
    }
}
