//! Bulk transcript ingestion.
//!
//! Walks a directory of CSV/JSON transcript exports, normalizes the text,
//! embeds it in batches, and indexes the chunks with full metadata. Records
//! missing required fields are skipped and counted, never fatal; the caller
//! gets an [`IngestReport`] so completeness is programmatically verifiable
//! instead of buried in logs.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::normalize::normalize;
use crate::vector_store::{TranscriptChunk, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Required CSV columns, in the export format's naming.
const CSV_REQUIRED: [&str; 4] = ["transcript", "user_id", "language", "timestamp"];
/// Required JSON keys.
const JSON_REQUIRED: [&str; 4] = ["text", "user_id", "language", "timestamp"];

/// A raw transcript record before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub text: String,
    pub user_id: String,
    pub language: String,
    pub timestamp: String,
    pub source: String,
}

/// A file that could not be read or parsed at all.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Chunks embedded and indexed.
    pub indexed: usize,
    /// Records dropped for missing required fields.
    pub skipped: usize,
    /// Files that failed outright (unreadable, malformed).
    pub failures: Vec<FileFailure>,
}

/// Bulk transcript ingestor.
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl Ingestor {
    /// Create an ingestor over shared collaborator handles.
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            vector_store,
        }
    }

    /// Ingest every CSV/JSON file under `path`, recursively.
    #[instrument(skip(self))]
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let records = load_records_from_path(path, &mut report)?;

        if records.is_empty() {
            info!("No ingestable records found under {:?}", path);
            return Ok(report);
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let chunks: Vec<TranscriptChunk> = records
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| {
                TranscriptChunk::new(
                    record.text,
                    record.user_id,
                    record.language,
                    record.timestamp,
                    record.source,
                    embedding,
                )
            })
            .collect();

        let ids = self.vector_store.index_batch(&chunks).await?;
        report.indexed = ids.len();

        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            failed_files = report.failures.len(),
            "ingestion complete"
        );
        Ok(report)
    }
}

/// Collect valid records from all CSV/JSON files under `path`.
///
/// Per-record problems increment `report.skipped`; per-file problems are
/// appended to `report.failures`. Only IO errors on the directory walk
/// itself propagate.
pub fn load_records_from_path(path: &Path, report: &mut IngestReport) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    walk(path, report, &mut records)?;
    Ok(records)
}

fn walk(path: &Path, report: &mut IngestReport, records: &mut Vec<RawRecord>) -> Result<()> {
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            walk(&entry?.path(), report, records)?;
        }
        return Ok(());
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => {
            if let Err(e) = load_csv(path, report, records) {
                warn!("Failed to load {:?}: {}", path, e);
                report.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
        Some("json") => {
            if let Err(e) = load_json(path, report, records) {
                warn!("Failed to load {:?}: {}", path, e);
                report.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

fn load_csv(path: &Path, report: &mut IngestReport, records: &mut Vec<RawRecord>) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);
    let columns: Vec<Option<usize>> = CSV_REQUIRED.iter().map(|c| index_of(c)).collect();

    for row in reader.records() {
        let row = row?;
        let fields: Option<Vec<&str>> = columns
            .iter()
            .map(|idx| {
                idx.and_then(|i| row.get(i))
                    .filter(|v| !v.trim().is_empty())
            })
            .collect();

        match fields {
            Some(fields) => records.push(RawRecord {
                text: normalize(fields[0]),
                user_id: fields[1].to_string(),
                language: fields[2].to_string(),
                timestamp: fields[3].to_string(),
                source: path.display().to_string(),
            }),
            None => {
                debug!("Skipping CSV record with missing fields in {:?}", path);
                report.skipped += 1;
            }
        }
    }
    Ok(())
}

fn load_json(path: &Path, report: &mut IngestReport, records: &mut Vec<RawRecord>) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    let data: serde_json::Value = serde_json::from_str(&content)?;

    let entries: Vec<&serde_json::Value> = match &data {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(_) => vec![&data],
        _ => Vec::new(),
    };

    for entry in entries {
        let fields: Option<Vec<&str>> = JSON_REQUIRED
            .iter()
            .map(|key| {
                entry
                    .get(key)
                    .and_then(|v| v.as_str())
                    .filter(|v| !v.trim().is_empty())
            })
            .collect();

        match fields {
            Some(fields) => records.push(RawRecord {
                text: normalize(fields[0]),
                user_id: fields[1].to_string(),
                language: fields[2].to_string(),
                timestamp: fields[3].to_string(),
                source: path.display().to_string(),
            }),
            None => {
                debug!("Skipping JSON record with missing fields in {:?}", path);
                report.skipped += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::io::Write;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_csv_records_loaded_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "calls.csv",
            "transcript,user_id,language,timestamp\n\
             \"  payment   failed \",user_204,hi,2024-05-01 10:00\n\
             ,user_7,ta,2024-05-02 09:00\n",
        );

        let mut report = IngestReport::default();
        let records = load_records_from_path(dir.path(), &mut report).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "payment failed");
        assert_eq!(records[0].user_id, "user_204");
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_json_object_and_array_forms() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "single.json",
            r#"{"text": "hello", "user_id": "user_1", "language": "ta", "timestamp": "2024-01-01"}"#,
        );
        write_file(
            dir.path(),
            "many.json",
            r#"[
                {"text": "a", "user_id": "user_2", "language": "te", "timestamp": "2024-01-02"},
                {"text": "b", "user_id": "user_3", "language": "ml"}
            ]"#,
        );

        let mut report = IngestReport::default();
        let mut records = load_records_from_path(dir.path(), &mut report).unwrap();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user_id, "user_1");
        assert_eq!(records[1].user_id, "user_2");
        // the entry missing its timestamp is skipped
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_malformed_file_is_named_failure_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "broken.json", "{not json");
        write_file(
            dir.path(),
            "good.json",
            r#"{"text": "x", "user_id": "user_9", "language": "hi", "timestamp": "t"}"#,
        );

        let mut report = IngestReport::default();
        let records = load_records_from_path(dir.path(), &mut report).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("broken.json"));
    }

    #[tokio::test]
    async fn test_ingest_indexes_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "calls.csv",
            "transcript,user_id,language,timestamp\n\
             one,user_1,hi,2024-01-01\n\
             two,user_2,ta,2024-01-02\n",
        );

        let store = Arc::new(MemoryVectorStore::new());
        let ingestor = Ingestor::new(Arc::new(StubEmbedder), store.clone());
        let report = ingestor.ingest_path(dir.path()).await.unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
