//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Metadata predicates compile to a WHERE clause so `k` bounds the
//! constrained result set. For large datasets consider the sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_similarity, ScoredChunk, TranscriptChunk, VectorStore};
use crate::error::{Result, SvarError};
use crate::filters::{MetadataField, Predicate};
use chrono::{DateTime, Utc};
use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    user_id TEXT NOT NULL,
    language TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    source TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_user_id ON chunks(user_id);
CREATE INDEX IF NOT EXISTS idx_chunks_language ON chunks(language);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn column_for(field: MetadataField) -> &'static str {
        match field {
            MetadataField::UserId => "user_id",
            MetadataField::Language => "language",
        }
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn index_batch(&self, chunks: &[TranscriptChunk]) -> Result<Vec<Uuid>> {
        let mut conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                    (id, text, user_id, language, timestamp, source, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                rusqlite::params![
                    chunk.id.to_string(),
                    chunk.text,
                    chunk.user_id,
                    chunk.language,
                    chunk.timestamp,
                    chunk.source,
                    Self::embedding_to_bytes(&chunk.embedding),
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
            ids.push(chunk.id);
        }
        tx.commit()?;

        Ok(ids)
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        predicate: Option<&Predicate>,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut sql = String::from(
            "SELECT id, text, user_id, language, timestamp, source, embedding, indexed_at FROM chunks",
        );
        let mut values: Vec<String> = Vec::new();
        if let Some(predicate) = predicate {
            let clauses: Vec<String> = predicate
                .must
                .iter()
                .enumerate()
                .map(|(i, cond)| {
                    values.push(cond.value.clone());
                    format!("{} = ?{}", Self::column_for(cond.field), i + 1)
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            let id: String = row.get(0)?;
            let embedding: Vec<u8> = row.get(6)?;
            let indexed_at: String = row.get(7)?;
            Ok(TranscriptChunk {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                text: row.get(1)?,
                user_id: row.get(2)?,
                language: row.get(3)?,
                timestamp: row.get(4)?,
                source: row.get(5)?,
                embedding: Self::bytes_to_embedding(&embedding),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut results: Vec<ScoredChunk> = Vec::new();
        for row in rows {
            let chunk = row?;
            let score = cosine_similarity(query_embedding, &chunk.embedding);
            results.push(ScoredChunk { chunk, score });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            SvarError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{predicate::build, QueryFilters};

    fn chunk(text: &str, user_id: &str, language: &str, embedding: Vec<f32>) -> TranscriptChunk {
        TranscriptChunk::new(
            text.to_string(),
            user_id.to_string(),
            language.to_string(),
            "2024-03-10 14:00".to_string(),
            "calls.csv".to_string(),
            embedding,
        )
    }

    #[tokio::test]
    async fn test_index_and_search_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let ids = store
            .index_batch(&[
                chunk("payment failed twice", "user_204", "hi", vec![1.0, 0.0]),
                chunk("tower signal weak", "user_7", "te", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0], None, 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "payment failed twice");
        assert_eq!(results[0].chunk.timestamp, "2024-03-10 14:00");
    }

    #[tokio::test]
    async fn test_predicate_compiles_to_where_clause() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .index_batch(&[
                chunk("a", "user_204", "hi", vec![1.0, 0.0]),
                chunk("b", "user_204", "ta", vec![1.0, 0.0]),
                chunk("c", "user_7", "hi", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let filters = QueryFilters {
            user_id: Some("user_204".to_string()),
            language: Some("hi".to_string()),
        };
        let predicate = build(&filters).unwrap();
        let results = store.search(&[1.0, 0.0], Some(&predicate), 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "a");
    }

    #[tokio::test]
    async fn test_k_truncates() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let chunks: Vec<TranscriptChunk> = (0..8)
            .map(|i| chunk(&format!("c{}", i), "user_1", "hi", vec![1.0, i as f32 * 0.1]))
            .collect();
        store.index_batch(&chunks).await.unwrap();

        let results = store.search(&[1.0, 0.0], None, 5).await.unwrap();
        assert_eq!(results.len(), 5);
    }
}
