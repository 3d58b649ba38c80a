use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::IndexError;

/// A chunk ready for upsert: identity, payload, and its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub source: String,
    pub chunk_index: usize,
    pub char_offset: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A chunk with its similarity score, returned best-first.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: Uuid,
    pub source: String,
    pub content: String,
    pub score: f32,
}

/// Vector index abstraction: persisted chunk embeddings with
/// nearest-neighbor lookup.
pub trait VectorIndex: Send + Sync {
    /// Replace one document's chunk set atomically. All records must
    /// share a `document_id`; the document's previous rows are dropped
    /// in the same transaction, so a shrunken document leaves no stale
    /// chunks behind.
    fn upsert_chunks(&self, records: &[IndexedChunk]) -> Result<usize, IndexError>;

    /// Remove every chunk of one document; returns rows removed.
    fn delete_document(&self, document_id: &Uuid) -> Result<usize, IndexError>;

    /// Drop chunks of documents not in `keep`; returns rows removed.
    /// An empty `keep` clears the index.
    fn prune_documents(&self, keep: &[Uuid]) -> Result<usize, IndexError>;

    /// Top-K nearest neighbors by cosine similarity; ties resolve by
    /// index insertion order.
    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, IndexError>;

    fn chunk_count(&self) -> Result<usize, IndexError>;
}

/// SQLite-backed vector index. Embeddings are stored as little-endian
/// f32 blobs; similarity is computed in Rust at query time, which is
/// plenty for a reference corpus of a few thousand chunks.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chunks (
    chunk_id    TEXT PRIMARY KEY,
    document_id TEXT NOT NULL,
    source      TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    char_offset INTEGER NOT NULL,
    content     TEXT NOT NULL,
    embedding   BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS index_meta (
    key   TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
";

impl SqliteVectorIndex {
    /// Open (or create) the index at the given path.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Transient index for tests.
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn dimension(&self) -> Result<Option<usize>, IndexError> {
        let conn = self.lock()?;
        stored_dimension(&conn)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, IndexError> {
        self.conn
            .lock()
            .map_err(|_| IndexError::Store("index lock poisoned".into()))
    }
}

impl VectorIndex for SqliteVectorIndex {
    fn upsert_chunks(&self, records: &[IndexedChunk]) -> Result<usize, IndexError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let stored = stored_dimension(&conn)?;
        let expected = stored.unwrap_or(records[0].embedding.len());
        for record in records {
            if record.embedding.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: record.embedding.len(),
                });
            }
        }

        // One transaction per document: a failure leaves the index
        // without a half-written document. Previous rows go first so a
        // re-indexed document that produces fewer chunks sheds the rest.
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![records[0].document_id],
        )?;
        if stored.is_none() {
            tx.execute(
                "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('dimension', ?1)",
                params![expected as i64],
            )?;
        }
        for record in records {
            tx.execute(
                "INSERT OR REPLACE INTO chunks
                 (chunk_id, document_id, source, chunk_index, char_offset, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.chunk_id,
                    record.document_id,
                    record.source,
                    record.chunk_index as i64,
                    record.char_offset as i64,
                    record.content,
                    embedding_to_blob(&record.embedding),
                ],
            )?;
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn delete_document(&self, document_id: &Uuid) -> Result<usize, IndexError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM chunks WHERE document_id = ?1",
            params![document_id],
        )?;
        Ok(removed)
    }

    fn prune_documents(&self, keep: &[Uuid]) -> Result<usize, IndexError> {
        let conn = self.lock()?;
        if keep.is_empty() {
            let removed = conn.execute("DELETE FROM chunks", [])?;
            return Ok(removed);
        }

        let placeholders = vec!["?"; keep.len()].join(", ");
        let sql = format!("DELETE FROM chunks WHERE document_id NOT IN ({placeholders})");
        let removed = conn.execute(&sql, rusqlite::params_from_iter(keep.iter()))?;
        Ok(removed)
    }

    fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        let conn = self.lock()?;

        if let Some(expected) = stored_dimension(&conn)? {
            if embedding.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        let mut stmt = conn.prepare(
            "SELECT chunk_id, source, content, embedding FROM chunks ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Uuid>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })?;

        let mut scored: Vec<ScoredChunk> = Vec::new();
        for row in rows {
            let (chunk_id, source, content, blob) = row?;
            let stored = blob_to_embedding(&blob);
            scored.push(ScoredChunk {
                chunk_id,
                source,
                content,
                score: cosine_similarity(embedding, &stored),
            });
        }

        // Stable sort keeps insertion order for exact score ties.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    fn chunk_count(&self) -> Result<usize, IndexError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn stored_dimension(conn: &Connection) -> Result<Option<usize>, IndexError> {
    let dim: Option<i64> = conn
        .query_row(
            "SELECT value FROM index_meta WHERE key = 'dimension'",
            [],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    Ok(dim.map(|d| d as usize))
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u128, doc: u128, embedding: Vec<f32>, content: &str) -> IndexedChunk {
        IndexedChunk {
            chunk_id: Uuid::from_u128(id),
            document_id: Uuid::from_u128(doc),
            source: format!("doc-{doc}.txt"),
            chunk_index: 0,
            char_offset: 0,
            content: content.to_string(),
            embedding,
        }
    }

    #[test]
    fn cosine_similarity_identical_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.01);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.01);
    }

    #[test]
    fn query_orders_by_score() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[
                record(1, 1, vec![1.0, 0.0, 0.0], "exact match"),
                record(2, 1, vec![0.8, 0.6, 0.0], "near match"),
                record(3, 1, vec![0.0, 1.0, 0.0], "orthogonal"),
            ])
            .unwrap();

        let hits = index.query(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "exact match");
        assert_eq!(hits[1].content, "near match");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn exact_ties_keep_insertion_order() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[
                record(1, 1, vec![1.0, 0.0], "first inserted"),
                record(2, 1, vec![1.0, 0.0], "second inserted"),
            ])
            .unwrap();

        let hits = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].content, "first inserted");
        assert_eq!(hits[1].content, "second inserted");
    }

    #[test]
    fn upsert_same_ids_does_not_duplicate() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        let records = vec![
            record(1, 1, vec![1.0, 0.0], "a"),
            record(2, 1, vec![0.0, 1.0], "b"),
        ];

        index.upsert_chunks(&records).unwrap();
        index.upsert_chunks(&records).unwrap();

        assert_eq!(index.chunk_count().unwrap(), 2);
    }

    #[test]
    fn upsert_replaces_the_whole_chunk_set() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[
                record(1, 1, vec![1.0, 0.0], "old a"),
                record(2, 1, vec![0.0, 1.0], "old b"),
                record(3, 1, vec![0.5, 0.5], "old c"),
            ])
            .unwrap();

        // The shrunken document keeps only one chunk, under a new id.
        index
            .upsert_chunks(&[record(9, 1, vec![1.0, 0.0], "new only")])
            .unwrap();

        assert_eq!(index.chunk_count().unwrap(), 1);
        let hits = index.query(&[0.0, 1.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "new only");
    }

    #[test]
    fn delete_document_removes_only_that_document() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[record(1, 1, vec![1.0, 0.0], "doc one")])
            .unwrap();
        index
            .upsert_chunks(&[record(2, 2, vec![0.0, 1.0], "doc two")])
            .unwrap();

        let removed = index.delete_document(&Uuid::from_u128(1)).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(index.chunk_count().unwrap(), 1);
        let hits = index.query(&[0.0, 1.0], 10).unwrap();
        assert_eq!(hits[0].content, "doc two");
    }

    #[test]
    fn prune_keeps_only_listed_documents() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[record(1, 1, vec![1.0, 0.0], "keep")])
            .unwrap();
        index
            .upsert_chunks(&[record(2, 2, vec![0.0, 1.0], "drop")])
            .unwrap();

        let removed = index.prune_documents(&[Uuid::from_u128(1)]).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(index.chunk_count().unwrap(), 1);
        let hits = index.query(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits[0].content, "keep");
    }

    #[test]
    fn prune_with_empty_keep_clears_the_index() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[record(1, 1, vec![1.0, 0.0], "a")])
            .unwrap();

        assert_eq!(index.prune_documents(&[]).unwrap(), 1);
        assert_eq!(index.chunk_count().unwrap(), 0);
    }

    #[test]
    fn rejects_mixed_dimensions_on_upsert() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[record(1, 1, vec![1.0, 0.0, 0.0], "a")])
            .unwrap();

        let result = index.upsert_chunks(&[record(2, 2, vec![1.0, 0.0], "b")]);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn rejects_mismatched_query_dimension() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        index
            .upsert_chunks(&[record(1, 1, vec![1.0, 0.0, 0.0], "a")])
            .unwrap();

        assert!(matches!(
            index.query(&[1.0, 0.0], 4),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_upsert_is_noop() {
        let index = SqliteVectorIndex::open_in_memory().unwrap();
        assert_eq!(index.upsert_chunks(&[]).unwrap(), 0);
        assert_eq!(index.chunk_count().unwrap(), 0);
        assert!(index.dimension().unwrap().is_none());
    }

    #[test]
    fn index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.db");

        {
            let index = SqliteVectorIndex::open(&path).unwrap();
            index
                .upsert_chunks(&[record(1, 1, vec![1.0, 0.0], "persisted chunk")])
                .unwrap();
        }

        let reopened = SqliteVectorIndex::open(&path).unwrap();
        assert_eq!(reopened.chunk_count().unwrap(), 1);
        assert_eq!(reopened.dimension().unwrap(), Some(2));
        let hits = reopened.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].content, "persisted chunk");
    }

    #[test]
    fn embedding_blob_round_trip() {
        let embedding = vec![0.25f32, -1.5, 3.125];
        assert_eq!(blob_to_embedding(&embedding_to_blob(&embedding)), embedding);
    }
}
