pub mod chunker;
pub mod indexer;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corpus directory not found: {0}")]
    CorpusDirMissing(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("vector index error: {0}")]
    Store(String),

    #[error("embedding generation failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
