use std::io;
use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "Remedia";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info"
}

/// Get the application data directory
/// ~/Remedia/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Remedia")
}

/// Get the knowledge corpus directory (source documents to index)
pub fn corpus_dir() -> PathBuf {
    app_data_dir().join("knowledge_base")
}

/// Get the vector index directory
pub fn index_dir() -> PathBuf {
    app_data_dir().join("vector_index")
}

/// Tunables for one service instance: where the corpus and index live,
/// how documents are chunked, and how many neighbors retrieval returns.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub corpus_dir: PathBuf,
    pub index_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl ServiceConfig {
    /// Configuration rooted at an arbitrary directory (used by tests).
    pub fn with_root(root: &Path) -> Self {
        Self {
            corpus_dir: root.join("knowledge_base"),
            index_path: root.join("vector_index").join("chunks.db"),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 6,
        }
    }

    /// Create the corpus and index directories if they do not exist.
    pub fn bootstrap(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.corpus_dir)?;
        if let Some(parent) = self.index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            corpus_dir: corpus_dir(),
            index_path: index_dir().join("chunks.db"),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 6,
        }
    }
}
