use std::path::Path;

use uuid::Uuid;

use super::chunker::OverlapChunker;
use super::store::{IndexedChunk, VectorIndex};
use super::IndexError;
use crate::embedding::EmbeddingProvider;

/// Corpus file extensions the indexer consumes. Anything else in the
/// directory (PDF originals, notes, indexes) is an upstream extractor's
/// concern and is ignored here.
const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Summary of one indexing pass.
#[derive(Debug, Clone, Default)]
pub struct IndexedCorpus {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: usize,
    /// Stale chunks removed because their document left the corpus.
    pub pruned: usize,
}

impl IndexedCorpus {
    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

/// Orchestrates the indexing pass: scan → chunk → embed → upsert.
pub struct CorpusIndexer<'a> {
    chunker: OverlapChunker,
    embedder: &'a dyn EmbeddingProvider,
    index: &'a dyn VectorIndex,
}

impl<'a> CorpusIndexer<'a> {
    pub fn new(
        chunker: OverlapChunker,
        embedder: &'a dyn EmbeddingProvider,
        index: &'a dyn VectorIndex,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
        }
    }

    /// Index every supported document directly under `corpus_dir`
    /// (non-recursive), then prune chunks of documents no longer present.
    ///
    /// Unreadable files are skipped with a warning; an embedding-provider
    /// failure aborts the whole pass. Each document is upserted in one
    /// transaction, keyed by ids derived from (source name, chunk offset),
    /// so re-indexing the same corpus is idempotent, and a document that
    /// shrank or disappeared sheds its stale chunks.
    pub fn index_corpus(&self, corpus_dir: &Path) -> Result<IndexedCorpus, IndexError> {
        if !corpus_dir.is_dir() {
            return Err(IndexError::CorpusDirMissing(corpus_dir.to_path_buf()));
        }

        let mut paths: Vec<_> = std::fs::read_dir(corpus_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
                    .unwrap_or(false)
            })
            .collect();
        // Deterministic insertion order across runs and platforms.
        paths.sort();

        let mut summary = IndexedCorpus::default();
        let mut present: Vec<Uuid> = Vec::with_capacity(paths.len());

        for path in &paths {
            let source = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
                .to_string();
            // Skipped files keep their previous chunks; only documents
            // gone from the directory are pruned below.
            present.push(Uuid::new_v5(&Uuid::NAMESPACE_OID, source.as_bytes()));

            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(source, "skipping unreadable corpus file: {e}");
                    summary.skipped += 1;
                    continue;
                }
            };

            summary.chunks += self.index_document(&source, &text)?;
            summary.documents += 1;
        }

        summary.pruned = self.index.prune_documents(&present)?;

        if summary.is_empty() {
            tracing::warn!(
                dir = %corpus_dir.display(),
                "no corpus documents found; retrieval will run degraded"
            );
        } else {
            tracing::info!(
                documents = summary.documents,
                chunks = summary.chunks,
                skipped = summary.skipped,
                pruned = summary.pruned,
                "corpus indexed"
            );
        }

        Ok(summary)
    }

    fn index_document(&self, source: &str, text: &str) -> Result<usize, IndexError> {
        let document_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, source.as_bytes());

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            tracing::debug!(source, "document produced no chunks");
            // An emptied document still sheds whatever it held before.
            self.index.delete_document(&document_id)?;
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let records: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk {
                chunk_id: Uuid::new_v5(&document_id, chunk.char_offset.to_string().as_bytes()),
                document_id,
                source: source.to_string(),
                chunk_index: chunk.chunk_index,
                char_offset: chunk.char_offset,
                content: chunk.content,
                embedding,
            })
            .collect();

        self.index.upsert_chunks(&records)
    }
}
