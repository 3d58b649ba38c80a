use super::symptoms::SymptomSet;
use crate::embedding::EmbeddingProvider;
use crate::index::store::{ScoredChunk, VectorIndex};

/// Why a retrieval pass did (or did not) produce hits. Degraded paths are
/// data, not errors: report synthesis must never be blocked by them.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalStatus {
    /// Targeted search ran against the index.
    Matched,
    /// Empty symptom set; no targeted search was possible.
    NoSymptoms,
    /// The index holds no chunks (empty corpus).
    IndexEmpty,
    /// Embedding or index failure, carried as an explanation.
    Unavailable(String),
}

/// Ordered top-K retrieval result, highest score first.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub hits: Vec<ScoredChunk>,
    pub status: RetrievalStatus,
}

impl RetrievalOutcome {
    fn degraded(status: RetrievalStatus) -> Self {
        Self {
            hits: Vec::new(),
            status,
        }
    }
}

/// Search the vector index for chunks relevant to the symptom set.
///
/// The query embeds the joined symptom terms with the same provider used
/// at indexing time. Never returns an error: an unusable index degrades
/// to an explanatory status instead.
pub fn retrieve(
    symptoms: &SymptomSet,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    top_k: usize,
) -> RetrievalOutcome {
    if symptoms.is_empty() {
        return RetrievalOutcome::degraded(RetrievalStatus::NoSymptoms);
    }

    match index.chunk_count() {
        Ok(0) => return RetrievalOutcome::degraded(RetrievalStatus::IndexEmpty),
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("vector index unavailable: {e}");
            return RetrievalOutcome::degraded(RetrievalStatus::Unavailable(e.to_string()));
        }
    }

    let query_embedding = match embedder.embed(&symptoms.query_text()) {
        Ok(embedding) => embedding,
        Err(e) => {
            tracing::warn!("query embedding failed: {e}");
            return RetrievalOutcome::degraded(RetrievalStatus::Unavailable(e.to_string()));
        }
    };

    match index.query(&query_embedding, top_k) {
        Ok(hits) => {
            tracing::debug!(hits = hits.len(), "knowledge retrieval complete");
            RetrievalOutcome {
                hits,
                status: RetrievalStatus::Matched,
            }
        }
        Err(e) => {
            tracing::warn!("vector search failed: {e}");
            RetrievalOutcome::degraded(RetrievalStatus::Unavailable(e.to_string()))
        }
    }
}
