use thiserror::Error;

/// Standard embedding dimension for the default provider.
pub const EMBEDDING_DIM: usize = 384;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider failure: {0}")]
    Provider(String),
}

/// Embedding model abstraction.
///
/// Implementations must be deterministic for identical input and
/// consistent in dimensionality across calls; the vector index enforces
/// the latter at upsert and query time.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
    fn dimension(&self) -> usize;
}

/// Allow `Box<dyn EmbeddingProvider>` to be used as `&impl EmbeddingProvider`.
impl EmbeddingProvider for Box<dyn EmbeddingProvider> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Default offline embedding provider: hashes word tokens into a
/// fixed-size bucket vector and L2-normalizes the result.
///
/// Deterministic and dependency-free; texts sharing clinical terms land
/// in overlapping buckets, which is enough signal for lexicon-driven
/// retrieval. Swap in a model-backed provider for semantic quality.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(token_bucket_vector(text, self.dimension))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| token_bucket_vector(t, self.dimension))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// FNV-1a, fixed seed so vectors are stable across processes.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn token_bucket_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dim];

    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let bucket = (fnv1a(token) % dim as u64) as usize;
        vec[bucket] += 1.0;
    }

    // L2 normalize
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in &mut vec {
            *val /= norm;
        }
    }

    vec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_returns_configured_dimension() {
        let embedder = HashEmbedder::new();
        let vec = embedder.embed("Chronic headaches and fatigue").unwrap();
        assert_eq!(vec.len(), EMBEDDING_DIM);
    }

    #[test]
    fn embed_is_deterministic() {
        let embedder = HashEmbedder::new();
        let v1 = embedder.embed("same text").unwrap();
        let v2 = embedder.embed("same text").unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn different_texts_differ() {
        let embedder = HashEmbedder::new();
        let v1 = embedder.embed("pulsatilla for mild disposition").unwrap();
        let v2 = embedder.embed("arsenicum for restlessness").unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn embed_is_l2_normalized() {
        let embedder = HashEmbedder::new();
        let vec = embedder.embed("test normalization").unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 0.01,
            "Vector should be L2-normalized, got norm = {norm}"
        );
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let embedder = HashEmbedder::new();
        let vec = embedder.embed("").unwrap();
        assert!(vec.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn shared_terms_increase_similarity() {
        let embedder = HashEmbedder::with_dimension(64);
        let a = embedder.embed("headache fatigue dizziness").unwrap();
        let b = embedder.embed("headache fatigue nausea").unwrap();
        let c = embedder.embed("completely unrelated gardening notes").unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(p, q)| p * q).sum() };
        assert!(dot(&a, &b) > dot(&a, &c));
    }

    #[test]
    fn embed_batch_matches_single_calls() {
        let embedder = HashEmbedder::new();
        let batch = embedder.embed_batch(&["one", "two"]).unwrap();
        assert_eq!(batch[0], embedder.embed("one").unwrap());
        assert_eq!(batch[1], embedder.embed("two").unwrap());
    }
}
