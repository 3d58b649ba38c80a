pub mod compose;
pub mod remedies;
pub mod retrieval;
pub mod symptoms;
pub mod synthesizer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("embedding generation failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("report composition failed: {0}")]
    Compose(String),
}

/// Outcome tag on a finished report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// The structured result of one analysis call.
///
/// Always well-formed: a failed analysis carries the fault description in
/// `narrative` with status `error`, never a missing object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: ReportStatus,
    pub narrative: String,
    /// At most five entries, deduplicated, in narrative order.
    pub recommended_remedies: Vec<String>,
    pub follow_up_recommendations: Vec<String>,
    /// Percentage string, e.g. "75%"; "0%" on error.
    pub confidence: String,
    /// Normalized symptom terms extracted from the case (sorted).
    pub symptoms: Vec<String>,
    /// Number of corpus chunks that informed the report.
    pub sources_consulted: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
