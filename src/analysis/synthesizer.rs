use super::compose::ReportComposer;
use super::remedies::{extract_follow_ups, extract_remedies};
use super::retrieval::retrieve;
use super::symptoms::extract;
use super::{AnalysisError, AnalysisReport, ReportStatus};
use crate::embedding::EmbeddingProvider;
use crate::index::store::VectorIndex;
use crate::lexicon::Lexicon;

/// Confidence reported on a successful, knowledge-base-matched analysis.
const SUCCESS_CONFIDENCE: &str = "75%";
const ERROR_CONFIDENCE: &str = "0%";

/// Per-call synthesis pipeline:
/// extract → retrieve → compose → parse remedies → parse follow-ups.
///
/// Holds no per-call state; any step failure is downgraded into a
/// terminal error report rather than propagated, so callers always get a
/// well-formed report object.
pub struct CaseSynthesizer<'a> {
    embedder: &'a dyn EmbeddingProvider,
    index: &'a dyn VectorIndex,
    composer: &'a dyn ReportComposer,
    lexicon: &'a Lexicon,
    top_k: usize,
}

impl<'a> CaseSynthesizer<'a> {
    pub fn new(
        embedder: &'a dyn EmbeddingProvider,
        index: &'a dyn VectorIndex,
        composer: &'a dyn ReportComposer,
        lexicon: &'a Lexicon,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            composer,
            lexicon,
            top_k,
        }
    }

    pub fn analyze(&self, patient_text: &str) -> AnalysisReport {
        match self.run(patient_text) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("analysis failed: {e}");
                error_report(&e)
            }
        }
    }

    fn run(&self, patient_text: &str) -> Result<AnalysisReport, AnalysisError> {
        let symptoms = extract(patient_text, self.lexicon);
        tracing::debug!(symptoms = symptoms.len(), "symptom extraction complete");

        let retrieval = retrieve(&symptoms, self.embedder, self.index, self.top_k);

        let composed = self
            .composer
            .compose(patient_text, &symptoms, &retrieval, self.lexicon)?;
        let narrative = composed.render();

        let recommended_remedies = extract_remedies(&narrative, self.lexicon);
        let follow_up_recommendations = extract_follow_ups(&narrative, self.lexicon);

        Ok(AnalysisReport {
            status: ReportStatus::Success,
            narrative,
            recommended_remedies,
            follow_up_recommendations,
            confidence: SUCCESS_CONFIDENCE.to_string(),
            symptoms: symptoms.to_vec(),
            sources_consulted: retrieval.hits.len(),
            generated_at: chrono::Utc::now(),
        })
    }
}

fn error_report(error: &AnalysisError) -> AnalysisReport {
    AnalysisReport {
        status: ReportStatus::Error,
        narrative: format!("Error occurred during analysis: {error}"),
        recommended_remedies: Vec::new(),
        follow_up_recommendations: Vec::new(),
        confidence: ERROR_CONFIDENCE.to_string(),
        symptoms: Vec::new(),
        sources_consulted: 0,
        generated_at: chrono::Utc::now(),
    }
}
