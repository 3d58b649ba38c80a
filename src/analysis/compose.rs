use super::retrieval::{RetrievalOutcome, RetrievalStatus};
use super::symptoms::SymptomSet;
use super::AnalysisError;
use crate::lexicon::Lexicon;

/// Fixed analytical frame the service works within. Carried on the
/// service instance and surfaced to operators; the composed report's
/// constitutional-analysis section follows the same principles.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are an expert homeopathic assistant specializing in classical homeopathy and remedy selection.

Guidelines for analysis:
1. Always consider the totality of symptoms (mental, emotional, physical)
2. Prioritize strange, rare, and peculiar symptoms
3. Consider constitutional type and miasmatic background
4. Analyze modalities (what makes symptoms better/worse)
5. Look for keynote symptoms and characteristic features
6. Consider causation and triggering factors

Always maintain professional medical ethics and remind users to consult qualified practitioners.";

/// Structured report value produced by COMPOSE.
///
/// A pure value, rendered to narrative text only at the boundary, so the
/// synthesis logic stays testable independent of presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedReport {
    pub patient_summary: String,
    pub knowledge_findings: Vec<String>,
    pub constitutional_analysis: Vec<String>,
    pub recommended_approach: Vec<String>,
    pub suggested_remedies: Vec<String>,
    pub follow_up: Vec<String>,
}

impl ComposedReport {
    /// Render the fixed-structure narrative text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("HOMEOPATHIC CASE ANALYSIS\n");

        out.push_str("\nPATIENT SUMMARY:\n");
        out.push_str(self.patient_summary.trim());
        out.push('\n');

        out.push_str("\nKNOWLEDGE BASE FINDINGS:\n");
        for finding in &self.knowledge_findings {
            out.push_str(&format!("- {finding}\n"));
        }

        out.push_str("\nCONSTITUTIONAL ANALYSIS:\n");
        for line in &self.constitutional_analysis {
            out.push_str(line);
            out.push('\n');
        }

        out.push_str("\nRECOMMENDED APPROACH:\n");
        for (i, step) in self.recommended_approach.iter().enumerate() {
            out.push_str(&format!("{}. {step}\n", i + 1));
        }

        out.push_str("\nSUGGESTED REMEDIES:\n");
        for remedy in &self.suggested_remedies {
            out.push_str(&format!("- {remedy}\n"));
        }

        out.push_str("\nFOLLOW-UP RECOMMENDATIONS:\n");
        for item in &self.follow_up {
            out.push_str(&format!("- {item}\n"));
        }

        out.push_str(
            "\nNote: This analysis is based on knowledge base search. For comprehensive \
             treatment, consult with a qualified homeopathic practitioner.\n",
        );

        out
    }
}

/// Composition seam of the synthesizer.
pub trait ReportComposer: Send + Sync {
    fn compose(
        &self,
        patient_text: &str,
        symptoms: &SymptomSet,
        retrieval: &RetrievalOutcome,
        lexicon: &Lexicon,
    ) -> Result<ComposedReport, AnalysisError>;
}

/// Default composer: a template-driven merge of the patient text and the
/// retrieved material, deterministic given its inputs.
pub struct TemplateComposer;

impl ReportComposer for TemplateComposer {
    fn compose(
        &self,
        patient_text: &str,
        symptoms: &SymptomSet,
        retrieval: &RetrievalOutcome,
        lexicon: &Lexicon,
    ) -> Result<ComposedReport, AnalysisError> {
        Ok(ComposedReport {
            patient_summary: patient_text.trim().to_string(),
            knowledge_findings: knowledge_findings(symptoms, retrieval),
            constitutional_analysis: vec![
                "Based on the symptom picture, this case suggests a need for constitutional treatment.".to_string(),
                "The totality of symptoms should guide remedy selection.".to_string(),
            ],
            recommended_approach: vec![
                "Consider the mental/emotional state as primary".to_string(),
                "Look at physical symptoms with their modalities".to_string(),
                "Assess constitutional type and miasmatic background".to_string(),
                "Select remedy based on similimum principle".to_string(),
            ],
            suggested_remedies: vec![
                "Arsenicum Album 30C - for anxiety with restlessness".to_string(),
                "Nux Vomica 30C - for digestive issues with irritability".to_string(),
                "Pulsatilla 30C - for changeable symptoms and mild disposition".to_string(),
                "Sulphur 200C - for constitutional treatment".to_string(),
                "Lycopodium 30C - for digestive and confidence issues".to_string(),
            ],
            follow_up: lexicon.follow_up_checklist.clone(),
        })
    }
}

fn knowledge_findings(symptoms: &SymptomSet, retrieval: &RetrievalOutcome) -> Vec<String> {
    match &retrieval.status {
        RetrievalStatus::NoSymptoms => {
            vec!["No specific symptoms identified for search".to_string()]
        }
        RetrievalStatus::IndexEmpty => vec![
            "Knowledge corpus is empty; analysis is based on general principles".to_string(),
        ],
        RetrievalStatus::Unavailable(reason) => {
            vec![format!("Knowledge base search unavailable: {reason}")]
        }
        RetrievalStatus::Matched => {
            let mut findings = vec![format!(
                "Found information related to: {}",
                symptoms.to_vec().join(", ")
            )];
            for hit in &retrieval.hits {
                findings.push(format!("[{}] {}", hit.source, snippet(&hit.content, 160)));
            }
            findings.extend([
                "Based on homeopathic principles, consider constitutional remedies".to_string(),
                "Symptom totality suggests looking at mental/emotional state".to_string(),
                "Physical symptoms should be considered with modalities".to_string(),
            ]);
            findings
        }
    }
}

/// First `max_chars` characters on a char boundary, single-line.
fn snippet(text: &str, max_chars: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let truncated: String = flattened.chars().take(max_chars).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::symptoms::extract;
    use crate::index::store::ScoredChunk;
    use uuid::Uuid;

    fn matched_retrieval(contents: &[&str]) -> RetrievalOutcome {
        RetrievalOutcome {
            hits: contents
                .iter()
                .map(|c| ScoredChunk {
                    chunk_id: Uuid::from_u128(1),
                    source: "boericke.txt".into(),
                    content: c.to_string(),
                    score: 0.9,
                })
                .collect(),
            status: RetrievalStatus::Matched,
        }
    }

    fn degraded(status: RetrievalStatus) -> RetrievalOutcome {
        RetrievalOutcome {
            hits: vec![],
            status,
        }
    }

    #[test]
    fn render_has_all_sections_in_order() {
        let lexicon = Lexicon::default();
        let symptoms = extract("headache and fatigue", &lexicon);
        let composed = TemplateComposer
            .compose("Patient case text", &symptoms, &matched_retrieval(&["Nux vomica keynotes"]), &lexicon)
            .unwrap();

        let narrative = composed.render();
        let sections = [
            "PATIENT SUMMARY:",
            "KNOWLEDGE BASE FINDINGS:",
            "CONSTITUTIONAL ANALYSIS:",
            "RECOMMENDED APPROACH:",
            "SUGGESTED REMEDIES:",
            "FOLLOW-UP RECOMMENDATIONS:",
        ];
        let mut last = 0;
        for section in sections {
            let pos = narrative.find(section).unwrap_or_else(|| panic!("missing {section}"));
            assert!(pos > last, "{section} out of order");
            last = pos;
        }
        assert!(narrative.contains("Patient case text"));
        assert!(narrative.contains("boericke.txt"));
    }

    #[test]
    fn composition_is_deterministic() {
        let lexicon = Lexicon::default();
        let symptoms = extract("nausea", &lexicon);
        let retrieval = matched_retrieval(&["Ipecac indications"]);

        let a = TemplateComposer.compose("case", &symptoms, &retrieval, &lexicon).unwrap();
        let b = TemplateComposer.compose("case", &symptoms, &retrieval, &lexicon).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_symptoms_gets_sentinel_finding() {
        let lexicon = Lexicon::default();
        let symptoms = extract("", &lexicon);
        let composed = TemplateComposer
            .compose("case", &symptoms, &degraded(RetrievalStatus::NoSymptoms), &lexicon)
            .unwrap();

        assert_eq!(
            composed.knowledge_findings,
            vec!["No specific symptoms identified for search".to_string()]
        );
    }

    #[test]
    fn unavailable_index_explains_itself() {
        let lexicon = Lexicon::default();
        let symptoms = extract("fever", &lexicon);
        let composed = TemplateComposer
            .compose(
                "case",
                &symptoms,
                &degraded(RetrievalStatus::Unavailable("index lock poisoned".into())),
                &lexicon,
            )
            .unwrap();

        assert!(composed.knowledge_findings[0].contains("index lock poisoned"));
    }

    #[test]
    fn suggested_remedies_carry_potency_and_name() {
        let lexicon = Lexicon::default();
        let symptoms = extract("anxiety", &lexicon);
        let composed = TemplateComposer
            .compose("case", &symptoms, &degraded(RetrievalStatus::IndexEmpty), &lexicon)
            .unwrap();

        for line in &composed.suggested_remedies {
            assert!(lexicon.contains_potency(line), "no potency in {line}");
            assert!(lexicon.contains_remedy(line), "no remedy in {line}");
        }
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let text = "ä".repeat(300);
        let s = snippet(&text, 160);
        assert_eq!(s.chars().count(), 161); // 160 + ellipsis
    }

    #[test]
    fn follow_up_comes_from_lexicon() {
        let mut lexicon = Lexicon::default();
        lexicon.follow_up_checklist = vec!["Custom step".to_string()];
        let symptoms = extract("", &lexicon);
        let composed = TemplateComposer
            .compose("case", &symptoms, &degraded(RetrievalStatus::NoSymptoms), &lexicon)
            .unwrap();
        assert_eq!(composed.follow_up, vec!["Custom step".to_string()]);
    }
}
