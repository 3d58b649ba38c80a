use serde::{Deserialize, Serialize};

/// Clinical term lexicon driving symptom extraction and remedy parsing.
///
/// Injectable configuration rather than hard-coded lists: the defaults
/// cover classical constitutional prescribing, and a practice can extend
/// them by loading a JSON file without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Terms matched (case-insensitive substring) against patient narrative lines.
    pub symptom_terms: Vec<String>,
    /// Remedy names recognized in synthesized text (case-sensitive, as printed).
    pub remedy_names: Vec<String>,
    /// Potency tokens recognized in synthesized text (matched uppercase).
    pub potency_tokens: Vec<String>,
    /// Remedy list substituted when parsing finds no potency+remedy lines.
    pub fallback_remedies: Vec<String>,
    /// Fixed follow-up checklist attached to every successful report.
    pub follow_up_checklist: Vec<String>,
}

impl Lexicon {
    /// Load a lexicon from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True if the line carries a recognized potency token (e.g. "30C", "1M").
    pub fn contains_potency(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.potency_tokens.iter().any(|p| upper.contains(p.as_str()))
    }

    /// True if the line names a recognized remedy.
    pub fn contains_remedy(&self, line: &str) -> bool {
        self.remedy_names.iter().any(|r| line.contains(r.as_str()))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            symptom_terms: [
                "headache",
                "pain",
                "fever",
                "cough",
                "nausea",
                "vomiting",
                "diarrhea",
                "constipation",
                "anxiety",
                "depression",
                "insomnia",
                "fatigue",
                "weakness",
                "dizziness",
                "rash",
                "inflammation",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            remedy_names: ["Sulphur", "Nux", "Arsenicum", "Lycopodium", "Pulsatilla"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            potency_tokens: ["30C", "200C", "1M", "10M", "LM"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_remedies: vec![
                "Constitutional remedy to be determined based on detailed analysis".to_string(),
                "Acute remedy for immediate symptom relief".to_string(),
                "Follow-up consultation recommended".to_string(),
            ],
            follow_up_checklist: vec![
                "Monitor patient response for 2-4 weeks".to_string(),
                "Avoid antidoting substances (coffee, mint, camphor)".to_string(),
                "Schedule follow-up consultation".to_string(),
                "Keep symptom diary".to_string(),
                "Report any new symptoms or changes".to_string(),
            ],
        }
    }
}
