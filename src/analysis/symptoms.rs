use std::collections::BTreeSet;

use crate::lexicon::Lexicon;

/// Deduplicated, order-irrelevant set of normalized symptom terms from
/// one patient narrative. BTreeSet keeps iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomSet {
    terms: BTreeSet<String>,
}

impl SymptomSet {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Terms joined into a single retrieval query string.
    pub fn query_text(&self) -> String {
        self.terms
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.terms.iter().cloned().collect()
    }
}

impl FromIterator<String> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Derive the symptom set from free text by case-insensitive substring
/// matching against the lexicon, line by line.
///
/// Pure function of (text, lexicon); an empty result is valid and routes
/// retrieval onto its "no symptoms identified" path.
pub fn extract(text: &str, lexicon: &Lexicon) -> SymptomSet {
    let lower = text.to_lowercase();
    let mut terms = BTreeSet::new();

    for line in lower.lines() {
        for term in &lexicon.symptom_terms {
            if line.contains(term.as_str()) {
                terms.insert(term.clone());
            }
        }
    }

    SymptomSet { terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_terms_exactly() {
        let set = extract("Chronic headaches and fatigue", &Lexicon::default());
        assert_eq!(set.len(), 2);
        assert!(set.contains("headache"));
        assert!(set.contains("fatigue"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let set = extract("SEVERE NAUSEA after meals\nOccasional Dizziness", &Lexicon::default());
        assert!(set.contains("nausea"));
        assert!(set.contains("dizziness"));
    }

    #[test]
    fn duplicates_collapse() {
        let set = extract("headache in morning\nheadache at night\nheadaches daily", &Lexicon::default());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_text_yields_empty_set() {
        let set = extract("", &Lexicon::default());
        assert!(set.is_empty());
        assert_eq!(set.query_text(), "");
    }

    #[test]
    fn unrelated_text_yields_empty_set() {
        let set = extract("Patient enjoys gardening and long walks", &Lexicon::default());
        assert!(set.is_empty());
    }

    #[test]
    fn query_text_is_sorted_and_space_joined() {
        let set = extract("fatigue with anxiety and headache", &Lexicon::default());
        assert_eq!(set.query_text(), "anxiety fatigue headache");
    }

    #[test]
    fn custom_lexicon_is_honored() {
        let mut lexicon = Lexicon::default();
        lexicon.symptom_terms = vec!["colic".to_string()];
        let set = extract("infant colic, worse evenings, some headache", &lexicon);
        assert_eq!(set.to_vec(), vec!["colic"]);
    }
}
