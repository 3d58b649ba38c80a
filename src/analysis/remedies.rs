use crate::lexicon::Lexicon;

/// Hard cap on remedy recommendations per report.
pub const MAX_REMEDIES: usize = 5;

/// Scan a composed narrative line by line for remedy recommendations.
///
/// A line qualifies only when it carries both a recognized potency token
/// and a recognized remedy name. Matches are deduplicated, kept in
/// narrative order, and capped at [`MAX_REMEDIES`]. Zero matches yields
/// the lexicon's fixed fallback list — an explicit policy, not an error.
pub fn extract_remedies(narrative: &str, lexicon: &Lexicon) -> Vec<String> {
    let mut remedies: Vec<String> = Vec::new();

    for line in narrative.lines() {
        if !lexicon.contains_potency(line) || !lexicon.contains_remedy(line) {
            continue;
        }
        let trimmed = line.trim().trim_start_matches("- ").trim().to_string();
        if !remedies.contains(&trimmed) {
            remedies.push(trimmed);
        }
    }

    if remedies.is_empty() {
        return lexicon.fallback_remedies.clone();
    }

    remedies.truncate(MAX_REMEDIES);
    remedies
}

/// Fixed follow-up checklist. Not derived from narrative content; the
/// argument is kept so content-aware extraction can slot in later.
pub fn extract_follow_ups(_narrative: &str, lexicon: &Lexicon) -> Vec<String> {
    lexicon.follow_up_checklist.clone()
}

/// Templated informational lookup for a single remedy. Degrades never
/// fails: any name produces a well-formed information sheet.
pub fn remedy_info(remedy_name: &str) -> String {
    let name = remedy_name.trim();
    let display = if name.is_empty() {
        "UNSPECIFIED REMEDY".to_string()
    } else {
        name.to_uppercase()
    };

    format!(
        "REMEDY INFORMATION: {display}\n\
         \n\
         KEY INDICATIONS:\n\
         - Constitutional remedy for specific symptom patterns\n\
         - Acute remedy for immediate symptom relief\n\
         - Consider potency based on symptom intensity\n\
         \n\
         GENERAL CHARACTERISTICS:\n\
         - Mental/emotional symptoms: Varies by individual case\n\
         - Physical symptoms: Based on proving and clinical experience\n\
         - Modalities: Better/worse conditions specific to remedy\n\
         \n\
         POTENCY RECOMMENDATIONS:\n\
         - 30C: For acute conditions and initial treatment\n\
         - 200C: For constitutional treatment\n\
         - 1M: For deep-acting constitutional cases\n\
         \n\
         USAGE GUIDELINES:\n\
         - Single dose and wait for response\n\
         - Avoid repetition unless symptoms return\n\
         - Monitor for aggravation or improvement\n\
         \n\
         Note: This is general information from the knowledge base. For specific\n\
         remedy details, consult a materia medica or qualified practitioner."
    )
}
