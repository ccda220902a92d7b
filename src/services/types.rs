//! Free-text to type label classification.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. cancellation synonyms ("entfällt", "fällt aus", "f.a.", ...)
//! 2. literal type labels, passed through unchanged ("Klausur", "Raumänderung")
//! 3. keyword heuristics ("verschoben" → relocation, "geänderter Raum" →
//!    room change, "...frei" → cancellation, "Aufgaben" → independent work)

use unicode_segmentation::UnicodeSegmentation;

use crate::models::labels;
use crate::utils::normalize_whitespace;

const CANCELLATION_SYNONYMS: &[&str] = &[
    "entfällt",
    "entfallen",
    "entfall",
    "fällt aus",
    "fällt weg",
    "f.a.",
    "ausfall",
];

const LITERAL_TYPES: &[&str] = &[
    "Vertretung",
    "Vertr.",
    "Statt-Vertretung",
    "Betreuung",
    "Mitbetreuung",
    "Sondereinsatz",
    "Verlegung",
    "Tausch",
    "Stundentausch",
    "Unterricht geändert",
    "Raumänderung",
    "Raumtausch",
    "Raum-Vtr.",
    "Klausur",
    "Prüfung",
    "Exkursion",
    "Veranstaltung",
    "Wandertag",
    "Sondertermin",
    "Pausenaufsicht",
    "Freistunde",
    "Klasse frei",
    "EVA",
    "selbst.",
];

/// How a heuristic keyword is matched against the lowercased text.
#[derive(Debug, Clone)]
enum Keyword {
    /// Appears anywhere
    Substring(&'static str),
    /// A whole word, or the end of a compound word ("hitzefrei")
    WordSuffix(&'static str),
}

impl Keyword {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Keyword::Substring(needle) => lower.contains(needle),
            Keyword::WordSuffix(suffix) => lower.unicode_words().any(|w| w.ends_with(suffix)),
        }
    }
}

/// Ordered rule set mapping descriptions to type labels.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    literals: Vec<String>,
    heuristics: Vec<(Keyword, &'static str)>,
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl TypeClassifier {
    /// Build the rule set. `extra_literals` extends the literal allow-list,
    /// e.g. with type labels a school assigns colors to.
    pub fn new<I, S>(extra_literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut literals: Vec<String> = LITERAL_TYPES.iter().map(|s| s.to_lowercase()).collect();
        for literal in extra_literals {
            let literal = literal.into().trim().to_lowercase();
            if !literal.is_empty() && !literals.contains(&literal) {
                literals.push(literal);
            }
        }

        let heuristics = vec![
            (Keyword::Substring("verschoben"), labels::RELOCATION),
            (Keyword::Substring("verlegt"), labels::RELOCATION),
            (Keyword::Substring("geänderter raum"), labels::ROOM_CHANGE),
            (Keyword::Substring("raumänderung"), labels::ROOM_CHANGE),
            (Keyword::Substring("raumwechsel"), labels::ROOM_CHANGE),
            (Keyword::WordSuffix("frei"), labels::CANCELLATION),
            (Keyword::Substring("aufgaben"), labels::INDEPENDENT_WORK),
            (Keyword::Substring("aufg."), labels::INDEPENDENT_WORK),
            (Keyword::Substring("selbst."), labels::INDEPENDENT_WORK),
            (Keyword::Substring("selbstständig"), labels::INDEPENDENT_WORK),
            (Keyword::Substring("selbstlernen"), labels::INDEPENDENT_WORK),
            (Keyword::Substring("klausur"), labels::EXAM),
            (Keyword::Substring("vertretung"), labels::SUBSTITUTION),
        ];

        Self {
            literals,
            heuristics,
        }
    }

    /// Classify a description. `None` when no rule applies.
    pub fn classify(&self, text: &str) -> Option<String> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();

        if CANCELLATION_SYNONYMS.iter().any(|s| lower.contains(s)) {
            return Some(labels::CANCELLATION.to_string());
        }

        if self.literals.iter().any(|l| *l == lower) {
            return Some(text);
        }

        let found = self
            .heuristics
            .iter()
            .find(|(keyword, _)| keyword.matches(&lower))
            .map(|(_, label)| label.to_string());

        if found.is_none() {
            log::debug!("No type rule matched '{}'", text);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<String> {
        TypeClassifier::default().classify(text)
    }

    #[test]
    fn test_cancellation_synonyms() {
        assert_eq!(classify("Mathe fällt aus").as_deref(), Some("Entfall"));
        assert_eq!(classify("entfällt").as_deref(), Some("Entfall"));
        assert_eq!(classify("f.a.").as_deref(), Some("Entfall"));
        assert_eq!(classify("ENTFALL").as_deref(), Some("Entfall"));
    }

    #[test]
    fn test_literals_pass_through_unchanged() {
        assert_eq!(classify("Klausur").as_deref(), Some("Klausur"));
        assert_eq!(classify("  Raumänderung ").as_deref(), Some("Raumänderung"));
        assert_eq!(classify("statt-vertretung").as_deref(), Some("statt-vertretung"));
    }

    #[test]
    fn test_heuristics() {
        assert_eq!(classify("auf Freitag verschoben").as_deref(), Some("Verlegung"));
        assert_eq!(classify("geänderter Raum").as_deref(), Some("Raumänderung"));
        assert_eq!(classify("hitzefrei").as_deref(), Some("Entfall"));
        assert_eq!(classify("Klasse hat frei").as_deref(), Some("Entfall"));
        assert_eq!(classify("Aufgaben im Moodle").as_deref(), Some("selbst."));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("Freiarbeit"), None);
        assert_eq!(classify("bitte Bücher mitbringen"), None);
    }

    #[test]
    fn test_cancellation_beats_literal_and_heuristics() {
        // also matches the "klausur" heuristic
        assert_eq!(classify("Klausur fällt aus").as_deref(), Some("Entfall"));
        // also matches "verschoben"
        assert_eq!(classify("entfällt, verschoben").as_deref(), Some("Entfall"));
    }

    #[test]
    fn test_literal_beats_heuristics() {
        // "Raumtausch" is a literal; heuristics would not match it
        assert_eq!(classify("Raumtausch").as_deref(), Some("Raumtausch"));
        // "Vertretung" literal wins over the "vertretung" heuristic label
        assert_eq!(classify("VERTRETUNG").as_deref(), Some("VERTRETUNG"));
    }

    #[test]
    fn test_heuristic_order() {
        // matches "verlegt" and "raumänderung"; relocation comes first
        assert_eq!(
            classify("Raumänderung, Stunde verlegt").as_deref(),
            Some("Verlegung")
        );
        // matches "frei" and "aufgaben"; cancellation comes first
        assert_eq!(classify("frei, Aufgaben erledigen").as_deref(), Some("Entfall"));
    }

    #[test]
    fn test_extra_literals() {
        let classifier = TypeClassifier::new(["Sonderunterricht"]);
        assert_eq!(
            classifier.classify("Sonderunterricht").as_deref(),
            Some("Sonderunterricht")
        );
    }
}
