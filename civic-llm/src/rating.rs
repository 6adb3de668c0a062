//! Keyword heuristic that turns an explanation into a five-point rating.
//!
//! Rules are checked top to bottom and the first group with a matching
//! keyword wins, so an explanation mentioning both "false" and "true"
//! is rated [`FactRating::False`]. Keep [`RULES`] in this order.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactRating {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
}

impl FactRating {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::MostlyTrue => "mostly-true",
            Self::Mixed => "mixed",
            Self::MostlyFalse => "mostly-false",
            Self::False => "false",
        }
    }
}

impl fmt::Display for FactRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered keyword groups. Matching is case-insensitive substring search.
pub const RULES: [(&[&str], FactRating); 5] = [
    (&["false", "incorrect"], FactRating::False),
    (&["misleading", "partially false"], FactRating::MostlyFalse),
    (&["mixed", "partially true"], FactRating::Mixed),
    (&["mostly true", "generally accurate"], FactRating::MostlyTrue),
    (&["true", "accurate"], FactRating::True),
];

/// Rating used when no keyword group matches.
pub const FALLBACK_RATING: FactRating = FactRating::Mixed;

/// Rate an explanation text.
///
/// ```
/// use civic_llm::rating::{classify, FactRating};
///
/// assert_eq!(classify("This claim is FALSE."), FactRating::False);
/// assert_eq!(classify("The figures are generally accurate."), FactRating::MostlyTrue);
/// assert_eq!(classify("No verdict was reached."), FactRating::Mixed);
/// ```
pub fn classify(explanation: &str) -> FactRating {
    let haystack = explanation.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(_, rating)| *rating)
        .unwrap_or(FALLBACK_RATING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_wins_over_true() {
        assert_eq!(
            classify("Parts are true but the headline is false."),
            FactRating::False
        );
    }

    #[test]
    fn incorrect_is_false() {
        assert_eq!(classify("The statistic quoted is incorrect."), FactRating::False);
    }

    #[test]
    fn misleading_is_mostly_false() {
        assert_eq!(classify("The post is misleading."), FactRating::MostlyFalse);
    }

    // "partially false" contains "false", so rule 1 shadows rule 2.
    #[test]
    fn partially_false_is_shadowed_by_false() {
        assert_eq!(classify("This is partially false."), FactRating::False);
    }

    #[test]
    fn mixed_and_partially_true() {
        assert_eq!(classify("Evidence is mixed."), FactRating::Mixed);
        assert_eq!(classify("The claim is partially true."), FactRating::Mixed);
    }

    // "mostly true" contains "true" but rule 4 is checked first.
    #[test]
    fn mostly_true_beats_plain_true() {
        assert_eq!(classify("This is mostly true."), FactRating::MostlyTrue);
    }

    // "inaccurate" contains "accurate"; the heuristic does not know better.
    #[test]
    fn inaccurate_reads_as_true() {
        assert_eq!(classify("The quote is inaccurate."), FactRating::True);
    }

    #[test]
    fn no_keywords_falls_back_to_mixed() {
        assert_eq!(classify(""), FactRating::Mixed);
        assert_eq!(classify("The act was passed in 2019."), FactRating::Mixed);
    }

    #[test]
    fn serializes_kebab_case() {
        let encoded: Vec<String> = [
            FactRating::True,
            FactRating::MostlyTrue,
            FactRating::Mixed,
            FactRating::MostlyFalse,
            FactRating::False,
        ]
        .iter()
        .map(|r| serde_json::to_value(r).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(
            encoded,
            ["true", "mostly-true", "mixed", "mostly-false", "false"]
        );
    }
}
