//! Charger type extraction.

use crate::models::receipt::ChargerType;

use super::patterns::{FAST_CHARGER_KEYWORDS, SLOW_CHARGER_KEYWORDS, SUPERCHARGER_KEYWORDS};
use super::{ExtractionMatch, FieldExtractor};

/// Keyword sets in match priority order.
///
/// Supercharger must be tested before fast: supercharger receipts often also
/// mention DC / fast charging.
const KEYWORD_SETS: [(ChargerType, &[&str]); 3] = [
    (ChargerType::Supercharger, SUPERCHARGER_KEYWORDS),
    (ChargerType::Fast, FAST_CHARGER_KEYWORDS),
    (ChargerType::Slow, SLOW_CHARGER_KEYWORDS),
];

/// Charger type extractor (case-insensitive substring search).
pub struct ChargerTypeExtractor;

impl ChargerTypeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChargerTypeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ChargerTypeExtractor {
    type Output = ExtractionMatch<ChargerType>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Every matching type, in priority order, with the keyword that hit.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lower = text.to_lowercase();

        KEYWORD_SETS
            .iter()
            .filter_map(|(charger_type, keywords)| {
                keywords
                    .iter()
                    .find(|k| lower.contains(**k))
                    .map(|k| ExtractionMatch::new(*charger_type, *k))
            })
            .collect()
    }
}

/// Extract the charger type from receipt text.
pub fn extract_charger_type(text: &str) -> Option<ChargerType> {
    ChargerTypeExtractor::new().extract(text).map(|m| m.value)
}
