//! Charging site extraction.

use super::patterns::{LOCATION_FALLBACK_MAX_CHARS, LOCATION_FALLBACK_MIN_CHARS, LOCATION_KEYWORDS};
use super::{ExtractionMatch, FieldExtractor};

/// Location field extractor.
///
/// Heuristic only: the selected line is not checked to be an address.
pub struct LocationExtractor;

impl LocationExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First non-empty line, if its length is plausible for a site name.
    fn fallback(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
        let len = line.chars().count();

        if len > LOCATION_FALLBACK_MIN_CHARS && len < LOCATION_FALLBACK_MAX_CHARS {
            Some(ExtractionMatch::new(line.to_string(), line))
        } else {
            None
        }
    }
}

impl Default for LocationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LocationExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text)
            .into_iter()
            .next()
            .or_else(|| self.fallback(text))
    }

    /// Keyword lines, ordered by keyword priority then by line.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for keyword in LOCATION_KEYWORDS {
            for line in text.lines() {
                if !line.contains(keyword) {
                    continue;
                }
                let trimmed = line.trim();
                if results.iter().any(|r| r.value == trimmed) {
                    continue;
                }
                results.push(ExtractionMatch::new(trimmed.to_string(), *keyword));
            }
        }

        results
    }
}

/// Extract the charging site from receipt text.
pub fn extract_location(text: &str) -> Option<String> {
    LocationExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_line_is_returned_trimmed() {
        let text = "영수증\n   환경부 강남 급속충전소  \n합계 18,500원";
        assert_eq!(extract_location(text), Some("환경부 강남 급속충전소".to_string()));
    }

    #[test]
    fn test_keyword_priority_beats_line_order() {
        // "충전기" appears first, but "슈퍼차저" has priority
        let text = "충전기 3번\n테슬라 슈퍼차저 하남\n";
        assert_eq!(extract_location(text), Some("테슬라 슈퍼차저 하남".to_string()));
    }

    #[test]
    fn test_english_keyword() {
        let text = "RECEIPT #1\nDowntown Station 4\n";
        assert_eq!(extract_location(text), Some("Downtown Station 4".to_string()));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        // "station" lowercase is not a keyword; falls back to the first line
        let text = "Gas station road\nmore";
        assert_eq!(extract_location(text), Some("Gas station road".to_string()));
    }

    #[test]
    fn test_fallback_skips_blank_lines() {
        let text = "\n\n  이마트 성수점  \n40kWh";
        assert_eq!(extract_location(text), Some("이마트 성수점".to_string()));
    }

    #[test]
    fn test_fallback_length_bounds() {
        assert_eq!(extract_location("AB\nsecond line"), None);
        assert_eq!(extract_location("ABC"), Some("ABC".to_string()));
        assert_eq!(extract_location(&"x".repeat(50)), None);
        assert_eq!(extract_location(&"x".repeat(49)), Some("x".repeat(49)));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_location(""), None);
        assert_eq!(extract_location("   \n  "), None);
    }
}
