//! Session total (currency) extraction.

use super::patterns::{COST_WON, MAX_TOTAL_COST, MIN_TOTAL_COST};
use super::{ExtractionMatch, FieldExtractor};

/// Total cost extractor.
///
/// Every integer on the receipt is a candidate; candidates outside the
/// plausible range for one session (phone number fragments, percentages,
/// kWh figures) are dropped and the largest survivor is the total.
pub struct TotalCostExtractor {
    min: u64,
    max: u64,
}

impl TotalCostExtractor {
    pub fn new() -> Self {
        Self {
            min: MIN_TOTAL_COST,
            max: MAX_TOTAL_COST,
        }
    }

    /// Set the inclusive range of accepted totals.
    pub fn with_bounds(mut self, min: u64, max: u64) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

impl Default for TotalCostExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalCostExtractor {
    type Output = ExtractionMatch<u64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text)
            .into_iter()
            .max_by(|a, b| a.value.cmp(&b.value))
    }

    /// In-range candidates, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        COST_WON
            .captures_iter(text)
            .filter_map(|caps| {
                let amount = parse_grouped_amount(&caps[1])?;
                if amount < self.min || amount > self.max {
                    return None;
                }
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(amount, full_match.as_str().trim())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Parse an integer with comma thousands separators ("18,500" -> 18500).
pub fn parse_grouped_amount(s: &str) -> Option<u64> {
    let digits: String = s.chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Extract the session total using the default bounds.
pub fn extract_total_cost(text: &str) -> Option<u64> {
    TotalCostExtractor::new().extract(text).map(|m| m.value)
}
