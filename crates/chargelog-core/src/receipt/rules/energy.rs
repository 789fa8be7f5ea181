//! Charged energy (kWh) extraction.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::ENERGY_KWH;
use super::{ExtractionMatch, FieldExtractor};

/// Charge amount extractor.
///
/// Receipts repeat the session total next to smaller partial figures, so the
/// largest kWh value is taken as the session total.
pub struct ChargeAmountExtractor;

impl ChargeAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChargeAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ChargeAmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text)
            .into_iter()
            .max_by(|a, b| a.value.cmp(&b.value))
            .filter(|m| !m.value.is_zero())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ENERGY_KWH
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let amount = match Decimal::from_str(&caps[1]) {
                    Ok(amount) => amount,
                    Err(e) => {
                        debug!("Skipping kWh candidate {:?}: {}", full_match.as_str(), e);
                        return None;
                    }
                };
                Some(
                    ExtractionMatch::new(amount, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Extract the charged energy in kWh.
///
/// A largest value of zero is treated as not found.
pub fn extract_charge_amount(text: &str) -> Option<Decimal> {
    ChargeAmountExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximum_value_wins() {
        let text = "충전량 45.5kWh\n기본 40kWh\n";
        assert_eq!(extract_charge_amount(text), Some(Decimal::new(455, 1)));
    }

    #[test]
    fn test_unit_is_case_insensitive_and_spacing_optional() {
        assert_eq!(extract_charge_amount("22.78 KWH"), Some(Decimal::new(2278, 2)));
        assert_eq!(extract_charge_amount("30kwh"), Some(Decimal::from(30)));
    }

    #[test]
    fn test_no_unit_no_amount() {
        assert_eq!(extract_charge_amount("45.5 kW 출력"), None);
        assert_eq!(extract_charge_amount(""), None);
    }

    #[test]
    fn test_zero_is_not_found() {
        assert_eq!(extract_charge_amount("0 kWh"), None);
    }

    #[test]
    fn test_out_of_range_candidate_is_skipped() {
        let text = "999999999999999999999999999999999 kWh\n12.5 kWh\n";
        let all = ChargeAmountExtractor::new().extract_all(text);
        assert_eq!(all.len(), 1);
        assert_eq!(extract_charge_amount(text), Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_extract_all_positions() {
        let all = ChargeAmountExtractor::new().extract_all("a 10kWh b 20 kWh");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].position, Some((2, 7)));
        assert_eq!(all[1].source, "20 kWh");
    }
}
