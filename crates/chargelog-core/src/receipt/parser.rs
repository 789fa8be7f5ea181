//! Rule-based receipt parser combining the field extractors.

use chrono::{Datelike, Local};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::receipt::ParsedReceipt;

use super::rules::{
    ChargeAmountExtractor, ChargerTypeExtractor, DateExtractor, FieldExtractor,
    LocationExtractor, TotalCostExtractor, MAX_TOTAL_COST, MIN_TOTAL_COST,
};
use super::ReceiptTextParser;

/// Receipt parser running the five field extractors independently.
#[derive(Debug, Clone)]
pub struct ReceiptParser {
    /// Year given to dates printed without one.
    reference_year: i32,
    /// Smallest accepted session total.
    min_total_cost: u64,
    /// Largest accepted session total.
    max_total_cost: u64,
}

impl ReceiptParser {
    /// Create a parser with default bounds, using the current local year for
    /// year-less dates.
    pub fn new() -> Self {
        Self {
            reference_year: Local::now().year(),
            min_total_cost: MIN_TOTAL_COST,
            max_total_cost: MAX_TOTAL_COST,
        }
    }

    /// Create a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_cost_bounds(config.min_total_cost, config.max_total_cost)
    }

    /// Set the year used for dates printed without one.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Set the inclusive range of accepted session totals.
    pub fn with_cost_bounds(mut self, min: u64, max: u64) -> Self {
        self.min_total_cost = min;
        self.max_total_cost = max;
        self
    }
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptTextParser for ReceiptParser {
    fn parse(&self, text: &str) -> ParsedReceipt {
        info!("Parsing receipt from {} characters of text", text.len());

        let mut result = ParsedReceipt::empty(text);

        result.date = DateExtractor::new(self.reference_year)
            .extract(text)
            .map(|m| {
                debug!("Date {} from {:?}", m.value, m.source);
                m.value
            });

        result.location = LocationExtractor::new().extract(text).map(|m| {
            debug!("Location {:?} (matched {:?})", m.value, m.source);
            m.value
        });

        result.charge_amount = ChargeAmountExtractor::new().extract(text).map(|m| {
            debug!("Charge amount {} kWh from {:?}", m.value, m.source);
            m.value
        });

        result.total_cost = TotalCostExtractor::new()
            .with_bounds(self.min_total_cost, self.max_total_cost)
            .extract(text)
            .map(|m| {
                debug!("Total cost {} from {:?}", m.value, m.source);
                m.value
            });

        result.charger_type = ChargerTypeExtractor::new().extract(text).map(|m| {
            debug!("Charger type {} (keyword {:?})", m.value, m.source);
            m.value
        });

        if let (Some(amount), Some(cost)) = (result.charge_amount, result.total_cost) {
            result.unit_price = derive_unit_price(cost, amount);
            if result.unit_price.is_none() {
                warn!("Unit price for {} / {} kWh is out of range", cost, amount);
            }
        }

        result.update_confidence();

        let missing = result.missing_fields();
        if !missing.is_empty() {
            debug!(
                "Missing fields: {}",
                missing.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
            );
        }
        debug!("Parsed receipt with confidence {:.2}", result.confidence);

        result
    }
}

/// `round(total_cost / charge_amount)`, half away from zero.
///
/// `None` for a zero amount or when the quotient does not fit a `Decimal`.
pub fn derive_unit_price(total_cost: u64, charge_amount: Decimal) -> Option<Decimal> {
    if charge_amount.is_zero() {
        return None;
    }
    Decimal::from(total_cost)
        .checked_div(charge_amount)
        .map(|price| price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ChargerType;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn parser() -> ReceiptParser {
        ReceiptParser::new().with_reference_year(2024)
    }

    #[test]
    fn test_parse_full_receipt() {
        let text = "환경부 강남 급속충전소\n\
                    충전일시 2024-03-15 14:30\n\
                    충전량 45.5kWh\n\
                    기본 40kWh\n\
                    할인 500원\n\
                    결제금액 18,500원\n";

        let result = parser().parse(text);

        assert_eq!(
            result.date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_time(NaiveTime::MIN))
        );
        assert_eq!(result.location.as_deref(), Some("환경부 강남 급속충전소"));
        assert_eq!(result.charge_amount, Some(Decimal::new(455, 1)));
        assert_eq!(result.total_cost, Some(18_500));
        assert_eq!(result.charger_type, Some(ChargerType::Fast));
        // 18500 / 45.5 = 406.59...
        assert_eq!(result.unit_price, Some(Decimal::from(407)));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.raw_text, text);
    }

    #[test]
    fn test_parse_empty_text() {
        let result = parser().parse("");

        assert_eq!(result, ParsedReceipt::empty(""));
        assert_eq!(result.confidence, 0.0);
        assert!(result.missing_fields().len() == 5);
    }

    #[test]
    fn test_unit_price_requires_both_fields() {
        let only_cost = parser().parse("합계 18,500원");
        assert_eq!(only_cost.total_cost, Some(18_500));
        assert_eq!(only_cost.charge_amount, None);
        assert_eq!(only_cost.unit_price, None);

        let only_amount = parser().parse("45 kWh");
        assert_eq!(only_amount.charge_amount, Some(Decimal::from(45)));
        assert_eq!(only_amount.unit_price, None);
    }

    #[test]
    fn test_confidence_is_found_fields_over_five() {
        let cases = [
            ("", 0.0),
            ("급속", 0.2),
            ("급속\n3월 15일", 0.4),
            ("테슬라 슈퍼차저 하남\n3월 15일", 0.6),
            // the year "2024" also yields a 202 cost candidate
            ("테슬라 슈퍼차저 하남\n2024-03-15", 0.8),
        ];
        for (text, expected) in cases {
            let result = parser().parse(text);
            assert_eq!(result.confidence, expected, "{:?}", text);
            assert_eq!(
                result.confidence,
                result.found_fields().len() as f32 / 5.0,
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_supercharger_over_fast() {
        let result = parser().parse("슈퍼차저 급속 충전");
        assert_eq!(result.charger_type, Some(ChargerType::Supercharger));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "Downtown Station\n10월 25일\n22.78 kWh\n₩7,908\nDC";
        let first = parser().parse(text);
        let second = parser().parse(text);
        assert_eq!(first, second);
        assert_eq!(
            first.date,
            Some(NaiveDate::from_ymd_opt(2024, 10, 25).unwrap().and_time(NaiveTime::MIN))
        );
        // 7908 / 22.78 = 347.15...
        assert_eq!(first.unit_price, Some(Decimal::from(347)));
    }

    #[test]
    fn test_custom_cost_bounds() {
        let parser = parser().with_cost_bounds(1_000, 10_000);
        let result = parser.parse("500원 9,000원 15,000원");
        assert_eq!(result.total_cost, Some(9_000));
    }

    #[test]
    fn test_derive_unit_price_rounding() {
        assert_eq!(derive_unit_price(1_000, Decimal::from(8)), Some(Decimal::from(125)));
        // 1000 / 16 = 62.5 rounds up
        assert_eq!(derive_unit_price(1_000, Decimal::from(16)), Some(Decimal::from(63)));
        assert_eq!(derive_unit_price(1_000, Decimal::ZERO), None);
    }
}
