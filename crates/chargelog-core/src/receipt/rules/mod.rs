//! Rule-based field extractors for charging receipts.

pub mod charger;
pub mod cost;
pub mod dates;
pub mod energy;
pub mod location;
pub mod patterns;

pub use charger::{extract_charger_type, ChargerTypeExtractor};
pub use cost::{extract_total_cost, parse_grouped_amount, TotalCostExtractor};
pub use dates::{extract_date, DateExtractor};
pub use energy::{extract_charge_amount, ChargeAmountExtractor};
pub use location::{extract_location, LocationExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidate occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A candidate value together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
