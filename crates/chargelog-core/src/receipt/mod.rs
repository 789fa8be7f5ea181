//! Charging receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{derive_unit_price, ReceiptParser};

use crate::models::receipt::ParsedReceipt;

/// Trait for receipt parsers.
///
/// Parsing is infallible: text that yields nothing produces an empty result
/// with zero confidence.
pub trait ReceiptTextParser {
    /// Parse a receipt from OCR text.
    fn parse(&self, text: &str) -> ParsedReceipt;
}
