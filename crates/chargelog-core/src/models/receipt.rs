//! Parsed receipt model and charger types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Number of fields the receipt parser searches for.
///
/// `unit_price` is derived, so it is not part of the count.
pub const SEARCHED_FIELD_COUNT: usize = 5;

/// Charging speed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerType {
    /// Slow AC charger (완속).
    #[serde(alias = "완속")]
    Slow,
    /// Fast DC charger (급속).
    #[serde(alias = "급속")]
    Fast,
    /// Tesla Supercharger (슈퍼차저).
    #[serde(alias = "슈퍼차저")]
    Supercharger,
}

impl ChargerType {
    /// All charger types, slowest first.
    pub const ALL: [ChargerType; 3] = [
        ChargerType::Slow,
        ChargerType::Fast,
        ChargerType::Supercharger,
    ];

    /// English identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargerType::Slow => "slow",
            ChargerType::Fast => "fast",
            ChargerType::Supercharger => "supercharger",
        }
    }

    /// Label as printed on Korean receipts and charger screens.
    pub fn label(&self) -> &'static str {
        match self {
            ChargerType::Slow => "완속",
            ChargerType::Fast => "급속",
            ChargerType::Supercharger => "슈퍼차저",
        }
    }
}

impl FromStr for ChargerType {
    type Err = RecordError;

    /// Parse a charger type from its identifier or locale label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow" | "완속" => Ok(ChargerType::Slow),
            "fast" | "급속" => Ok(ChargerType::Fast),
            "supercharger" | "슈퍼차저" => Ok(ChargerType::Supercharger),
            _ => Err(RecordError::UnknownChargerType(s.to_string())),
        }
    }
}

impl fmt::Display for ChargerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field the receipt parser searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptField {
    Date,
    Location,
    ChargeAmount,
    TotalCost,
    ChargerType,
}

impl fmt::Display for ReceiptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReceiptField::Date => "date",
            ReceiptField::Location => "location",
            ReceiptField::ChargeAmount => "charge amount",
            ReceiptField::TotalCost => "total cost",
            ReceiptField::ChargerType => "charger type",
        };
        f.write_str(name)
    }
}

/// Structured result of parsing one receipt.
///
/// Every field except `confidence` and `raw_text` is optional: a parse never
/// fails, it only finds fewer fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReceipt {
    /// Charging date (midnight when the receipt shows no time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,

    /// Charging site as printed on the receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Energy delivered, kWh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<Decimal>,

    /// Price per kWh, derived from `total_cost / charge_amount`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Session total in currency units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<u64>,

    /// Charger speed class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_type: Option<ChargerType>,

    /// Fraction of searched-for fields that were found (0.0 - 1.0).
    pub confidence: f32,

    /// The text the receipt was parsed from.
    pub raw_text: String,
}

impl ParsedReceipt {
    /// Create an empty result for the given text.
    pub fn empty(raw_text: impl Into<String>) -> Self {
        Self {
            date: None,
            location: None,
            charge_amount: None,
            unit_price: None,
            total_cost: None,
            charger_type: None,
            confidence: 0.0,
            raw_text: raw_text.into(),
        }
    }

    /// Searched-for fields that are present.
    pub fn found_fields(&self) -> Vec<ReceiptField> {
        self.field_presence()
            .into_iter()
            .filter_map(|(field, present)| present.then_some(field))
            .collect()
    }

    /// Searched-for fields that are absent.
    pub fn missing_fields(&self) -> Vec<ReceiptField> {
        self.field_presence()
            .into_iter()
            .filter_map(|(field, present)| (!present).then_some(field))
            .collect()
    }

    /// Recompute `confidence` from the fields currently present.
    pub fn update_confidence(&mut self) {
        self.confidence = self.found_fields().len() as f32 / SEARCHED_FIELD_COUNT as f32;
    }

    /// Whether the result is complete enough to apply without an extra warning.
    pub fn is_reliable(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    fn field_presence(&self) -> [(ReceiptField, bool); SEARCHED_FIELD_COUNT] {
        [
            (ReceiptField::Date, self.date.is_some()),
            (ReceiptField::Location, self.location.is_some()),
            (ReceiptField::ChargeAmount, self.charge_amount.is_some()),
            (ReceiptField::TotalCost, self.total_cost.is_some()),
            (ReceiptField::ChargerType, self.charger_type.is_some()),
        ]
    }
}
