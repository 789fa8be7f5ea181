//! Stored charge records and the editable draft they are built from.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::models::analysis::VisionAnalysis;
use crate::models::receipt::{ChargerType, ParsedReceipt};

/// Draft default: energy per session, kWh.
pub const DEFAULT_CHARGE_AMOUNT: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Draft default: price per kWh.
pub const DEFAULT_UNIT_PRICE: Decimal = Decimal::from_parts(300, 0, 0, false, 0);

/// A recorded charging session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRecord {
    /// Record identifier.
    pub id: String,

    /// Session time (ISO 8601 on the wire).
    pub date: DateTime<Utc>,

    /// Charging site.
    pub location: String,

    /// Charger speed class.
    pub charger_type: ChargerType,

    /// Energy delivered, kWh.
    pub charge_amount: Decimal,

    /// Price per kWh.
    pub unit_price: Decimal,

    /// Session total.
    pub total_cost: Decimal,

    /// Battery level after charging, percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<u8>,
}

/// A charge record being edited before it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDraft {
    pub date: DateTime<Utc>,
    pub location: String,
    pub charger_type: ChargerType,
    pub charge_amount: Decimal,
    pub unit_price: Decimal,
    pub battery_percent: Option<u8>,
}

impl ChargeDraft {
    /// Create a draft with the default values, dated `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            date: now,
            location: String::new(),
            charger_type: ChargerType::Fast,
            charge_amount: DEFAULT_CHARGE_AMOUNT,
            unit_price: DEFAULT_UNIT_PRICE,
            battery_percent: None,
        }
    }

    /// Start a draft from an existing record, for editing.
    pub fn from_record(record: &ChargeRecord) -> Self {
        Self {
            date: record.date,
            location: record.location.clone(),
            charger_type: record.charger_type,
            charge_amount: record.charge_amount,
            unit_price: record.unit_price,
            battery_percent: record.battery_percent,
        }
    }

    /// Copy every field the parser found onto the draft.
    ///
    /// The receipt's total cost is not copied; the draft derives it.
    pub fn apply_receipt(&mut self, receipt: &ParsedReceipt) {
        if let Some(date) = receipt.date {
            self.date = date.and_utc();
        }
        if let Some(location) = &receipt.location {
            self.location = location.clone();
        }
        if let Some(charger_type) = receipt.charger_type {
            self.charger_type = charger_type;
        }
        if let Some(amount) = receipt.charge_amount {
            self.charge_amount = amount;
        }
        if let Some(price) = receipt.unit_price {
            self.unit_price = price;
        }
    }

    /// Copy every field the vision model reported onto the draft.
    pub fn apply_analysis(&mut self, analysis: &VisionAnalysis) {
        self.apply_receipt(&analysis.to_parsed_receipt());
        if let Some(percent) = analysis.battery_percent {
            self.battery_percent = Some(percent);
        }
    }

    /// `round(charge_amount * unit_price)`, or `None` when the product does
    /// not fit a `Decimal`.
    pub fn total_cost(&self) -> Option<Decimal> {
        self.charge_amount
            .checked_mul(self.unit_price)
            .map(|cost| cost.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Validate the draft and turn it into a record.
    pub fn into_record(self, id: impl Into<String>) -> Result<ChargeRecord, RecordError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(RecordError::EmptyLocation);
        }
        if self.charge_amount.is_sign_negative() {
            return Err(RecordError::InvalidValue {
                field: "charge_amount".to_string(),
                value: self.charge_amount.to_string(),
            });
        }
        if self.unit_price.is_sign_negative() {
            return Err(RecordError::InvalidValue {
                field: "unit_price".to_string(),
                value: self.unit_price.to_string(),
            });
        }
        if let Some(percent) = self.battery_percent.filter(|p| *p > 100) {
            return Err(RecordError::InvalidValue {
                field: "battery_percent".to_string(),
                value: percent.to_string(),
            });
        }
        let total_cost = self.total_cost().ok_or_else(|| RecordError::InvalidValue {
            field: "total_cost".to_string(),
            value: format!("{} x {}", self.charge_amount, self.unit_price),
        })?;

        Ok(ChargeRecord {
            id: id.into(),
            date: self.date,
            location: location.to_string(),
            charger_type: self.charger_type,
            charge_amount: self.charge_amount,
            unit_price: self.unit_price,
            total_cost,
            battery_percent: self.battery_percent,
        })
    }
}
