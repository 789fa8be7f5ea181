//! Core library for EV charging logs.
//!
//! This crate provides:
//! - Rule-based field extraction from OCR'd charging receipts (date, site,
//!   kWh, total cost, charger type) with a field-count confidence
//! - The JSON contract of a vision-model receipt analysis
//! - Charge records and the editable draft they are saved from
//! - Location statistics (favorites, recents, cheapest site) and spending
//!   statistics (monthly trend, charger types, weekdays)

pub mod error;
pub mod models;
pub mod receipt;
pub mod stats;

pub use error::{AnalysisError, ChargelogError, RecordError, Result};
pub use models::analysis::{ChargingStatus, ImageType, VisionAnalysis};
pub use models::config::ChargelogConfig;
pub use models::receipt::{ChargerType, ParsedReceipt, ReceiptField};
pub use models::record::{ChargeDraft, ChargeRecord};
pub use receipt::{ReceiptParser, ReceiptTextParser};
pub use stats::{ChargeStats, LocationStatsEngine};
