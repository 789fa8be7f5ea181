//! Vision-model analysis of a receipt or charger screen photo.
//!
//! The model call itself lives outside this crate; this module only holds the
//! JSON contract of its answer and the mapping onto a [`ParsedReceipt`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::models::receipt::{ChargerType, ParsedReceipt};
use crate::receipt::derive_unit_price;

/// What the photographed image shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    /// Charger display (KEPCO, 환경부, ...).
    ChargerScreen,
    /// Vehicle dashboard or infotainment screen.
    VehicleScreen,
    /// Printed receipt.
    PaperReceipt,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Charging state shown in the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingStatus {
    Completed,
    InProgress,
    NotStarted,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Structured answer of the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    #[serde(default)]
    pub image_type: ImageType,

    /// Whether the image can serve as a charging receipt.
    #[serde(default)]
    pub is_valid: bool,

    #[serde(default)]
    pub charging_status: ChargingStatus,

    /// `None` when the model answered "unknown".
    #[serde(default, deserialize_with = "known_charger_type")]
    pub charger_type: Option<ChargerType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Local date-time shown on the screen (`2024-10-25T14:30:00`).
    #[serde(
        default,
        deserialize_with = "lenient_date_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<u8>,

    /// Elapsed charging time, `HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<String>,

    /// Remaining charging time, `HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<String>,

    /// The model's explanation of its answer.
    #[serde(default)]
    pub reasoning: String,

    /// The model's own confidence (0.0 - 1.0).
    #[serde(default)]
    pub confidence: f32,
}

fn known_charger_type<'de, D>(deserializer: D) -> Result<Option<ChargerType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Accepts `2024-10-25T14:30:00`, an RFC 3339 timestamp (its local part is
/// kept), or a bare `2024-10-25`. Anything else reads as no date.
fn lenient_date_time<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();

    let parsed = raw
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            raw.parse::<NaiveDate>()
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        });

    if parsed.is_none() {
        debug!("Ignoring unreadable analysis date {:?}", raw);
    }
    Ok(parsed)
}

impl VisionAnalysis {
    /// Parse a raw model response.
    ///
    /// The JSON object may be wrapped in prose or a markdown code fence; the
    /// span from the first `{` to the last `}` is decoded.
    pub fn from_response(response: &str) -> Result<Self, AnalysisError> {
        let start = response.find('{').ok_or(AnalysisError::NoJson)?;
        let end = response.rfind('}').ok_or(AnalysisError::NoJson)?;
        if end < start {
            return Err(AnalysisError::NoJson);
        }

        let analysis: Self = serde_json::from_str(&response[start..=end])?;
        debug!(
            "Vision analysis: {:?}, valid={}, status={:?}, confidence={:.2}",
            analysis.image_type, analysis.is_valid, analysis.charging_status, analysis.confidence
        );
        Ok(analysis)
    }

    /// Whether the image can be used as a charging receipt.
    pub fn is_usable(&self) -> bool {
        self.is_valid
    }

    /// Express the analysis in the same shape as a text parse.
    ///
    /// Confidence is the model's own score; a missing unit price is derived
    /// the same way the text parser derives it.
    pub fn to_parsed_receipt(&self) -> ParsedReceipt {
        let total_cost = self
            .total_cost
            .filter(|c| !c.is_sign_negative())
            .and_then(|c| c.round().to_u64());
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let unit_price = self.unit_price.or_else(|| match (self.charge_amount, total_cost) {
            (Some(amount), Some(cost)) => derive_unit_price(cost, amount),
            _ => None,
        });

        ParsedReceipt {
            date: self.date,
            location,
            charge_amount: self.charge_amount,
            unit_price,
            total_cost,
            charger_type: self.charger_type,
            confidence: self.confidence.clamp(0.0, 1.0),
            raw_text: self.reasoning.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESPONSE: &str = r#"분석 결과입니다:
```json
{
  "imageType": "charger_screen",
  "isValid": true,
  "chargingStatus": "completed",
  "chargerType": "급속",
  "location": "환경부 급속충전소",
  "rawScreenDate": "24.10.25",
  "date": "2024-10-25T14:30:00",
  "chargeAmount": 22.78,
  "unitPrice": 347.3,
  "totalCost": 7908,
  "batteryPercent": 90,
  "elapsedTime": "00:25:30",
  "reasoning": "충전 완료 화면입니다.",
  "confidence": 0.95
}
```"#;

    #[test]
    fn test_from_response_strips_wrapping() {
        let analysis = VisionAnalysis::from_response(RESPONSE).unwrap();

        assert_eq!(analysis.image_type, ImageType::ChargerScreen);
        assert!(analysis.is_usable());
        assert_eq!(analysis.charging_status, ChargingStatus::Completed);
        assert_eq!(analysis.charger_type, Some(ChargerType::Fast));
        assert_eq!(analysis.battery_percent, Some(90));
        assert_eq!(
            analysis.date,
            NaiveDate::from_ymd_opt(2024, 10, 25).unwrap().and_hms_opt(14, 30, 0)
        );
    }

    #[test]
    fn test_to_parsed_receipt() {
        let receipt = VisionAnalysis::from_response(RESPONSE)
            .unwrap()
            .to_parsed_receipt();

        assert_eq!(receipt.location.as_deref(), Some("환경부 급속충전소"));
        assert_eq!(receipt.total_cost, Some(7_908));
        assert_eq!(receipt.unit_price, Some(Decimal::new(3473, 1)));
        assert_eq!(receipt.confidence, 0.95);
        assert_eq!(receipt.raw_text, "충전 완료 화면입니다.");
    }

    #[test]
    fn test_unknown_values() {
        let analysis = VisionAnalysis::from_response(
            r#"{"imageType": "selfie", "isValid": false, "chargingStatus": "unknown",
                "chargerType": "unknown", "reasoning": "차량 내부 화면", "confidence": 0.7}"#,
        )
        .unwrap();

        assert_eq!(analysis.image_type, ImageType::Unknown);
        assert_eq!(analysis.charger_type, None);
        assert!(!analysis.is_usable());
        assert_eq!(analysis.to_parsed_receipt().found_fields().len(), 0);
    }

    #[test]
    fn test_missing_unit_price_is_derived() {
        let analysis = VisionAnalysis::from_response(
            r#"{"chargeAmount": 40, "totalCost": 14000, "chargerType": null}"#,
        )
        .unwrap();
        assert_eq!(analysis.to_parsed_receipt().unit_price, Some(Decimal::from(350)));
    }

    #[test]
    fn test_date_formats() {
        let parse = |date: &str| {
            VisionAnalysis::from_response(&format!(r#"{{"date": "{}"}}"#, date))
                .unwrap()
                .date
        };
        let expected = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();

        assert_eq!(parse("2025-12-24T14:39:00"), expected.and_hms_opt(14, 39, 0));
        assert_eq!(parse("2025-12-24T14:39:00+09:00"), expected.and_hms_opt(14, 39, 0));
        assert_eq!(parse("2025-12-24"), expected.and_hms_opt(0, 0, 0));
        assert_eq!(parse("25.12.24"), None);
    }

    #[test]
    fn test_no_json() {
        assert!(matches!(
            VisionAnalysis::from_response("I cannot read this image."),
            Err(AnalysisError::NoJson)
        ));
        assert!(matches!(
            VisionAnalysis::from_response("} nothing {"),
            Err(AnalysisError::NoJson)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            VisionAnalysis::from_response("{ not json }"),
            Err(AnalysisError::Json(_))
        ));
    }
}
