//! Date extraction for charging receipts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Captures;

use super::patterns::{DATE_MONTH_DAY, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Year-less dates (`3월 15일`) are placed in `reference_year`.
pub struct DateExtractor {
    reference_year: i32,
}

impl DateExtractor {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    fn full_date(caps: &Captures<'_>) -> Option<ExtractionMatch<NaiveDateTime>> {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        Self::to_match(caps, year, month, day)
    }

    fn month_day(&self, caps: &Captures<'_>) -> Option<ExtractionMatch<NaiveDateTime>> {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        Self::to_match(caps, self.reference_year, month, day)
    }

    fn to_match(
        caps: &Captures<'_>,
        year: i32,
        month: u32,
        day: u32,
    ) -> Option<ExtractionMatch<NaiveDateTime>> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(date.and_time(NaiveTime::MIN), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDateTime>;

    /// First full date wins; only when it is missing or not a real calendar
    /// date is the first year-less date tried.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(found) = DATE_YMD.captures(text).and_then(|caps| Self::full_date(&caps)) {
            return Some(found);
        }

        DATE_MONTH_DAY
            .captures(text)
            .and_then(|caps| self.month_day(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = DATE_YMD
            .captures_iter(text)
            .filter_map(|caps| Self::full_date(&caps))
            .collect();

        for caps in DATE_MONTH_DAY.captures_iter(text) {
            if let Some(found) = self.month_day(&caps) {
                // "2024년 3월 15일" also matches the year-less pattern
                if results.iter().any(|r| r.value == found.value) {
                    continue;
                }
                results.push(found);
            }
        }

        results
    }
}

/// Extract the charging date from receipt text.
pub fn extract_date(text: &str, reference_year: i32) -> Option<NaiveDateTime> {
    DateExtractor::new(reference_year)
        .extract(text)
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_extract_date_iso() {
        assert_eq!(extract_date("충전일시 2024-03-15 14:30", 2030), Some(midnight(2024, 3, 15)));
    }

    #[test]
    fn test_extract_date_dotted_and_slashed() {
        assert_eq!(extract_date("2023.10.25", 2030), Some(midnight(2023, 10, 25)));
        assert_eq!(extract_date("2023/10/5", 2030), Some(midnight(2023, 10, 5)));
    }

    #[test]
    fn test_extract_date_korean_full() {
        assert_eq!(extract_date("2023년 10월 25일 결제", 2030), Some(midnight(2023, 10, 25)));
    }

    #[test]
    fn test_extract_date_month_day_uses_reference_year() {
        assert_eq!(extract_date("10월 25일 충전", 2026), Some(midnight(2026, 10, 25)));
    }

    #[test]
    fn test_first_full_date_wins() {
        let text = "시작 2024-03-15\n종료 2024-03-16";
        assert_eq!(extract_date(text, 2030), Some(midnight(2024, 3, 15)));
    }

    #[test]
    fn test_invalid_full_date_falls_back_to_month_day() {
        assert_eq!(extract_date("2024-13-45 / 4월 2일", 2025), Some(midnight(2025, 4, 2)));
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_date("충전 완료", 2025), None);
        assert_eq!(extract_date("", 2025), None);
    }

    #[test]
    fn test_extract_all_skips_duplicate_month_day() {
        let extractor = DateExtractor::new(2023);
        let all = extractor.extract_all("2023년 10월 25일");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source, "2023년 10월 25일");
    }
}
