//! Common regex patterns and keyword tables for charging receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Smallest amount accepted as a session total (currency units).
pub const MIN_TOTAL_COST: u64 = 100;

/// Largest amount accepted as a session total (currency units).
pub const MAX_TOTAL_COST: u64 = 1_000_000;

/// Confidence at which a parse is applied without an extra warning (2 of 5 fields).
pub const RELIABLE_CONFIDENCE: f32 = 0.4;

/// Location fallback: the first line must be longer than this many characters...
pub const LOCATION_FALLBACK_MIN_CHARS: usize = 2;

/// ...and shorter than this many.
pub const LOCATION_FALLBACK_MAX_CHARS: usize = 50;

/// Keywords marking the line that names the charging site, in priority order.
/// Matched case-sensitively.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "슈퍼차저",
    "충전소",
    "충전기",
    "스테이션",
    "Supercharger",
    "Station",
];

/// Supercharger keywords (matched against lowercased text).
pub const SUPERCHARGER_KEYWORDS: &[&str] = &["슈퍼차저", "supercharger", "super charger"];

/// Fast (DC) charger keywords (matched against lowercased text).
pub const FAST_CHARGER_KEYWORDS: &[&str] = &["급속", "dc", "fast"];

/// Slow (AC) charger keywords (matched against lowercased text).
pub const SLOW_CHARGER_KEYWORDS: &[&str] = &["완속", "slow", "ac"];

lazy_static! {
    // 2024-03-15, 2024.03.15, 2024/03/15, 2024년 3월 15일
    pub static ref DATE_YMD: Regex = Regex::new(
        r"([0-9]{4})[-./년]\s*([0-9]{1,2})[-./월]\s*([0-9]{1,2})일?"
    ).unwrap();

    // 3월 15일 (no year)
    pub static ref DATE_MONTH_DAY: Regex = Regex::new(
        r"([0-9]{1,2})월\s*([0-9]{1,2})일"
    ).unwrap();

    // 40kWh, 40 kWh, 40.5KWH
    pub static ref ENERGY_KWH: Regex = Regex::new(
        r"(?i)([0-9]+(?:\.[0-9]+)?)\s*kwh"
    ).unwrap();

    // 18,500원, ₩18,500, 18,500
    pub static ref COST_WON: Regex = Regex::new(
        r"₩?\s*([0-9]{1,3}(?:,[0-9]{3})*)\s*원?"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_ymd_separators() {
        for text in ["2024-03-15", "2024.03.15", "2024/03/15", "2024년 3월 15일"] {
            let caps = DATE_YMD.captures(text).unwrap();
            assert_eq!(&caps[1], "2024", "{}", text);
            assert_eq!(caps[2].parse::<u32>().unwrap(), 3, "{}", text);
            assert_eq!(&caps[3], "15", "{}", text);
        }
    }

    #[test]
    fn test_cost_pattern_groups_separated_digits() {
        let values: Vec<&str> = COST_WON
            .captures_iter("합계 18,500원")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(values, vec!["18,500"]);
    }
}
