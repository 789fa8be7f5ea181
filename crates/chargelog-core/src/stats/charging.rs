//! Spending and usage statistics over charge records.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::StatsConfig;
use crate::models::receipt::ChargerType;
use crate::models::record::ChargeRecord;

use super::saturating_sum;

/// Months covered by the spending trend.
pub const DEFAULT_TREND_MONTHS: u32 = 6;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub total_cost: Decimal,
    pub total_charge: Decimal,
    pub charge_count: usize,
}

/// One point of the spending trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub total_cost: Decimal,
    pub total_charge: Decimal,
    pub charge_count: usize,
}

/// Share of sessions on one charger type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerTypeShare {
    pub charger_type: ChargerType,
    pub count: usize,
    pub percentage: f64,
}

/// Sessions per weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayPattern {
    pub weekday: Weekday,
    pub total_count: usize,
    /// Sessions per week over the span of the records.
    pub average_count: f64,
}

/// Headline numbers over all records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    pub total_charge_count: usize,
    pub total_spent: Decimal,
    pub total_charge_amount: Decimal,
    pub average_charge_cost: Decimal,
    pub most_used_location: Option<String>,
    pub monthly_average_cost: Decimal,
}

/// Everything the statistics view shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub monthly_trend: Vec<MonthlyTrend>,
    pub charger_types: Vec<ChargerTypeShare>,
    pub weekdays: Vec<WeekdayPattern>,
    pub detailed: DetailedStats,
}

/// Statistics calculator.
#[derive(Debug, Clone)]
pub struct ChargeStats {
    trend_months: u32,
}

impl ChargeStats {
    pub fn new() -> Self {
        Self {
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }

    pub fn from_config(config: &StatsConfig) -> Self {
        Self {
            trend_months: config.trend_months,
        }
    }

    pub fn with_trend_months(mut self, months: u32) -> Self {
        self.trend_months = months;
        self
    }

    /// Compute every statistic in the time zone of `now`.
    pub fn report(&self, records: &[ChargeRecord], now: DateTime<FixedOffset>) -> StatsReport {
        info!("Computing statistics over {} records", records.len());

        StatsReport {
            monthly_trend: monthly_trend(records, now, self.trend_months),
            charger_types: charger_type_distribution(records),
            weekdays: weekday_pattern(records, *now.offset()),
            detailed: detailed_stats(records),
        }
    }
}

impl Default for ChargeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Monthly totals for the `months` calendar months ending with the month of
/// `now`, oldest first. Records outside that window are ignored.
pub fn monthly_trend(
    records: &[ChargeRecord],
    now: DateTime<FixedOffset>,
    months: u32,
) -> Vec<MonthlyTrend> {
    if records.is_empty() {
        return Vec::new();
    }

    let offset = *now.offset();
    let current = now.year() * 12 + now.month0() as i32;

    (0..months as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            let (year, month) = (index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
            let summary = monthly_summary(records, year, month, offset);

            MonthlyTrend {
                month: format!("{:04}-{:02}", year, month),
                total_cost: summary.total_cost,
                total_charge: summary.total_charge,
                charge_count: summary.charge_count,
            }
        })
        .collect()
}

/// Totals for the records whose local date (at `offset`) falls in `year` /
/// `month`. A month without records gives zero totals.
pub fn monthly_summary(
    records: &[ChargeRecord],
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> MonthlySummary {
    let in_month: Vec<&ChargeRecord> = records
        .iter()
        .filter(|r| {
            let local = r.date.with_timezone(&offset);
            local.year() == year && local.month() == month
        })
        .collect();

    MonthlySummary {
        year,
        month,
        total_cost: saturating_sum(in_month.iter().map(|r| r.total_cost)),
        total_charge: saturating_sum(in_month.iter().map(|r| r.charge_amount)),
        charge_count: in_month.len(),
    }
}

/// Session count and share per charger type, most used first.
pub fn charger_type_distribution(records: &[ChargeRecord]) -> Vec<ChargerTypeShare> {
    if records.is_empty() {
        return Vec::new();
    }

    let total = records.len();
    let mut shares: Vec<ChargerTypeShare> = ChargerType::ALL
        .iter()
        .map(|&charger_type| {
            let count = records
                .iter()
                .filter(|r| r.charger_type == charger_type)
                .count();
            ChargerTypeShare {
                charger_type,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            }
        })
        .filter(|share| share.count > 0)
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Sessions per weekday, Monday first, with weekly averages over the span
/// between the earliest and latest record.
pub fn weekday_pattern(records: &[ChargeRecord], offset: FixedOffset) -> Vec<WeekdayPattern> {
    let Some(span) = span_days(records) else {
        return Vec::new();
    };

    let mut counts = [0usize; 7];
    for record in records {
        let day = record.date.with_timezone(&offset).weekday();
        counts[day.num_days_from_monday() as usize] += 1;
    }

    let weeks = (span / 7.0).max(1.0);
    debug!("Weekday pattern over {:.1} weeks", weeks);

    WEEK.iter()
        .zip(counts)
        .map(|(&weekday, total_count)| WeekdayPattern {
            weekday,
            total_count,
            average_count: total_count as f64 / weeks,
        })
        .collect()
}

/// Totals, averages and the most used location.
///
/// When several locations share the highest count, the one that first
/// appears latest in `records` wins.
pub fn detailed_stats(records: &[ChargeRecord]) -> DetailedStats {
    if records.is_empty() {
        return DetailedStats::default();
    }

    let count = records.len();
    let total_spent = saturating_sum(records.iter().map(|r| r.total_cost));
    let total_charge_amount = saturating_sum(records.iter().map(|r| r.charge_amount));

    let mut order: Vec<&str> = Vec::new();
    let mut visits: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let entry = visits.entry(record.location.as_str()).or_insert_with(|| {
            order.push(record.location.as_str());
            0
        });
        *entry += 1;
    }
    let most_used_location = order
        .into_iter()
        .reduce(|best, next| if visits[best] > visits[next] { best } else { next })
        .map(str::to_string);

    let span_ms = span_millis(records).unwrap_or(0);
    let months = (Decimal::from(span_ms) / Decimal::from(30 * MILLIS_PER_DAY)).max(Decimal::ONE);

    DetailedStats {
        total_charge_count: count,
        total_spent,
        total_charge_amount,
        average_charge_cost: total_spent / Decimal::from(count),
        most_used_location,
        monthly_average_cost: total_spent / months,
    }
}

fn span_millis(records: &[ChargeRecord]) -> Option<i64> {
    let first = records.iter().map(|r| r.date).min()?;
    let last = records.iter().map(|r| r.date).max()?;
    Some((last - first).num_milliseconds())
}

fn span_days(records: &[ChargeRecord]) -> Option<f64> {
    span_millis(records).map(|ms| ms as f64 / MILLIS_PER_DAY as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn record(
        location: &str,
        date: DateTime<Utc>,
        charger_type: ChargerType,
        total_cost: i64,
    ) -> ChargeRecord {
        ChargeRecord {
            id: format!("{}-{}", location, date.timestamp()),
            date,
            location: location.to_string(),
            charger_type,
            charge_amount: Decimal::from(40),
            unit_price: Decimal::from(total_cost / 40),
            total_cost: Decimal::from(total_cost),
            battery_percent: None,
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_monthly_trend_window() {
        let records = vec![
            record("A", utc(2024, 6, 1, 3), ChargerType::Fast, 12_000),
            record("A", utc(2024, 6, 10, 3), ChargerType::Fast, 8_000),
            record("B", utc(2024, 1, 20, 3), ChargerType::Slow, 4_000),
            // outside the window
            record("C", utc(2023, 12, 31, 3), ChargerType::Slow, 9_999),
        ];
        let trend = monthly_trend(&records, now(), 6);

        let months: Vec<&str> = trend.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
        );
        assert_eq!(trend[0].charge_count, 1);
        assert_eq!(trend[0].total_cost, Decimal::from(4_000));
        assert_eq!(trend[5].charge_count, 2);
        assert_eq!(trend[5].total_cost, Decimal::from(20_000));
        assert_eq!(trend[5].total_charge, Decimal::from(80));
        assert_eq!(trend[2].charge_count, 0);
    }

    #[test]
    fn test_monthly_trend_uses_local_month() {
        // 2024-05-31 20:00 UTC is already June in KST
        let records = vec![record("A", utc(2024, 5, 31, 20), ChargerType::Fast, 1_000)];
        let trend = monthly_trend(&records, now(), 2);
        assert_eq!(trend[0].month, "2024-05");
        assert_eq!(trend[0].charge_count, 0);
        assert_eq!(trend[1].charge_count, 1);
    }

    #[test]
    fn test_monthly_trend_crosses_year() {
        let now = kst().with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let records = vec![record("A", utc(2023, 11, 5, 0), ChargerType::Fast, 1_000)];
        let months: Vec<String> = monthly_trend(&records, now, 4)
            .into_iter()
            .map(|t| t.month)
            .collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_monthly_summary() {
        let records = vec![
            record("A", utc(2024, 3, 2, 3), ChargerType::Fast, 12_000),
            record("B", utc(2024, 3, 20, 3), ChargerType::Slow, 6_000),
            record("A", utc(2024, 4, 1, 3), ChargerType::Fast, 9_000),
            // 2024-02-29 18:00 UTC is March 1st in KST
            record("C", utc(2024, 2, 29, 18), ChargerType::Fast, 1_000),
        ];
        let march = monthly_summary(&records, 2024, 3, kst());

        assert_eq!(march.year, 2024);
        assert_eq!(march.month, 3);
        assert_eq!(march.charge_count, 3);
        assert_eq!(march.total_cost, Decimal::from(19_000));
        assert_eq!(march.total_charge, Decimal::from(120));

        let empty = monthly_summary(&records, 2023, 3, kst());
        assert_eq!(empty.charge_count, 0);
        assert_eq!(empty.total_cost, Decimal::ZERO);
        assert_eq!(monthly_summary(&[], 2024, 3, kst()).charge_count, 0);
    }

    #[test]
    fn test_totals_beyond_decimal_range_saturate() {
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let records: Vec<ChargeRecord> = [utc(2024, 6, 1, 3), utc(2024, 6, 2, 3)]
            .into_iter()
            .map(|date| ChargeRecord {
                total_cost: huge,
                ..record("A", date, ChargerType::Fast, 1_000)
            })
            .collect();

        let trend = monthly_trend(&records, now(), 1);
        assert_eq!(trend[0].total_cost, Decimal::MAX);
        assert_eq!(trend[0].charge_count, 2);

        let stats = detailed_stats(&records);
        assert_eq!(stats.total_spent, Decimal::MAX);
        assert_eq!(stats.most_used_location.as_deref(), Some("A"));
    }

    #[test]
    fn test_charger_type_distribution() {
        let records = vec![
            record("A", utc(2024, 6, 1, 0), ChargerType::Supercharger, 1_000),
            record("A", utc(2024, 6, 2, 0), ChargerType::Fast, 1_000),
            record("A", utc(2024, 6, 3, 0), ChargerType::Fast, 1_000),
            record("A", utc(2024, 6, 4, 0), ChargerType::Fast, 1_000),
        ];
        let shares = charger_type_distribution(&records);

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].charger_type, ChargerType::Fast);
        assert_eq!(shares[0].count, 3);
        assert_eq!(shares[0].percentage, 75.0);
        assert_eq!(shares[1].charger_type, ChargerType::Supercharger);
        assert_eq!(shares[1].percentage, 25.0);
    }

    #[test]
    fn test_distribution_ties_keep_type_order() {
        let records = vec![
            record("A", utc(2024, 6, 1, 0), ChargerType::Supercharger, 1_000),
            record("A", utc(2024, 6, 2, 0), ChargerType::Slow, 1_000),
        ];
        let types: Vec<ChargerType> = charger_type_distribution(&records)
            .into_iter()
            .map(|s| s.charger_type)
            .collect();
        assert_eq!(types, vec![ChargerType::Slow, ChargerType::Supercharger]);
    }

    #[test]
    fn test_weekday_pattern() {
        // 2024-06-03 is a Monday
        let monday = utc(2024, 6, 3, 3);
        let records = vec![
            record("A", monday, ChargerType::Fast, 1_000),
            record("A", monday + Duration::days(7), ChargerType::Fast, 1_000),
            record("A", monday + Duration::days(14), ChargerType::Fast, 1_000),
            record("A", monday + Duration::days(16), ChargerType::Fast, 1_000),
        ];
        let pattern = weekday_pattern(&records, kst());

        assert_eq!(pattern.len(), 7);
        assert_eq!(pattern[0].weekday, Weekday::Mon);
        assert_eq!(pattern[0].total_count, 3);
        assert_eq!(pattern[2].weekday, Weekday::Wed);
        assert_eq!(pattern[2].total_count, 1);
        assert_eq!(pattern[6].weekday, Weekday::Sun);
        // 16 days span = 16/7 weeks
        assert!((pattern[0].average_count - 3.0 / (16.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weekday_average_floor_of_one_week() {
        let records = vec![record("A", utc(2024, 6, 3, 3), ChargerType::Fast, 1_000)];
        let pattern = weekday_pattern(&records, kst());
        assert_eq!(pattern[0].average_count, 1.0);
    }

    #[test]
    fn test_detailed_stats() {
        let records = vec![
            record("A", utc(2024, 1, 1, 0), ChargerType::Fast, 10_000),
            record("B", utc(2024, 1, 16, 0), ChargerType::Fast, 20_000),
            record("B", utc(2024, 3, 1, 0), ChargerType::Fast, 30_000),
        ];
        let stats = detailed_stats(&records);

        assert_eq!(stats.total_charge_count, 3);
        assert_eq!(stats.total_spent, Decimal::from(60_000));
        assert_eq!(stats.total_charge_amount, Decimal::from(120));
        assert_eq!(stats.average_charge_cost, Decimal::from(20_000));
        assert_eq!(stats.most_used_location.as_deref(), Some("B"));
        // 60 days = 2 months
        assert_eq!(stats.monthly_average_cost, Decimal::from(30_000));
    }

    #[test]
    fn test_detailed_stats_short_span_counts_one_month() {
        let records = vec![
            record("A", utc(2024, 1, 1, 0), ChargerType::Fast, 10_000),
            record("A", utc(2024, 1, 5, 0), ChargerType::Fast, 5_000),
        ];
        assert_eq!(detailed_stats(&records).monthly_average_cost, Decimal::from(15_000));
    }

    #[test]
    fn test_most_used_location_tie_goes_to_later() {
        let records = vec![
            record("A", utc(2024, 1, 1, 0), ChargerType::Fast, 1_000),
            record("B", utc(2024, 1, 2, 0), ChargerType::Fast, 1_000),
        ];
        assert_eq!(detailed_stats(&records).most_used_location.as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_records() {
        assert!(monthly_trend(&[], now(), 6).is_empty());
        assert!(charger_type_distribution(&[]).is_empty());
        assert!(weekday_pattern(&[], kst()).is_empty());

        let stats = detailed_stats(&[]);
        assert_eq!(stats, DetailedStats::default());
        assert_eq!(stats.most_used_location, None);
    }

    #[test]
    fn test_report_uses_configured_months() {
        let records = vec![record("A", utc(2024, 6, 1, 3), ChargerType::Fast, 1_000)];
        let report = ChargeStats::from_config(&StatsConfig { trend_months: 3 }).report(&records, now());
        assert_eq!(report.monthly_trend.len(), 3);
        assert_eq!(report.weekdays.len(), 7);
        assert_eq!(report.detailed.total_charge_count, 1);
    }
}
