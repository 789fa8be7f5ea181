//! Per-location summaries: favorites, recents, search, cheapest site.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::LocationConfig;
use crate::models::record::ChargeRecord;

use super::saturating_sum;

/// Visits needed before a location counts as a favorite.
pub const FAVORITE_MIN_VISITS: usize = 3;

/// Maximum number of entries in the recents view.
pub const RECENT_LIMIT: usize = 5;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Aggregate over all records sharing one location string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStat {
    /// Trimmed location, compared exactly (no case folding).
    pub location: String,
    pub visit_count: usize,
    /// Mean unit price, rounded to a whole currency unit.
    pub average_unit_price: Decimal,
    pub last_visit: DateTime<Utc>,
    pub is_favorite: bool,
    pub total_cost: Decimal,
    pub total_charge: Decimal,
}

/// Location entry of the favorites / recents views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLocation {
    pub location: String,
    pub visit_count: usize,
    pub average_unit_price: Decimal,
    pub last_visit: DateTime<Utc>,
    /// Whole days since the last visit (floor).
    pub days_since_last_visit: i64,
}

impl FavoriteLocation {
    /// Relative label for the last visit ("today", "3 days ago", ...).
    pub fn last_visit_label(&self) -> String {
        format_relative_time(self.days_since_last_visit)
    }
}

/// Location statistics engine.
///
/// Every call recomputes from the records it is given; nothing is cached.
#[derive(Debug, Clone)]
pub struct LocationStatsEngine {
    favorite_min_visits: usize,
    recent_limit: usize,
}

impl LocationStatsEngine {
    pub fn new() -> Self {
        Self {
            favorite_min_visits: FAVORITE_MIN_VISITS,
            recent_limit: RECENT_LIMIT,
        }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self {
            favorite_min_visits: config.favorite_min_visits,
            recent_limit: config.recent_limit,
        }
    }

    /// Group records by trimmed location and rank by visit count.
    ///
    /// Ties keep the order in which locations first appear in `records`.
    pub fn location_stats(&self, records: &[ChargeRecord]) -> Vec<LocationStat> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&ChargeRecord>)> = Vec::new();

        for record in records {
            let key = record.location.trim();
            match index.get(key).copied() {
                Some(i) => groups[i].1.push(record),
                None => {
                    index.insert(key, groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }

        let mut stats: Vec<LocationStat> = groups
            .into_iter()
            .filter_map(|(location, group)| self.summarize(location, &group))
            .collect();

        // stable: equal counts stay in first-appearance order
        stats.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));

        info!(
            "Computed stats for {} locations from {} records",
            stats.len(),
            records.len()
        );
        stats
    }

    fn summarize(&self, location: &str, group: &[&ChargeRecord]) -> Option<LocationStat> {
        let last_visit = group.iter().map(|r| r.date).max()?;
        let visit_count = group.len();

        let total_cost = saturating_sum(group.iter().map(|r| r.total_cost));
        let total_charge = saturating_sum(group.iter().map(|r| r.charge_amount));
        let unit_price_sum = saturating_sum(group.iter().map(|r| r.unit_price));
        let average_unit_price = (unit_price_sum / Decimal::from(visit_count))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Some(LocationStat {
            location: location.to_string(),
            visit_count,
            average_unit_price,
            last_visit,
            is_favorite: visit_count >= self.favorite_min_visits,
            total_cost,
            total_charge,
        })
    }

    /// Locations visited at least the favorite threshold number of times.
    pub fn favorites(&self, records: &[ChargeRecord], now: DateTime<Utc>) -> Vec<FavoriteLocation> {
        self.location_stats(records)
            .iter()
            .filter(|stat| stat.is_favorite)
            .map(|stat| to_favorite(stat, now))
            .collect()
    }

    /// Locations visited fewer times than the favorite threshold, capped at
    /// the recents limit.
    pub fn recents(&self, records: &[ChargeRecord], now: DateTime<Utc>) -> Vec<FavoriteLocation> {
        let recents: Vec<FavoriteLocation> = self
            .location_stats(records)
            .iter()
            .filter(|stat| stat.visit_count >= 1 && stat.visit_count < self.favorite_min_visits)
            .take(self.recent_limit)
            .map(|stat| to_favorite(stat, now))
            .collect();

        debug!("{} recent locations (limit {})", recents.len(), self.recent_limit);
        recents
    }

    /// Favorite location with the lowest average unit price.
    ///
    /// Ties go to the location ranked first.
    pub fn cheapest(&self, records: &[ChargeRecord]) -> Option<LocationStat> {
        self.location_stats(records)
            .into_iter()
            .filter(|stat| stat.visit_count >= self.favorite_min_visits)
            .reduce(|cheapest, current| {
                if current.average_unit_price < cheapest.average_unit_price {
                    current
                } else {
                    cheapest
                }
            })
    }
}

impl Default for LocationStatsEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_favorite(stat: &LocationStat, now: DateTime<Utc>) -> FavoriteLocation {
    FavoriteLocation {
        location: stat.location.clone(),
        visit_count: stat.visit_count,
        average_unit_price: stat.average_unit_price,
        last_visit: stat.last_visit,
        days_since_last_visit: days_since(stat.last_visit, now),
    }
}

/// Whole days from `then` to `now`, rounded toward negative infinity.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Case-insensitive substring filter; a blank query returns everything.
pub fn search_locations(locations: &[FavoriteLocation], query: &str) -> Vec<FavoriteLocation> {
    let query = query.trim();
    if query.is_empty() {
        return locations.to_vec();
    }

    let query = query.to_lowercase();
    locations
        .iter()
        .filter(|loc| loc.location.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Format a day count as a relative label.
///
/// Weeks, months and years are integer divisions by 7, 30 and 365. Negative
/// counts (a visit dated in the future) read as "today".
pub fn format_relative_time(days: i64) -> String {
    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => units_ago(days / 7, "week"),
        30..=364 => units_ago(days / 30, "month"),
        _ => units_ago(days / 365, "year"),
    }
}

fn units_ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
