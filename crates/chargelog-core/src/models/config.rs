//! Configuration structures for parsing and statistics.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ChargelogError, Result};
use crate::receipt::rules::patterns::{MAX_TOTAL_COST, MIN_TOTAL_COST, RELIABLE_CONFIDENCE};
use crate::stats::charging::DEFAULT_TREND_MONTHS;
use crate::stats::locations::{FAVORITE_MIN_VISITS, RECENT_LIMIT};

/// Main configuration for chargelog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargelogConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Location statistics configuration.
    pub locations: LocationConfig,

    /// Charging statistics configuration.
    pub stats: StatsConfig,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Smallest amount accepted as a session total.
    pub min_total_cost: u64,

    /// Largest amount accepted as a session total.
    pub max_total_cost: u64,

    /// Confidence at which a parse result is applied without a warning.
    pub reliable_confidence: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_total_cost: MIN_TOTAL_COST,
            max_total_cost: MAX_TOTAL_COST,
            reliable_confidence: RELIABLE_CONFIDENCE,
        }
    }
}

/// Location statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Visits needed before a location counts as a favorite.
    pub favorite_min_visits: usize,

    /// Maximum number of entries in the recents view.
    pub recent_limit: usize,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            favorite_min_visits: FAVORITE_MIN_VISITS,
            recent_limit: RECENT_LIMIT,
        }
    }
}

/// Charging statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of calendar months in the monthly trend.
    pub trend_months: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}

impl ChargelogConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.min_total_cost > self.extraction.max_total_cost {
            return Err(ChargelogError::Config(format!(
                "extraction.min_total_cost ({}) exceeds extraction.max_total_cost ({})",
                self.extraction.min_total_cost, self.extraction.max_total_cost
            )));
        }
        if !(0.0..=1.0).contains(&self.extraction.reliable_confidence) {
            return Err(ChargelogError::Config(format!(
                "extraction.reliable_confidence must be within 0.0..=1.0, got {}",
                self.extraction.reliable_confidence
            )));
        }
        if self.locations.favorite_min_visits == 0 {
            return Err(ChargelogError::Config(
                "locations.favorite_min_visits must be at least 1".to_string(),
            ));
        }
        if self.stats.trend_months == 0 {
            return Err(ChargelogError::Config(
                "stats.trend_months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_constants() {
        let config = ChargelogConfig::default();
        assert_eq!(config.extraction.min_total_cost, 100);
        assert_eq!(config.extraction.max_total_cost, 1_000_000);
        assert_eq!(config.extraction.reliable_confidence, 0.4);
        assert_eq!(config.locations.favorite_min_visits, 3);
        assert_eq!(config.locations.recent_limit, 5);
        assert_eq!(config.stats.trend_months, 6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChargelogConfig =
            serde_json::from_str(r#"{"locations": {"recent_limit": 3}}"#).unwrap();
        assert_eq!(config.locations.recent_limit, 3);
        assert_eq!(config.locations.favorite_min_visits, 3);
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_cost_bounds() {
        let mut config = ChargelogConfig::default();
        config.extraction.min_total_cost = 5_000;
        config.extraction.max_total_cost = 100;
        assert!(matches!(config.validate(), Err(ChargelogError::Config(_))));
    }
}
