//! Statistics over stored charge records.

use rust_decimal::Decimal;

pub mod charging;
pub mod locations;

pub use charging::{monthly_summary, ChargeStats, DetailedStats, MonthlySummary, StatsReport};
pub use locations::{
    format_relative_time, search_locations, FavoriteLocation, LocationStat, LocationStatsEngine,
};

/// Sum that clamps at `Decimal::MAX` / `Decimal::MIN` instead of panicking.
///
/// Records come from user files, so totals can exceed the `Decimal` range.
pub(crate) fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}
