//! Locations command - favorite, recent and cheapest charging sites.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use console::style;

use chargelog_core::stats::locations::{
    days_since, format_relative_time, search_locations, FavoriteLocation, LocationStat,
    LocationStatsEngine,
};

use super::parse::OutputFormat;
use super::{load_config, read_records};

/// Arguments for the locations command.
#[derive(Args)]
pub struct LocationsArgs {
    /// JSON file with an array of charge records
    #[arg(required = true)]
    records: PathBuf,

    /// Which locations to show
    #[arg(long, value_enum, default_value = "favorites")]
    view: LocationView,

    /// Only show locations containing this text (favorites and recents)
    #[arg(short, long)]
    search: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LocationView {
    /// Locations visited at least the favorite threshold
    Favorites,
    /// Recently used locations below the favorite threshold
    Recents,
    /// Every location, most visited first
    All,
    /// Favorite location with the lowest average unit price
    Cheapest,
}

pub async fn run(args: LocationsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let records = read_records(&args.records).await?;

    let engine = LocationStatsEngine::from_config(&config.locations);
    let now = Utc::now();

    let output = match args.view {
        LocationView::Favorites | LocationView::Recents => {
            let locations = if matches!(args.view, LocationView::Favorites) {
                engine.favorites(&records, now)
            } else {
                engine.recents(&records, now)
            };
            let locations = match &args.search {
                Some(query) => search_locations(&locations, query),
                None => locations,
            };
            format_favorites(&locations, args.format)?
        }
        LocationView::All => format_stats(&engine.location_stats(&records), args.format)?,
        LocationView::Cheapest => match engine.cheapest(&records) {
            Some(stat) => format_stats(std::slice::from_ref(&stat), args.format)?,
            None => {
                println!(
                    "{} No location has {} or more visits yet.",
                    style("ℹ").blue(),
                    config.locations.favorite_min_visits
                );
                return Ok(());
            }
        },
    };

    println!("{}", output);
    Ok(())
}

fn format_favorites(locations: &[FavoriteLocation], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(locations)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record([
                "location",
                "visit_count",
                "average_unit_price",
                "last_visit",
                "days_since_last_visit",
            ])?;
            for loc in locations {
                wtr.write_record([
                    &loc.location,
                    &loc.visit_count.to_string(),
                    &loc.average_unit_price.to_string(),
                    &loc.last_visit.to_rfc3339(),
                    &loc.days_since_last_visit.to_string(),
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            if locations.is_empty() {
                return Ok("No locations found.".to_string());
            }
            let mut output = String::new();
            for loc in locations {
                output.push_str(&format!(
                    "{}  {} visits  avg {}원/kWh  {}\n",
                    style(&loc.location).bold(),
                    loc.visit_count,
                    loc.average_unit_price,
                    loc.last_visit_label()
                ));
            }
            Ok(output)
        }
    }
}

fn format_stats(stats: &[LocationStat], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record([
                "location",
                "visit_count",
                "average_unit_price",
                "last_visit",
                "is_favorite",
                "total_cost",
                "total_charge",
            ])?;
            for stat in stats {
                wtr.write_record([
                    &stat.location,
                    &stat.visit_count.to_string(),
                    &stat.average_unit_price.to_string(),
                    &stat.last_visit.to_rfc3339(),
                    &stat.is_favorite.to_string(),
                    &stat.total_cost.to_string(),
                    &stat.total_charge.to_string(),
                ])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            if stats.is_empty() {
                return Ok("No locations found.".to_string());
            }
            let now = Utc::now();
            let mut output = String::new();
            for stat in stats {
                let marker = if stat.is_favorite { "★" } else { " " };
                output.push_str(&format!(
                    "{} {}  {} visits  avg {}원/kWh  total {}원 / {} kWh  last {}\n",
                    marker,
                    style(&stat.location).bold(),
                    stat.visit_count,
                    stat.average_unit_price,
                    stat.total_cost,
                    stat.total_charge,
                    format_relative_time(days_since(stat.last_visit, now))
                ));
            }
            Ok(output)
        }
    }
}
