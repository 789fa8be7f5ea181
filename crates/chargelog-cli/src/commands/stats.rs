//! Stats command - spending trend, charger types and weekday pattern.

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use console::style;
use rust_decimal::Decimal;

use chargelog_core::stats::charging::{monthly_summary, ChargeStats, MonthlySummary, StatsReport};

use super::parse::OutputFormat;
use super::{load_config, read_records};

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// JSON file with an array of charge records
    #[arg(required = true)]
    records: PathBuf,

    /// Number of months in the spending trend (default: from config)
    #[arg(short, long)]
    months: Option<u32>,

    /// Only summarize one calendar month (YYYY-MM)
    #[arg(long, value_parser = parse_year_month, conflicts_with = "months")]
    month: Option<(i32, u32)>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: StatsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let records = read_records(&args.records).await?;

    if let Some((year, month)) = args.month {
        let offset = *Local::now().fixed_offset().offset();
        let summary = monthly_summary(&records, year, month, offset);
        let output = match args.format {
            OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
            OutputFormat::Csv => format_summary_csv(&summary)?,
            OutputFormat::Text => format_summary_text(&summary),
        };
        println!("{}", output);
        return Ok(());
    }

    let mut stats = ChargeStats::from_config(&config.stats);
    if let Some(months) = args.months {
        if months == 0 {
            anyhow::bail!("--months must be at least 1");
        }
        stats = stats.with_trend_months(months);
    }

    let report = stats.report(&records, Local::now().fixed_offset());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_trend_csv(&report)?,
        OutputFormat::Text => format_text(&report),
    };

    println!("{}", output);
    Ok(())
}

fn parse_year_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected YYYY-MM, got '{}'", s);

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn format_summary_csv(summary: &MonthlySummary) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "total_cost", "total_charge", "charge_count"])?;
    wtr.write_record([
        &format!("{:04}-{:02}", summary.year, summary.month),
        &summary.total_cost.to_string(),
        &summary.total_charge.to_string(),
        &summary.charge_count.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_summary_text(summary: &MonthlySummary) -> String {
    let mut output = format!(
        "{}\n",
        style(format!("{:04}-{:02}", summary.year, summary.month)).bold()
    );
    output.push_str(&format!("  Sessions:        {}\n", summary.charge_count));
    output.push_str(&format!("  Total spent:     {}\n", won(summary.total_cost)));
    output.push_str(&format!(
        "  Total energy:    {} kWh\n",
        summary.total_charge.round_dp(1)
    ));
    output
}

fn format_trend_csv(report: &StatsReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "total_cost", "total_charge", "charge_count"])?;
    for month in &report.monthly_trend {
        wtr.write_record([
            &month.month,
            &month.total_cost.to_string(),
            &month.total_charge.to_string(),
            &month.charge_count.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn won(amount: Decimal) -> String {
    format!("{}원", amount.round())
}

fn format_text(report: &StatsReport) -> String {
    let detailed = &report.detailed;
    if detailed.total_charge_count == 0 {
        return "No charge records.".to_string();
    }

    let mut output = String::new();

    output.push_str(&format!("{}\n", style("Summary").bold()));
    output.push_str(&format!("  Sessions:        {}\n", detailed.total_charge_count));
    output.push_str(&format!("  Total spent:     {}\n", won(detailed.total_spent)));
    output.push_str(&format!(
        "  Total energy:    {} kWh\n",
        detailed.total_charge_amount.round_dp(1)
    ));
    output.push_str(&format!(
        "  Per session:     {}\n",
        won(detailed.average_charge_cost)
    ));
    output.push_str(&format!(
        "  Per month:       {}\n",
        won(detailed.monthly_average_cost)
    ));
    if let Some(location) = &detailed.most_used_location {
        output.push_str(&format!("  Most used:       {}\n", location));
    }
    output.push('\n');

    output.push_str(&format!("{}\n", style("Monthly trend").bold()));
    for month in &report.monthly_trend {
        output.push_str(&format!(
            "  {}  {:>3} sessions  {:>12}  {} kWh\n",
            month.month,
            month.charge_count,
            won(month.total_cost),
            month.total_charge.round_dp(1)
        ));
    }
    output.push('\n');

    output.push_str(&format!("{}\n", style("Charger types").bold()));
    for share in &report.charger_types {
        output.push_str(&format!(
            "  {:<6} {:>3}  {:.1}%\n",
            share.charger_type.label(),
            share.count,
            share.percentage
        ));
    }
    output.push('\n');

    output.push_str(&format!("{}\n", style("Weekdays").bold()));
    for day in &report.weekdays {
        output.push_str(&format!(
            "  {}  {:>3}  {:.2}/week\n",
            day.weekday, day.total_count, day.average_count
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_month() {
        assert_eq!(parse_year_month("2024-03"), Ok((2024, 3)));
        assert_eq!(parse_year_month("2024-12"), Ok((2024, 12)));
        assert!(parse_year_month("2024-13").is_err());
        assert!(parse_year_month("2024-00").is_err());
        assert!(parse_year_month("2024/03").is_err());
        assert!(parse_year_month("march").is_err());
    }

    #[test]
    fn test_summary_csv() {
        let summary = MonthlySummary {
            year: 2024,
            month: 3,
            total_cost: Decimal::from(48_000),
            total_charge: Decimal::from(120),
            charge_count: 3,
        };
        let csv = format_summary_csv(&summary).unwrap();
        assert_eq!(
            csv,
            "month,total_cost,total_charge,charge_count\n2024-03,48000,120,3\n"
        );
    }
}
