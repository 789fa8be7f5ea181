//! Parse command - extract charging data from a single receipt text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use clap::Args;
use console::style;
use tracing::{debug, info};

use chargelog_core::models::config::ChargelogConfig;
use chargelog_core::models::receipt::ParsedReceipt;
use chargelog_core::receipt::{ReceiptParser, ReceiptTextParser};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file with the receipt's OCR text
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Date whose year is given to dates printed without one (YYYY-MM-DD)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Show extraction confidence and missing fields
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing receipt: {}", args.input.display());

    let text = tokio::fs::read_to_string(&args.input).await?;
    let parser = build_parser(&config, args.reference_date);
    let receipt = parser.parse(&text);

    // Format output
    let output = format_receipt(&receipt, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        print_confidence(&receipt, &config);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a receipt parser from configuration and an optional reference date.
pub fn build_parser(config: &ChargelogConfig, reference_date: Option<NaiveDate>) -> ReceiptParser {
    let parser = ReceiptParser::from_config(&config.extraction);
    match reference_date {
        Some(date) => parser.with_reference_year(date.year()),
        None => parser,
    }
}

fn print_confidence(receipt: &ParsedReceipt, config: &ChargelogConfig) {
    println!();
    println!(
        "{} Extraction confidence: {:.0}%",
        style("ℹ").blue(),
        receipt.confidence * 100.0
    );

    let missing = receipt.missing_fields();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
        println!("{} Not found: {}", style("ℹ").blue(), names.join(", "));
    }

    if !receipt.is_reliable(config.extraction.reliable_confidence) {
        println!(
            "{}",
            style("Low confidence - please check the values before saving.").yellow()
        );
    }
}

pub fn format_receipt(receipt: &ParsedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &ParsedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "location",
        "charge_amount",
        "unit_price",
        "total_cost",
        "charger_type",
        "confidence",
    ])?;

    wtr.write_record([
        &receipt.date.map(|d| d.to_string()).unwrap_or_default(),
        &receipt.location.clone().unwrap_or_default(),
        &receipt.charge_amount.map(|a| a.to_string()).unwrap_or_default(),
        &receipt.unit_price.map(|p| p.to_string()).unwrap_or_default(),
        &receipt.total_cost.map(|c| c.to_string()).unwrap_or_default(),
        &receipt.charger_type.map(|t| t.to_string()).unwrap_or_default(),
        &format!("{:.2}", receipt.confidence),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ParsedReceipt) -> String {
    fn line(output: &mut String, label: &str, value: Option<String>) {
        let value = value.unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("{:<14}{}\n", label, value));
    }

    let mut output = String::new();

    line(&mut output, "Date:", receipt.date.map(|d| d.date().to_string()));
    line(&mut output, "Location:", receipt.location.clone());
    line(
        &mut output,
        "Charger:",
        receipt
            .charger_type
            .map(|t| format!("{} ({})", t.label(), t)),
    );
    line(
        &mut output,
        "Energy:",
        receipt.charge_amount.map(|a| format!("{} kWh", a)),
    );
    line(
        &mut output,
        "Unit price:",
        receipt.unit_price.map(|p| format!("{}원/kWh", p)),
    );
    line(
        &mut output,
        "Total:",
        receipt.total_cost.map(|c| format!("{}원", c)),
    );

    output
}
