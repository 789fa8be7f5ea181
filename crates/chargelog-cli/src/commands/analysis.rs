//! Analysis command - read a vision-model answer about a receipt photo.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use chargelog_core::models::analysis::VisionAnalysis;
use chargelog_core::models::receipt::ParsedReceipt;
use chargelog_core::models::record::ChargeDraft;

use super::load_config;
use super::parse::{format_receipt, OutputFormat};

/// Arguments for the analysis command.
#[derive(Args)]
pub struct AnalysisArgs {
    /// File with the raw model response
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

/// The analysis together with the receipt and draft values it yields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisOutput<'a> {
    analysis: &'a VisionAnalysis,
    receipt: &'a ParsedReceipt,
    draft_total_cost: Option<String>,
}

pub async fn run(args: AnalysisArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Reading analysis: {}", args.input.display());

    let response = tokio::fs::read_to_string(&args.input).await?;
    let analysis = VisionAnalysis::from_response(&response)?;
    let receipt = analysis.to_parsed_receipt();

    if !analysis.is_usable() {
        eprintln!(
            "{} Image is not usable as a charging receipt: {}",
            style("⚠").yellow(),
            analysis.reasoning
        );
    } else if !receipt.is_reliable(config.extraction.reliable_confidence) {
        eprintln!(
            "{} Low model confidence ({:.0}%) - please check the values before saving.",
            style("⚠").yellow(),
            analysis.confidence * 100.0
        );
    }

    let mut draft = ChargeDraft::new(Utc::now());
    draft.apply_analysis(&analysis);
    let draft_total_cost = draft.total_cost().map(|cost| cost.to_string());
    if draft_total_cost.is_none() {
        eprintln!(
            "{} Charge amount x unit price is out of range ({} x {}).",
            style("⚠").yellow(),
            draft.charge_amount,
            draft.unit_price
        );
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&AnalysisOutput {
            analysis: &analysis,
            receipt: &receipt,
            draft_total_cost: draft_total_cost.clone(),
        })?,
        OutputFormat::Csv => format_receipt(&receipt, args.format)?,
        OutputFormat::Text => {
            let mut text = format!(
                "{:<14}{:?}\n{:<14}{:?}\n",
                "Image:", analysis.image_type, "Status:", analysis.charging_status
            );
            if let Some(percent) = analysis.battery_percent {
                text.push_str(&format!("{:<14}{}%\n", "Battery:", percent));
            }
            text.push_str(&format_receipt(&receipt, args.format)?);
            match &draft_total_cost {
                Some(cost) => text.push_str(&format!("{:<14}{}원\n", "Draft total:", cost)),
                None => text.push_str(&format!("{:<14}-\n", "Draft total:")),
            }
            text
        }
    };

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

    Ok(())
}
