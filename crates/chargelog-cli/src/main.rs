//! CLI application for EV charging receipts and charge history statistics.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analysis, batch, config, locations, parse, stats};

/// EV charging log - Extract charging data from receipts and analyze charge history
#[derive(Parser)]
#[command(name = "chargelog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single receipt text file
    Parse(parse::ParseArgs),

    /// Parse multiple receipt text files
    Batch(batch::BatchArgs),

    /// Read a vision-model analysis of a receipt photo
    Analysis(analysis::AnalysisArgs),

    /// Show favorite, recent and cheapest charging locations
    Locations(locations::LocationsArgs),

    /// Show spending and usage statistics
    Stats(stats::StatsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Analysis(args) => analysis::run(args, config_path).await,
        Commands::Locations(args) => locations::run(args, config_path).await,
        Commands::Stats(args) => stats::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
