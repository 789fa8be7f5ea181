//! Subcommands and the helpers they share.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod locations;
pub mod parse;
pub mod stats;

use std::path::{Path, PathBuf};

use tracing::debug;

use chargelog_core::models::config::ChargelogConfig;
use chargelog_core::models::record::ChargeRecord;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chargelog")
        .join("config.json")
}

/// Load the configuration given with `--config`, else the default file if it
/// exists, else the built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ChargelogConfig> {
    if let Some(path) = config_path {
        return Ok(ChargelogConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(ChargelogConfig::from_file(&default_path)?)
    } else {
        Ok(ChargelogConfig::default())
    }
}

/// Read a JSON array of charge records.
pub async fn read_records(path: &Path) -> anyhow::Result<Vec<ChargeRecord>> {
    if !path.exists() {
        anyhow::bail!("Records file not found: {}", path.display());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let records: Vec<ChargeRecord> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid records file {}: {}", path.display(), e))?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
