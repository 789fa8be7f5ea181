//! Data models: parsed receipts, charge records, vision analyses, config.

pub mod analysis;
pub mod config;
pub mod receipt;
pub mod record;
