//! CLI Integration Test Modules

pub mod argument_parsing;
pub mod config_file;

use lifthub_checkin::app::cli::args::Args;
use lifthub_checkin::app::cli::config::{ConfigError, Settings};

pub fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("lifthub-checkin")
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Parse, merge the config file and resolve settings the way startup does
pub async fn settings_from(args: &[&str]) -> Result<Settings, ConfigError> {
    let matches = Args::matches_from(&argv(args), false)?;
    let merged = Args::from_matches_with_config(&matches).await?;
    Settings::from_args(&merged)
}
