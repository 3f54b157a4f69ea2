//! Command-line interface parsing for the catalog enricher
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --format flag and overrides for the compiled-in settings.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::output::OutputFormat;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified output format is not recognized
    #[error("Invalid format: '{0}'. Valid formats: json, csv")]
    InvalidFormat(String),

    /// The overrides produce unusable settings
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Catalog enricher - fetch products, enrich them and write them grouped by category
#[derive(Parser, Debug)]
#[command(name = "catalog-enricher")]
#[command(about = "Fetch a product catalog, enrich it and write it grouped by category")]
#[command(version)]
pub struct Cli {
    /// Output format
    ///
    /// Valid formats: json, csv
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    pub format: String,

    /// Base URL of the product API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory the output file is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Total number of HTTP attempts before giving up
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<u32>,

    /// How long a fetched product list stays cached, in minutes
    #[arg(long, value_name = "MINUTES")]
    pub cache_ttl_minutes: Option<u64>,
}

/// Everything one run needs, derived from CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Requested output format
    pub format: OutputFormat,
    /// Settings with CLI overrides applied
    pub settings: Settings,
}

/// Parses a format string argument into an OutputFormat.
///
/// # Returns
/// * `Ok(OutputFormat)` if the string names a supported format
/// * `Err(CliError::InvalidFormat)` otherwise
pub fn parse_format_arg(s: &str) -> Result<OutputFormat, CliError> {
    OutputFormat::from_str(s).ok_or_else(|| CliError::InvalidFormat(s.to_string()))
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// Overrides are applied on top of `Settings::default()` and the result
    /// is validated.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let format = parse_format_arg(&cli.format)?;

        let mut settings = Settings::default();
        if let Some(base_url) = &cli.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(output_dir) = &cli.output_dir {
            settings.output_dir = output_dir.clone();
        }
        if let Some(retries) = cli.retries {
            settings.retry_count = retries;
        }
        if let Some(minutes) = cli.cache_ttl_minutes {
            settings.cache_ttl = Duration::from_secs(minutes.saturating_mul(60));
        }
        settings.validate()?;

        Ok(RunConfig { format, settings })
    }
}
