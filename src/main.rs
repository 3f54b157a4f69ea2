//! Catalog Enricher - fetch, enrich and group a product catalog
//!
//! Fetches products from the catalog API, derives discount, stock and
//! popularity fields, and writes them grouped by category as JSON or CSV.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use catalog_enricher::cli::Cli;
use catalog_enricher::config::Settings;
use catalog_enricher::{logging, pipeline};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The log file location is not overridable, so it is known before validation
    logging::init(&Settings::default().log_file);

    match pipeline::run_from_cli(&cli).await {
        Ok(path) => {
            info!(path = %path.display(), "Run completed");
            ExitCode::SUCCESS
        }
        // Already logged by the pipeline
        Err(_) => ExitCode::FAILURE,
    }
}
