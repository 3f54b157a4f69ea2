//! One run of the catalog pipeline
//!
//! Sequences the stages: ensure the output directory, fetch, transform and
//! write. Any stage error aborts the run before an output file is written.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::cache::CacheManager;
use crate::cli::{Cli, CliError, RunConfig};
use crate::config::Settings;
use crate::data::{FetchError, ProductTransport, ProductsClient, RawProduct, ReqwestTransport};
use crate::output::{self, OutputFormat, WriteError};
use crate::retry::RetryPolicy;
use crate::transform::{EnrichmentRanges, RandomSource, SystemRandom, Transformer};

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// The wired-up stages for a run
///
/// All collaborators are passed in, so tests can substitute the transport,
/// the cache and the random source.
pub struct Pipeline<R> {
    client: ProductsClient,
    transformer: Transformer<R>,
    settings: Settings,
}

impl Pipeline<SystemRandom> {
    /// Production wiring: reqwest transport, fresh cache, entropy-seeded randomness
    pub fn from_settings(settings: Settings) -> Self {
        Self::with_parts(
            Arc::new(ReqwestTransport::new()),
            Arc::new(CacheManager::new()),
            SystemRandom::new(),
            settings,
        )
    }
}

impl<R: RandomSource> Pipeline<R> {
    /// Wires the stages from explicit collaborators
    pub fn with_parts(
        transport: Arc<dyn ProductTransport>,
        cache: Arc<CacheManager<Vec<RawProduct>>>,
        random: R,
        settings: Settings,
    ) -> Self {
        let client = ProductsClient::new(transport, cache, settings.base_url.clone())
            .with_cache_ttl(settings.cache_ttl)
            .with_retry_policy(RetryPolicy {
                max_attempts: settings.retry_count,
                base_delay: settings.backoff_base,
            });
        let transformer = Transformer::new(random, EnrichmentRanges::from(&settings));

        Self {
            client,
            transformer,
            settings,
        }
    }

    /// Runs every stage once and returns the path of the written file
    pub async fn run(&mut self, format: OutputFormat) -> Result<PathBuf, PipelineError> {
        output::ensure_output_dir(&self.settings.output_dir)?;

        let products = self.client.fetch_products().await?;
        let catalog = self.transformer.transform(&products);

        let path = self.settings.output_path(format);
        output::write_catalog(&catalog, format, &path)?;

        info!(
            path = %path.display(),
            categories = catalog.category_count(),
            products = catalog.product_count(),
            "Catalog written"
        );
        Ok(path)
    }
}

/// Validates the arguments, then runs the pipeline with production wiring
///
/// Errors are logged here before being returned.
pub async fn run_from_cli(cli: &Cli) -> Result<PathBuf, PipelineError> {
    let config = RunConfig::from_cli(cli)
        .inspect_err(|e| error!(error = %e, "Invalid arguments"))?;

    info!(
        format = config.format.extension(),
        base_url = %config.settings.base_url,
        "Starting catalog run"
    );

    Pipeline::from_settings(config.settings)
        .run(config.format)
        .await
        .inspect_err(|e| error!(error = %e, "Pipeline failed"))
}
