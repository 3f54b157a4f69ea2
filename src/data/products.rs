//! Product listing API client
//!
//! Fetches the product catalog from `<base_url>/products`, retrying transient
//! failures with exponential backoff and keeping the parsed list in an
//! in-memory cache for a configurable TTL.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::RawProduct;
use crate::cache::CacheManager;
use crate::retry::{Backoff, RetryPolicy, RetryStep};

/// The only resource this client caches
pub const PRODUCTS_CACHE_KEY: &str = "products";

/// Boxed error produced by a transport implementation
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when fetching the product list
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt returned a non-success status
    #[error("Product API returned {status} after {attempts} attempt(s)")]
    ExhaustedRetries { attempts: u32, status: StatusCode },

    /// The last attempt failed before a response arrived
    #[error("HTTP request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The response body is not a JSON array of product objects
    #[error("Failed to parse product list: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Performs a single `GET` for JSON content
///
/// Implementations build a fresh request on every call. A returned `Err`
/// means no response was obtained; non-success statuses come back as `Ok`.
pub trait ProductTransport: Send + Sync {
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductTransport for ReqwestTransport {
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        async move {
            let response = self
                .client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, TransportError>(HttpResponse { status, body })
        }
        .boxed()
    }
}

/// Where a fetched product list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

/// How a successful fetch went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub source: FetchSource,
    /// HTTP attempts made; 0 when served from cache
    pub attempts: u32,
}

impl FetchReport {
    /// Number of retries, i.e. attempts after the first
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// The outcome of one failed attempt, kept until retries run out
enum AttemptFailure {
    Status(StatusCode),
    Transport(TransportError),
}

/// Client for fetching the product list
#[derive(Clone)]
pub struct ProductsClient {
    /// Transport for making requests
    transport: Arc<dyn ProductTransport>,
    /// Cache shared with whoever constructed the client
    cache: Arc<CacheManager<Vec<RawProduct>>>,
    /// Base URL for the API (without the `/products` suffix)
    base_url: String,
    /// How long a fetched list stays in the cache
    cache_ttl: Duration,
    /// Attempt budget and backoff schedule
    retry: RetryPolicy,
}

impl ProductsClient {
    /// Creates a client from its collaborators
    pub fn new(
        transport: Arc<dyn ProductTransport>,
        cache: Arc<CacheManager<Vec<RawProduct>>>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            base_url: base_url.into(),
            cache_ttl: Duration::from_secs(5 * 60),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Overrides the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// URL of the product listing endpoint
    pub fn products_url(&self) -> String {
        format!("{}/products", self.base_url.trim_end_matches('/'))
    }

    /// Fetches the product list
    ///
    /// # Returns
    /// * `Ok(Vec<RawProduct>)` - The cached list if still fresh, otherwise a freshly fetched one
    /// * `Err(FetchError)` - If every attempt failed or the body could not be parsed
    pub async fn fetch_products(&self) -> Result<Vec<RawProduct>, FetchError> {
        self.fetch_with_report().await.map(|(products, _)| products)
    }

    /// Fetches the product list and reports how it was obtained
    ///
    /// # Behavior
    /// - A fresh cache entry short-circuits the network entirely
    /// - Non-success statuses and transport errors are retried with exponential backoff
    /// - A body that fails to parse is returned as an error immediately, without retry
    /// - Only a successfully parsed list is written to the cache
    pub async fn fetch_with_report(&self) -> Result<(Vec<RawProduct>, FetchReport), FetchError> {
        if let Some(products) = self.cache.get(PRODUCTS_CACHE_KEY) {
            info!(products = products.len(), "Serving product list from cache");
            let report = FetchReport {
                source: FetchSource::Cache,
                attempts: 0,
            };
            return Ok((products, report));
        }

        let url = self.products_url();
        let mut backoff = Backoff::new(self.retry);

        loop {
            let attempt = backoff.attempt();
            debug!(attempt, url = %url, "Requesting product list");

            let failure = match self.transport.get_json(&url).await {
                Ok(response) if response.status.is_success() => {
                    let products = parse_products(&response.body).inspect_err(|e| {
                        error!(attempt, error = %e, "Product list could not be parsed");
                    })?;
                    self.cache
                        .set(PRODUCTS_CACHE_KEY, products.clone(), self.cache_ttl);
                    info!(attempt, products = products.len(), "Fetched product list");

                    let report = FetchReport {
                        source: FetchSource::Network,
                        attempts: attempt,
                    };
                    return Ok((products, report));
                }
                Ok(response) => AttemptFailure::Status(response.status),
                Err(source) => AttemptFailure::Transport(source),
            };

            match backoff.on_failure() {
                RetryStep::Retry { next_attempt, delay } => {
                    match &failure {
                        AttemptFailure::Status(status) => warn!(
                            attempt,
                            next_attempt,
                            status = status.as_u16(),
                            wait_secs = delay.as_secs_f64(),
                            "Product request failed, retrying"
                        ),
                        AttemptFailure::Transport(e) => warn!(
                            attempt,
                            next_attempt,
                            error = %e,
                            wait_secs = delay.as_secs_f64(),
                            "Product request failed, retrying"
                        ),
                    }
                    tokio::time::sleep(delay).await;
                }
                RetryStep::Exhausted { attempts } => {
                    let err = match failure {
                        AttemptFailure::Status(status) => {
                            FetchError::ExhaustedRetries { attempts, status }
                        }
                        AttemptFailure::Transport(source) => {
                            FetchError::Transport { attempts, source }
                        }
                    };
                    error!(attempts, error = %err, "Giving up on product list");
                    return Err(err);
                }
            }
        }
    }
}

/// Parses a JSON array of product objects
fn parse_products(body: &str) -> Result<Vec<RawProduct>, FetchError> {
    Ok(serde_json::from_str(body)?)
}
