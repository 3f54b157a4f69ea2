//! Runtime settings for the catalog pipeline
//!
//! Every constant the pipeline depends on lives here as a named field with a
//! compiled-in default. The CLI overrides a subset of them.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::output::OutputFormat;

/// Default product API base URL
pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";

/// Default cache time-to-live in minutes
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 5;

/// Default number of HTTP attempts before giving up
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Errors raised when settings are inconsistent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A range has its lower bound above its upper bound
    #[error("Invalid {name} range: {start} > {end}")]
    InvertedRange {
        name: &'static str,
        start: u32,
        end: u32,
    },

    /// The discount cannot exceed the full price
    #[error("Discount percent cannot exceed 100 (got {0})")]
    DiscountTooLarge(u32),

    /// At least one attempt is needed to fetch anything
    #[error("Retry count must be at least 1")]
    ZeroRetries,
}

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the product API, without the `/products` suffix
    pub base_url: String,
    /// How long a fetched product list stays fresh in the cache
    pub cache_ttl: Duration,
    /// Total number of HTTP attempts, including the first one
    pub retry_count: u32,
    /// Unit of the exponential backoff; the wait after attempt n is `backoff_base * 2^n`
    pub backoff_base: Duration,
    /// Inclusive range the discount percentage is drawn from
    pub discount_percent: RangeInclusive<u32>,
    /// Inclusive range stock levels are drawn from
    pub stock: RangeInclusive<u32>,
    /// Directory the output file is written to
    pub output_dir: PathBuf,
    /// Output file name without extension
    pub output_base_name: String,
    /// File the log is appended to
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60),
            retry_count: DEFAULT_RETRY_COUNT,
            backoff_base: Duration::from_secs(1),
            discount_percent: 5..=20,
            stock: 0..=100,
            output_dir: PathBuf::from("files"),
            output_base_name: "grouped_products".to_string(),
            log_file: PathBuf::from("logs").join("log.txt"),
        }
    }
}

impl Settings {
    /// Checks that the ranges and counts can actually be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("discount percent", &self.discount_percent)?;
        check_range("stock", &self.stock)?;

        if *self.discount_percent.end() > 100 {
            return Err(ConfigError::DiscountTooLarge(*self.discount_percent.end()));
        }
        if self.retry_count == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        Ok(())
    }

    /// Full path of the output file for the given format
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.output_base_name, format.extension()))
    }
}

fn check_range(name: &'static str, range: &RangeInclusive<u32>) -> Result<(), ConfigError> {
    if range.start() > range.end() {
        return Err(ConfigError::InvertedRange {
            name,
            start: *range.start(),
            end: *range.end(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.retry_count, 3);
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.discount_percent, 5..=20);
        assert_eq!(settings.stock, 0..=100);
    }

    #[test]
    fn test_output_path_uses_format_extension() {
        let settings = Settings::default();
        assert_eq!(
            settings.output_path(OutputFormat::Json),
            PathBuf::from("files/grouped_products.json")
        );
        assert_eq!(
            settings.output_path(OutputFormat::Csv),
            PathBuf::from("files/grouped_products.csv")
        );
    }

    #[test]
    fn test_inverted_stock_range_is_rejected() {
        let settings = Settings {
            stock: 10..=1,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvertedRange {
                name: "stock",
                start: 10,
                end: 1
            })
        );
    }

    #[test]
    fn test_discount_above_hundred_is_rejected() {
        let settings = Settings {
            discount_percent: 50..=150,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::DiscountTooLarge(150)));
    }

    #[test]
    fn test_zero_retries_is_rejected() {
        let settings = Settings {
            retry_count: 0,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::ZeroRetries));
    }
}
