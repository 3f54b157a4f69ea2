//! Enrichment and grouping of raw products
//!
//! Turns the fetched product list into a [`GroupedCatalog`]: products are
//! grouped by category, sorted by price (highest first) and given a random
//! discount, stock level and popularity score.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::Settings;
use crate::data::{EnrichedProduct, GroupedCatalog, RawProduct};

/// Source of uniformly distributed integers
pub trait RandomSource {
    /// Returns an integer in `range`, both ends inclusive
    fn int_in_range(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Entropy-seeded random source used outside of tests
#[derive(Debug, Clone)]
pub struct SystemRandom {
    rng: StdRng,
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, handy for reproducing a run
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SystemRandom {
    fn int_in_range(&mut self, range: RangeInclusive<u32>) -> u32 {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.gen_range(range)
    }
}

/// Ranges the random fields are drawn from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRanges {
    pub discount_percent: RangeInclusive<u32>,
    pub stock: RangeInclusive<u32>,
}

impl Default for EnrichmentRanges {
    fn default() -> Self {
        Self {
            discount_percent: 5..=20,
            stock: 0..=100,
        }
    }
}

impl From<&Settings> for EnrichmentRanges {
    fn from(settings: &Settings) -> Self {
        Self {
            discount_percent: settings.discount_percent.clone(),
            stock: settings.stock.clone(),
        }
    }
}

/// Rounds to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Groups and enriches products
#[derive(Debug, Clone)]
pub struct Transformer<R> {
    random: R,
    ranges: EnrichmentRanges,
}

impl<R: RandomSource> Transformer<R> {
    pub fn new(random: R, ranges: EnrichmentRanges) -> Self {
        Self { random, ranges }
    }

    /// Builds the grouped catalog for one run
    ///
    /// An empty input yields an empty catalog. Missing fields fall back to
    /// zero values rather than failing.
    pub fn transform(&mut self, products: &[RawProduct]) -> GroupedCatalog {
        let mut by_category: BTreeMap<&str, Vec<&RawProduct>> = BTreeMap::new();
        for product in products {
            by_category
                .entry(product.category_or_default())
                .or_default()
                .push(product);
        }

        let mut catalog = GroupedCatalog::new();
        for (category, mut group) in by_category {
            // Stable, so equal prices keep their API order.
            group.sort_by(|a, b| b.price_or_default().total_cmp(&a.price_or_default()));

            for product in group {
                let enriched = self.enrich(product);
                catalog.push(category, enriched);
            }
        }

        debug!(
            categories = catalog.category_count(),
            products = catalog.product_count(),
            "Transformed product list"
        );
        catalog
    }

    /// Derives the random fields for one product
    ///
    /// Draw order is discount percent, stock, then the stock sample used for
    /// the popularity score. The sample is independent of `stock`.
    pub fn enrich(&mut self, product: &RawProduct) -> EnrichedProduct {
        let original_price = product.price_or_default();

        let discount_percent = self.random.int_in_range(self.ranges.discount_percent.clone());
        let stock = self.random.int_in_range(self.ranges.stock.clone());
        let stock_sample = self.random.int_in_range(self.ranges.stock.clone());

        EnrichedProduct {
            id: product.id_or_default(),
            title: product.title_or_default().to_string(),
            original_price,
            discounted_price: round_cents(
                original_price * (1.0 - f64::from(discount_percent) / 100.0),
            ),
            stock,
            popularity_score: round_cents((original_price + f64::from(stock_sample)) / 2.0),
        }
    }
}
