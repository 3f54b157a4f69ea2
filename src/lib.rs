//! Catalog Enricher Library
//!
//! Fetches a product catalog, enriches every product with derived pricing,
//! stock and popularity fields, and writes the result grouped by category.
//! The modules are public so the integration tests can drive the pipeline
//! with fake collaborators.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod transform;
