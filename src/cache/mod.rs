//! Cache module for holding API responses in memory
//!
//! This module provides a cache manager that keeps fetched responses for a
//! configurable TTL (time-to-live). Entries are evicted once they expire;
//! there is no manual invalidation beyond clearing the whole cache.

mod manager;

pub use manager::{CacheManager, CachedData};
