//! In-memory cache manager for API responses
//!
//! Provides a `CacheManager` that keeps cloned values keyed by string, each
//! with its own expiry timestamp. Expired entries are dropped on read.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A stored value together with its freshness window
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of reading a fresh entry from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Time-bounded key/value store for fetched responses
///
/// Each entry carries its own TTL. There is no eviction policy beyond expiry:
/// an entry read after its TTL has elapsed is removed and reported as absent.
/// The map sits behind a `Mutex` so one manager can be shared through an `Arc`.
#[derive(Debug)]
pub struct CacheManager<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> Default for CacheManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheManager<T> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores `data` under `key` for `ttl`, replacing any previous entry
    pub fn set(&self, key: &str, data: T, ttl: std::time::Duration) {
        let now = Utc::now();
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        self.lock().insert(key.to_string(), entry);
    }

    /// Number of entries currently stored, including ones not yet evicted
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Clone> CacheManager<T> {
    /// Returns the value stored under `key` if it has not expired
    pub fn get(&self, key: &str) -> Option<T> {
        self.read(key).map(|cached| cached.data)
    }

    /// Like [`get`](Self::get), but also reports when the value was cached
    pub fn read(&self, key: &str) -> Option<CachedData<T>> {
        let mut entries = self.lock();
        let now = Utc::now();

        if entries.get(key)?.is_expired(now) {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|entry| CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
        })
    }
}
