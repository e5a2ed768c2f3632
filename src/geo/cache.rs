//! In-memory cache of geolocation lookups.
//!
//! Entries are keyed by the normalized client address and stamped with the
//! monotonic instant they were fetched, so wall-clock steps do not change
//! how long an entry stays fresh. Freshness is only checked when an entry is read:
//! nothing is evicted, and a stale entry stays in the map until the next
//! successful lookup for that address overwrites it. The map therefore grows
//! with the number of distinct addresses seen over the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::models::GeoRecord;

/// How long a fetched record is served without asking the provider again.
pub const GEO_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    record: GeoRecord,
    fetched_at: Instant,
}

/// Result of a cache read for a key that is present.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup {
    pub record: GeoRecord,
    /// `false` once the entry is at least one TTL old.
    pub fresh: bool,
}

/// Concurrent address → record map guarded by a read-write lock.
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct GeoCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Default for GeoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(GEO_CACHE_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up `key`. `None` if it was never stored.
    pub async fn get(&self, key: &str) -> Option<CacheLookup> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        Some(CacheLookup {
            record: entry.record.clone(),
            fresh: entry.fetched_at.elapsed() < self.ttl,
        })
    }

    /// Insert or overwrite `key`, stamping it with the current instant.
    pub async fn put(&self, key: String, record: GeoRecord) {
        let fetched_at = Instant::now();
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { record, fetched_at });
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
