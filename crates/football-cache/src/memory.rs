//! In-memory cache implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use football_core::{CacheKey, CacheStore, Result, is_expired};
use polars::prelude::DataFrame;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: DataFrame,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: DataFrame, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.cached_at, self.ttl, now)
    }
}

/// Simple in-memory cache.
///
/// Data is stored in a `RwLock`-protected `HashMap` and is lost when the cache
/// is dropped. Frames are cloned on get/put.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including ones that expired but were not
    /// looked up since.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Option<DataFrame> {
        let now = Utc::now();
        {
            let cache = self.entries.read().await;
            match cache.get(key) {
                Some(entry) if !entry.is_stale(now) => {
                    debug!("Cache hit in memory");
                    return Some(entry.data.clone());
                }
                Some(_) => {}
                None => {
                    debug!("Cache miss in memory");
                    return None;
                }
            }
        }

        let mut cache = self.entries.write().await;
        if cache.get(key).is_some_and(|entry| entry.is_stale(now)) {
            cache.remove(key);
            debug!("Evicted expired memory entry");
        }
        None
    }

    #[instrument(skip(self, payload), fields(key = %key, rows = payload.height()))]
    async fn put(&self, key: &CacheKey, payload: &DataFrame, ttl: Duration) -> Result<()> {
        let mut cache = self.entries.write().await;
        cache.insert(key.clone(), CacheEntry::new(payload.clone(), ttl));
        debug!("Cached {} rows in memory", payload.height());
        Ok(())
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        let now = Utc::now();
        let mut cache = self.entries.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(now));
        Ok(before - cache.len())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use football_core::{Operation, Params};
    use polars::prelude::Column;

    fn frame() -> DataFrame {
        DataFrame::new(vec![Column::new("team".into(), ["Arsenal"])]).unwrap()
    }

    fn key(league: &str) -> CacheKey {
        CacheKey::new(
            "soccerdata",
            Operation::TeamStats,
            &Params::league_season(league, "2023-2024"),
        )
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = InMemoryCache::new();
        let key = key("premier-league");

        assert!(cache.get(&key).await.is_none());
        cache
            .put(&key, &frame(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), frame());
        assert!(cache.get(&self::key("la-liga")).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted_on_lookup() {
        let cache = InMemoryCache::new();
        let key = key("premier-league");
        cache.put(&key, &frame(), Duration::ZERO).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_stale_and_clear() {
        let cache = InMemoryCache::new();
        cache
            .put(&key("premier-league"), &frame(), Duration::ZERO)
            .await
            .unwrap();
        cache
            .put(&key("la-liga"), &frame(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.invalidate_stale().await.unwrap(), 1);
        assert_eq!(cache.len().await, 1);

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await);
    }
}
