//! Two-level cache: memory in front of disk.

use std::time::Duration;

use async_trait::async_trait;
use football_core::{CacheKey, CacheStore, Result};
use polars::prelude::DataFrame;
use tracing::{debug, instrument, warn};

use crate::{DiskCache, InMemoryCache};

/// Memory cache backed by a disk cache.
///
/// Lookups try memory first, then disk. A disk hit is copied into memory for
/// its remaining lifetime, so promotion never extends an entry. Writes go to
/// both tiers.
#[derive(Debug)]
pub struct TieredCache {
    memory: InMemoryCache,
    disk: DiskCache,
}

impl TieredCache {
    /// Create a tiered cache over the given disk cache.
    #[must_use]
    pub fn new(disk: DiskCache) -> Self {
        Self {
            memory: InMemoryCache::new(),
            disk,
        }
    }

    /// Returns the memory tier.
    #[must_use]
    pub const fn memory(&self) -> &InMemoryCache {
        &self.memory
    }

    /// Returns the disk tier.
    #[must_use]
    pub const fn disk(&self) -> &DiskCache {
        &self.disk
    }
}

#[async_trait]
impl CacheStore for TieredCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Option<DataFrame> {
        if let Some(frame) = self.memory.get(key).await {
            return Some(frame);
        }

        let (frame, remaining) = self.disk.get_with_remaining(key)?;
        if let Err(e) = self.memory.put(key, &frame, remaining).await {
            warn!(error = %e, "Failed to promote disk hit to memory");
        } else {
            debug!(remaining_secs = remaining.as_secs(), "Promoted disk hit to memory");
        }
        Some(frame)
    }

    async fn put(&self, key: &CacheKey, payload: &DataFrame, ttl: Duration) -> Result<()> {
        self.memory.put(key, payload, ttl).await?;
        self.disk.put(key, payload, ttl).await
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        let memory = self.memory.invalidate_stale().await?;
        let disk = self.disk.invalidate_stale().await?;
        Ok(memory + disk)
    }

    async fn clear(&self) -> Result<()> {
        self.memory.clear().await?;
        self.disk.clear().await
    }
}
