//! No-op cache implementation.

use std::time::Duration;

use async_trait::async_trait;
use football_core::{CacheKey, CacheStore, Result};
use polars::prelude::DataFrame;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always misses and `put` succeeds without storing. Useful for
/// disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &CacheKey) -> Option<DataFrame> {
        trace!("NoopCache: get called, returning None");
        None
    }

    async fn put(&self, _key: &CacheKey, _payload: &DataFrame, _ttl: Duration) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
