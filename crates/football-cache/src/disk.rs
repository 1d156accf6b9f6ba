//! Parquet-on-disk cache implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use football_core::{CacheKey, CacheStore, DataError, Result, is_expired};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::codec;

const PAYLOAD_EXT: &str = "parquet";
const META_EXT: &str = "meta";

/// Sidecar metadata written next to each payload.
#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

/// Disk cache storing one parquet file per entry.
///
/// Layout is `<root>/<namespace>/<digest>.parquet` with a
/// `<digest>.meta` JSON sidecar holding the write timestamp and TTL. Entries
/// written without a TTL in their sidecar use the store's default TTL.
///
/// Writes are not locked. A partially written entry reads back as a miss.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
    default_ttl: Duration,
}

impl DiskCache {
    /// Default entry lifetime when a sidecar carries none.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a disk cache rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            default_ttl: Self::DEFAULT_TTL,
        }
    }

    /// Set the TTL applied to sidecars that do not record one.
    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Returns the cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, key: &CacheKey) -> (PathBuf, PathBuf) {
        let dir = self.root.join(key.namespace());
        (
            dir.join(format!("{}.{PAYLOAD_EXT}", key.digest())),
            dir.join(format!("{}.{META_EXT}", key.digest())),
        )
    }

    fn read_meta(path: &Path) -> Result<Meta> {
        let text = fs::read_to_string(path).map_err(|e| DataError::CacheCorruption(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| DataError::CacheCorruption(e.to_string()))
    }

    fn ttl_of(&self, meta: &Meta) -> Duration {
        meta.ttl_ms.map_or(self.default_ttl, Duration::from_millis)
    }

    fn remove_pair(payload: &Path, meta: &Path) {
        let _ = fs::remove_file(payload);
        let _ = fs::remove_file(meta);
    }

    /// Looks up an entry and returns it with its remaining lifetime.
    ///
    /// Same semantics as [`CacheStore::get`]; used by [`TieredCache`] to
    /// promote disk hits without extending their lifetime.
    ///
    /// [`TieredCache`]: crate::TieredCache
    pub fn get_with_remaining(&self, key: &CacheKey) -> Option<(DataFrame, Duration)> {
        let (payload, meta_path) = self.paths(key);
        if !payload.exists() || !meta_path.exists() {
            return None;
        }

        let meta = match Self::read_meta(&meta_path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable cache metadata, treating as miss");
                return None;
            }
        };

        let ttl = self.ttl_of(&meta);
        let now = Utc::now();
        if is_expired(meta.timestamp, ttl, now) {
            debug!(key = %key, "Cache entry expired, removing");
            Self::remove_pair(&payload, &meta_path);
            return None;
        }

        let frame = match fs::read(&payload)
            .map_err(|e| DataError::CacheCorruption(e.to_string()))
            .and_then(codec::decode)
        {
            Ok(frame) => frame,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable cache payload, treating as miss");
                return None;
            }
        };

        let age = now
            .signed_duration_since(meta.timestamp)
            .max(TimeDelta::zero())
            .to_std()
            .unwrap_or_default();
        Some((frame, ttl.saturating_sub(age)))
    }
}

#[async_trait]
impl CacheStore for DiskCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Option<DataFrame> {
        let hit = self.get_with_remaining(key).map(|(frame, _)| frame);
        match &hit {
            Some(frame) => debug!(rows = frame.height(), "Disk cache hit"),
            None => debug!("Disk cache miss"),
        }
        hit
    }

    #[instrument(skip(self, payload), fields(key = %key, rows = payload.height()))]
    async fn put(&self, key: &CacheKey, payload: &DataFrame, ttl: Duration) -> Result<()> {
        let (payload_path, meta_path) = self.paths(key);
        if let Some(dir) = payload_path.parent() {
            fs::create_dir_all(dir).map_err(|e| DataError::Cache(e.to_string()))?;
        }

        let bytes = codec::encode(payload)?;
        fs::write(&payload_path, bytes).map_err(|e| DataError::Cache(e.to_string()))?;

        let meta = Meta {
            timestamp: Utc::now(),
            ttl_ms: Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        };
        let meta_json = serde_json::to_string(&meta).map_err(|e| DataError::Cache(e.to_string()))?;
        fs::write(&meta_path, meta_json).map_err(|e| DataError::Cache(e.to_string()))?;

        debug!("Cached {} rows on disk", payload.height());
        Ok(())
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        let Ok(namespaces) = fs::read_dir(&self.root) else {
            return Ok(0);
        };

        let now = Utc::now();
        let mut removed = 0;
        for namespace in namespaces.flatten() {
            let Ok(entries) = fs::read_dir(namespace.path()) else {
                continue;
            };
            for entry in entries.flatten() {
                let meta_path = entry.path();
                if meta_path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                    continue;
                }
                let stale = Self::read_meta(&meta_path)
                    .map_or(true, |meta| is_expired(meta.timestamp, self.ttl_of(&meta), now));
                if stale {
                    Self::remove_pair(&meta_path.with_extension(PAYLOAD_EXT), &meta_path);
                    removed += 1;
                }
            }
        }

        debug!(removed, "Removed stale disk cache entries");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| DataError::Cache(e.to_string()))?;
        }
        debug!(root = %self.root.display(), "Cleared disk cache");
        Ok(())
    }
}
