//! Cache trait for storing normalized record frames.
//!
//! This module defines the [`CacheStore`] trait that provides a unified interface
//! for caching adapter results, and the [`CacheKey`] every entry is addressed by.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use polars::prelude::DataFrame;

use crate::{
    error::Result,
    operation::{Operation, Params},
};

/// Content-addressed key for one adapter request.
///
/// The key is derived from the adapter name, the operation, and the canonical
/// parameter serialization. The adapter name doubles as the storage namespace,
/// so two providers never share an entry even for identical parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    namespace: String,
    digest: String,
}

impl CacheKey {
    /// Derives the key for an adapter request.
    #[must_use]
    pub fn new(namespace: &str, operation: Operation, params: &Params) -> Self {
        let material = format!("{}:{}", operation.as_str(), params.canonical());
        Self {
            namespace: namespace.to_string(),
            digest: blake3::hash(material.as_bytes()).to_hex().to_string(),
        }
    }

    /// Storage namespace (the adapter name). Intended for cache backends.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hex digest of the request. Intended for cache backends.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.digest)
    }
}

/// Returns true once `now - created_at >= ttl`.
#[must_use]
pub fn is_expired(created_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(created_at);
    age >= TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
}

/// Trait for caching normalized record frames.
///
/// Implementations can store data in various backends (parquet files, SQLite,
/// in-memory, etc.) to avoid repeated remote calls.
#[async_trait]
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Retrieves a live entry.
    ///
    /// Fails closed: expired, missing, and unreadable entries all return `None`.
    /// Unreadable entries are logged rather than reported.
    async fn get(&self, key: &CacheKey) -> Option<DataFrame>;

    /// Stores a frame under the key for at most `ttl`.
    async fn put(&self, key: &CacheKey, payload: &DataFrame, ttl: Duration) -> Result<()>;

    /// Removes expired entries.
    ///
    /// Returns the number of entries removed. Lookups already ignore expired
    /// entries, so calling this is never required for correctness.
    async fn invalidate_stale(&self) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
