//! SQLite-based cache implementation.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use football_core::{CacheKey, CacheStore, DataError, Result, is_expired};
use polars::prelude::DataFrame;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument, warn};

use crate::codec;

/// SQLite-based cache for record frames.
///
/// This cache stores every entry in a single database file, providing
/// persistence across restarts without a directory tree. Payloads are stored
/// as parquet blobs.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DataError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DataError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS frame_cache (
                namespace TEXT NOT NULL,
                digest TEXT NOT NULL,
                payload BLOB NOT NULL,
                cached_at TEXT NOT NULL,
                ttl_ms INTEGER NOT NULL,
                PRIMARY KEY (namespace, digest)
            )",
            [],
        )
        .map_err(|e| DataError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }

    fn lookup(&self, key: &CacheKey) -> Result<Option<DataFrame>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Cache(e.to_string()))?;

        let row = conn
            .query_row(
                "SELECT payload, cached_at, ttl_ms FROM frame_cache
                 WHERE namespace = ?1 AND digest = ?2",
                params![key.namespace(), key.digest()],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| DataError::Cache(e.to_string()))?;

        let Some((payload, cached_at, ttl_ms)) = row else {
            return Ok(None);
        };

        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map_err(|e| DataError::CacheCorruption(e.to_string()))?
            .with_timezone(&Utc);
        let ttl = Duration::from_millis(u64::try_from(ttl_ms).unwrap_or(0));

        if is_expired(cached_at, ttl, Utc::now()) {
            conn.execute(
                "DELETE FROM frame_cache WHERE namespace = ?1 AND digest = ?2",
                params![key.namespace(), key.digest()],
            )
            .map_err(|e| DataError::Cache(e.to_string()))?;
            debug!("Evicted expired SQLite entry");
            return Ok(None);
        }

        codec::decode(payload).map(Some)
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Option<DataFrame> {
        match self.lookup(key) {
            Ok(Some(frame)) => {
                debug!(rows = frame.height(), "SQLite cache hit");
                Some(frame)
            }
            Ok(None) => {
                debug!("SQLite cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "Unreadable SQLite cache entry, treating as miss");
                None
            }
        }
    }

    #[instrument(skip(self, payload), fields(key = %key, rows = payload.height()))]
    async fn put(&self, key: &CacheKey, payload: &DataFrame, ttl: Duration) -> Result<()> {
        let bytes = codec::encode(payload)?;
        let cached_at = Utc::now().to_rfc3339();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO frame_cache
             (namespace, digest, payload, cached_at, ttl_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key.namespace(), key.digest(), bytes, cached_at, ttl_ms],
        )
        .map_err(|e| DataError::Cache(e.to_string()))?;

        debug!("Cached {} rows in SQLite", payload.height());
        Ok(())
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Cache(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT namespace, digest, cached_at, ttl_ms FROM frame_cache")
            .map_err(|e| DataError::Cache(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(|e| DataError::Cache(e.to_string()))?;

        let now = Utc::now();
        let mut stale = Vec::new();
        for row in rows {
            let (namespace, digest, cached_at, ttl_ms) =
                row.map_err(|e| DataError::Cache(e.to_string()))?;
            let expired = DateTime::parse_from_rfc3339(&cached_at).map_or(true, |t| {
                let ttl = Duration::from_millis(u64::try_from(ttl_ms).unwrap_or(0));
                is_expired(t.with_timezone(&Utc), ttl, now)
            });
            if expired {
                stale.push((namespace, digest));
            }
        }
        drop(stmt);

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        for (namespace, digest) in &stale {
            tx.execute(
                "DELETE FROM frame_cache WHERE namespace = ?1 AND digest = ?2",
                params![namespace, digest],
            )
            .map_err(|e| DataError::Cache(e.to_string()))?;
        }
        tx.commit().map_err(|e| DataError::Cache(e.to_string()))?;

        debug!(removed = stale.len(), "Removed stale SQLite entries");
        Ok(stale.len())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DataError::Cache(e.to_string()))?;
        conn.execute("DELETE FROM frame_cache", [])
            .map_err(|e| DataError::Cache(e.to_string()))?;
        debug!("Cleared SQLite cache");
        Ok(())
    }
}
