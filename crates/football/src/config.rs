//! Engine configuration.
//!
//! [`HybridConfig`] is built once at process start (from the environment,
//! a config file, or by hand) and passed to
//! [`HybridDataManager::from_config`](crate::HybridDataManager::from_config).

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use football_core::{DataError, Result};
use serde::Deserialize;

/// Settings for adapters, pacing, and the cache.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Sportmonks API token; live operations are skipped without it.
    pub live_token: Option<String>,
    /// Base URL of the soccerdata bridge; historical operations are skipped without it.
    pub historical_url: Option<String>,
    /// Root directory of the disk cache.
    pub cache_dir: PathBuf,
    /// Single-file SQLite cache used instead of the disk cache when set.
    pub sqlite_path: Option<PathBuf>,
    /// Cache entry lifetime in hours.
    pub cache_ttl_hours: u64,
    /// Delay before each historical request, in milliseconds.
    pub historical_delay_ms: u64,
    /// Delay before each live request, in milliseconds.
    pub live_delay_ms: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Keep a process memory tier in front of the disk cache.
    pub memory_cache: bool,
    /// Extra league slug to soccerdata league name mappings.
    pub historical_leagues: HashMap<String, String>,
    /// Extra league slug to Sportmonks league id mappings.
    pub live_leagues: HashMap<String, u32>,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            live_token: None,
            historical_url: None,
            cache_dir: PathBuf::from("./data_cache"),
            sqlite_path: None,
            cache_ttl_hours: 24,
            historical_delay_ms: 1000,
            live_delay_ms: 500,
            request_timeout_secs: 30,
            memory_cache: true,
            historical_leagues: HashMap::new(),
            live_leagues: HashMap::new(),
        }
    }
}

impl HybridConfig {
    /// Reads settings from the process environment.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `SPORTMONKS_API_TOKEN` | `live_token` |
    /// | `SOCCERDATA_URL` | `historical_url` |
    /// | `CACHE_DIR` | `cache_dir` |
    /// | `CACHE_SQLITE_PATH` | `sqlite_path` |
    /// | `CACHE_TTL_HOURS` | `cache_ttl_hours` |
    /// | `RATE_LIMIT_DELAY_MS` | `historical_delay_ms` |
    /// | `LIVE_RATE_LIMIT_DELAY_MS` | `live_delay_ms` |
    /// | `REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, using the same keys as [`Self::from_env`].
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a numeric value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self {
            live_token: value("SPORTMONKS_API_TOKEN"),
            historical_url: value("SOCCERDATA_URL"),
            sqlite_path: value("CACHE_SQLITE_PATH").map(PathBuf::from),
            ..Self::default()
        };

        if let Some(dir) = value("CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(hours) = value("CACHE_TTL_HOURS") {
            config.cache_ttl_hours = parse("CACHE_TTL_HOURS", &hours)?;
        }
        if let Some(ms) = value("RATE_LIMIT_DELAY_MS") {
            config.historical_delay_ms = parse("RATE_LIMIT_DELAY_MS", &ms)?;
        }
        if let Some(ms) = value("LIVE_RATE_LIMIT_DELAY_MS") {
            config.live_delay_ms = parse("LIVE_RATE_LIMIT_DELAY_MS", &ms)?;
        }
        if let Some(secs) = value("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse("REQUEST_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }

    /// Cache entry lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(3600))
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| DataError::InvalidParameter(format!("{key}={raw}: {e}")))
}
