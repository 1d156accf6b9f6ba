#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/footballanalytics/football-data/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for hybrid football data providers.
//!
//! This crate provides implementations of the [`CacheStore`] trait from `football-core`:
//!
//! - [`DiskCache`] - Parquet files with JSON sidecars, one directory per adapter
//! - [`TieredCache`] - Memory in front of disk
//! - [`SqliteCache`] - Single-file SQLite store (requires `sqlite` feature)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

mod codec;
/// Parquet-on-disk cache implementation.
pub mod disk;
/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;
/// Memory-over-disk cache implementation.
pub mod tiered;

/// SQLite-based cache implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use football_core::CacheStore;

// Re-export implementations
pub use disk::DiskCache;
pub use memory::InMemoryCache;
pub use noop::NoopCache;
pub use tiered::TieredCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
