#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/footballanalytics/football-data/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified football data access over a historical and a live provider.
//!
//! This crate re-exports the core types, the cache implementations and both
//! adapters, and provides the [`HybridDataManager`] that routes requests
//! between them.
//!
//! # Example
//!
//! ```rust,ignore
//! use football::{AnalysisBuilder, HybridConfig, HybridDataManager, Preference};
//!
//! #[tokio::main]
//! async fn main() -> football::Result<()> {
//!     let manager = HybridDataManager::from_config(&HybridConfig::from_env()?)?;
//!
//!     let fixtures = manager
//!         .fixtures("premier-league", "2023-2024", Preference::Auto)
//!         .await?;
//!     println!("{} fixtures", fixtures.len());
//!
//!     let live = manager.live_scores(Preference::Auto).await?;
//!     if let Some(provider) = live.missing_credential() {
//!         println!("live scores need a {provider} token");
//!     }
//!
//!     let features = AnalysisBuilder::new(&manager)
//!         .prediction_features("premier-league", "2023-2024", "Arsenal", "Chelsea")
//!         .await;
//!     println!("{features:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use football_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use football_cache::SqliteCache;
pub use football_cache::{DiskCache, InMemoryCache, NoopCache, TieredCache};

// Adapters
pub use football_soccerdata::HistoricalAdapter;
pub use football_sportmonks::LiveAdapter;

/// Match analysis and feature vectors.
pub mod analysis;
/// Engine configuration.
pub mod config;
/// Request orchestration.
pub mod manager;
/// Adapter selection per operation.
pub mod routing;

pub use analysis::{AnalysisBuilder, AnalysisResult, ELO_BASELINE, FeatureVector, SourceTag};
pub use config::HybridConfig;
pub use manager::{HybridDataManager, SourceStatus};
pub use routing::{Preference, RoutingPolicy};
