#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/footballanalytics/football-data/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for hybrid football data providers.
//!
//! This crate provides the foundational abstractions for working with football data:
//!
//! - [`SourceAdapter`](adapter::SourceAdapter) - Capability-typed wrapper around one provider
//! - [`CacheStore`](cache::CacheStore) - TTL-bounded, content-addressed cache abstraction
//! - [`Transport`](transport::Transport) - Remote call seam shared by all adapters
//! - [`Record`](record::Record) - Mapping between typed records and columnar frames

/// Source adapter trait and availability model.
pub mod adapter;
/// Cache trait and content-addressed cache keys.
pub mod cache;
/// Error types for data operations.
pub mod error;
mod frame;
/// Logical operations, capability sets, and request parameters.
pub mod operation;
/// Per-request outcomes and adapter diagnostics.
pub mod outcome;
/// Fixed-delay pacing for remote calls.
pub mod pacing;
/// Record sets and the record/frame mapping.
pub mod record;
/// Remote transport abstraction.
pub mod transport;
/// Normalized record types (Fixture, TeamStatRow, EloRating, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use adapter::{Availability, AvailabilityProbe, SourceAdapter};
pub use cache::{CacheKey, CacheStore, is_expired};
pub use error::{DataError, Result};
pub use operation::{CapabilitySet, Operation, ParamValue, Params};
pub use outcome::{Attempt, AttemptOutcome, Fetched};
pub use pacing::RateLimiter;
pub use record::{Record, RecordSet};
pub use transport::{HttpTransport, RemoteRequest, StaticTransport, Transport};
pub use types::{
    EloRating, Fixture, LiveMatchState, OddsRecord, Prediction, Provenance, ShotEvent,
    StandingRow, TeamStatRow, XgRecord,
};
