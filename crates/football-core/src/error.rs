//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when routing, fetching, normalizing, or caching football data.

use std::time::Duration;

use thiserror::Error;

use crate::operation::Operation;
use crate::outcome::{Attempt, summarize};

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// The provider needs a credential that was not configured.
    #[error("Missing credential for provider {provider}")]
    MissingCredential {
        /// The provider lacking a credential.
        provider: String,
    },

    /// The provider's backend is not usable in this process.
    #[error("Provider {provider} unavailable: {reason}")]
    Unavailable {
        /// The unavailable provider.
        provider: String,
        /// Why the availability probe failed.
        reason: String,
    },

    /// The adapter does not declare the requested capability.
    #[error("Operation {operation} is not supported by {adapter}")]
    UnsupportedOperation {
        /// The adapter that was asked.
        adapter: String,
        /// The operation it lacks.
        operation: Operation,
    },

    /// Transport or HTTP failure talking to a provider.
    #[error("Upstream request to {provider} failed: {message}")]
    Upstream {
        /// The provider that failed.
        provider: String,
        /// Transport or HTTP error detail.
        message: String,
    },

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// The league slug has no identifier in the provider's league table.
    #[error("League {league} is not mapped for provider {provider}")]
    UnknownLeague {
        /// The provider whose table was consulted.
        provider: String,
        /// The unmapped league slug.
        league: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A cache entry could not be read back.
    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every candidate adapter was unavailable or failed, and at least one failed.
    #[error("All sources failed for {operation}: {}", summarize(.attempts))]
    AllSourcesFailed {
        /// The operation that was requested.
        operation: Operation,
        /// Per-adapter outcomes, in trial order.
        attempts: Vec<Attempt>,
    },

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if this error means the adapter was never called.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Unavailable { .. }
        )
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
