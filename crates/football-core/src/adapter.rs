//! The provider adapter contract.
//!
//! A [`SourceAdapter`] wraps one upstream provider. It declares the
//! operations it can serve, reports whether its backend is usable, and maps
//! provider responses into normalized records tagged with its provenance.

use std::fmt;

use async_trait::async_trait;

use crate::{
    error::{DataError, Result},
    operation::{CapabilitySet, Operation, Params},
    record::RecordSet,
    types::Provenance,
};

/// Whether an adapter's backend can be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    /// The adapter can serve requests.
    Ready,
    /// A required credential is not configured.
    MissingCredential,
    /// The backend cannot be reached or loaded.
    Unavailable(String),
}

impl Availability {
    /// Returns true if the adapter can serve requests.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Converts a non-ready state into the matching error for `provider`.
    #[must_use]
    pub fn to_error(&self, provider: &str) -> Option<DataError> {
        match self {
            Self::Ready => None,
            Self::MissingCredential => Some(DataError::MissingCredential {
                provider: provider.to_string(),
            }),
            Self::Unavailable(reason) => Some(DataError::Unavailable {
                provider: provider.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::MissingCredential => f.write_str("missing credential"),
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}

/// Checks whether a provider backend is usable.
///
/// Adapters run their probe once, at construction. Closures returning an
/// [`Availability`] implement this trait, which lets tests force either state.
pub trait AvailabilityProbe: Send + Sync {
    /// Runs the check.
    fn probe(&self) -> Availability;
}

impl<F> AvailabilityProbe for F
where
    F: Fn() -> Availability + Send + Sync,
{
    fn probe(&self) -> Availability {
        self()
    }
}

/// A provider that can be routed to.
#[async_trait]
pub trait SourceAdapter: Send + Sync + fmt::Debug {
    /// Provenance stamped on every record this adapter produces.
    fn provenance(&self) -> Provenance;

    /// Stable adapter name, also used as the cache namespace.
    fn name(&self) -> &str;

    /// Operations this adapter can serve.
    fn capabilities(&self) -> CapabilitySet;

    /// Backend availability, determined at construction.
    fn availability(&self) -> &Availability;

    /// Returns true if the adapter declares the operation.
    fn supports(&self, operation: Operation) -> bool {
        self.capabilities().contains(operation)
    }

    /// Returns true if the backend is usable.
    fn is_available(&self) -> bool {
        self.availability().is_ready()
    }

    /// Performs a remote fetch and normalizes the result.
    ///
    /// Called only for declared operations on an available adapter. An empty
    /// [`RecordSet`] means the provider had no data; errors mean the fetch
    /// failed.
    async fn fetch(&self, operation: Operation, params: &Params) -> Result<RecordSet>;
}
