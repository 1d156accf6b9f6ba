//! Per-request outcome reporting.
//!
//! Every routed request returns the records together with the list of
//! adapters that were tried and what happened at each one. Consumers use it
//! to tell "no data exists" apart from "the source that has it is not
//! configured".

use std::fmt::Write as _;

use crate::error::{DataError, Result};
use crate::types::Provenance;

/// What happened when one adapter was tried.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Served from the cache without a remote call.
    CacheHit {
        /// Number of records served.
        rows: usize,
    },
    /// Fetched from the remote source.
    Fetched {
        /// Number of records fetched.
        rows: usize,
    },
    /// The adapter answered with no records.
    Empty,
    /// The adapter was unavailable and never called.
    Skipped(DataError),
    /// The adapter was called and failed.
    Failed(DataError),
}

impl AttemptOutcome {
    /// Returns true if the attempt produced at least one record.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self {
            Self::CacheHit { rows } | Self::Fetched { rows } => *rows > 0,
            _ => false,
        }
    }
}

/// One adapter tried for a request.
#[derive(Debug)]
pub struct Attempt {
    /// Provenance of the adapter.
    pub provenance: Provenance,
    /// Adapter name.
    pub adapter: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

impl Attempt {
    /// Creates an attempt record.
    #[must_use]
    pub fn new(provenance: Provenance, adapter: impl Into<String>, outcome: AttemptOutcome) -> Self {
        Self {
            provenance,
            adapter: adapter.into(),
            outcome,
        }
    }
}

pub(crate) fn summarize(attempts: &[Attempt]) -> String {
    let mut out = String::new();
    for (i, attempt) in attempts.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = match &attempt.outcome {
            AttemptOutcome::CacheHit { rows } => write!(out, "{}: cache hit ({rows})", attempt.adapter),
            AttemptOutcome::Fetched { rows } => write!(out, "{}: fetched ({rows})", attempt.adapter),
            AttemptOutcome::Empty => write!(out, "{}: empty", attempt.adapter),
            AttemptOutcome::Skipped(e) => write!(out, "{}: skipped ({e})", attempt.adapter),
            AttemptOutcome::Failed(e) => write!(out, "{}: failed ({e})", attempt.adapter),
        };
    }
    if out.is_empty() {
        out.push_str("no capable adapter");
    }
    out
}

/// Records returned by a routed request, with diagnostics.
#[derive(Debug)]
pub struct Fetched<T> {
    /// The records, possibly empty.
    pub records: Vec<T>,
    /// The adapter that supplied the records, if any did.
    pub source: Option<Provenance>,
    /// Every adapter tried, in trial order.
    pub attempts: Vec<Attempt>,
}

impl<T> Fetched<T> {
    /// Returns true if no records were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns the first missing-credential diagnostic among the attempts.
    #[must_use]
    pub fn missing_credential(&self) -> Option<&str> {
        self.attempts.iter().find_map(|a| match &a.outcome {
            AttemptOutcome::Skipped(DataError::MissingCredential { provider }) => {
                Some(provider.as_str())
            }
            _ => None,
        })
    }

    /// Consumes the result and returns the records.
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Returns the records, or the first skip reason when nothing was found
    /// and some adapter was skipped.
    ///
    /// Useful for callers that want a missing credential to surface as an
    /// error instead of an empty list.
    pub fn require(self) -> Result<Vec<T>> {
        if self.records.is_empty() {
            let skipped = self.attempts.into_iter().find_map(|a| match a.outcome {
                AttemptOutcome::Skipped(e) => Some(e),
                _ => None,
            });
            if let Some(err) = skipped {
                return Err(err);
            }
        }
        Ok(self.records)
    }
}
