//! Adapter selection per operation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use football_core::{DataError, Operation, Provenance, Result, SourceAdapter};

/// Which adapters a caller wants consulted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Preference {
    /// Follow the routing table.
    #[default]
    Auto,
    /// Only the historical adapter.
    Historical,
    /// Only the live adapter.
    Live,
}

impl Preference {
    /// Returns the stable lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Historical => "historical",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "historical" | "soccerdata" => Ok(Self::Historical),
            "live" | "sportmonks" => Ok(Self::Live),
            other => Err(DataError::InvalidParameter(format!(
                "Unknown source preference: {other}"
            ))),
        }
    }
}

impl From<Provenance> for Preference {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Historical => Self::Historical,
            Provenance::Live => Self::Live,
        }
    }
}

/// Static routing table from operation to adapter trial order.
///
/// The order reflects which provider actually offers the data: the free
/// historical source first wherever it has the operation, the live source
/// for in-play data and provider-only products.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoutingPolicy;

impl RoutingPolicy {
    /// Trial order for an operation under [`Preference::Auto`].
    #[must_use]
    pub const fn order(&self, operation: Operation) -> &'static [Provenance] {
        use Provenance::{Historical, Live};
        match operation {
            Operation::Fixtures | Operation::Xg => &[Historical, Live],
            Operation::TeamStats
            | Operation::ShotCoordinates
            | Operation::HistoricalOdds
            | Operation::EloRatings => &[Historical],
            Operation::LiveOdds
            | Operation::LiveScores
            | Operation::Predictions
            | Operation::Standings => &[Live],
        }
    }

    /// Returns the adapters to try, in order.
    ///
    /// Availability is not filtered here; the caller records unavailable
    /// candidates as skipped. With an explicit preference the single matching
    /// adapter must declare the operation.
    ///
    /// # Errors
    /// Returns [`DataError::UnsupportedOperation`] if the preferred adapter is
    /// not registered or does not declare the operation.
    pub fn resolve(
        &self,
        operation: Operation,
        preference: Preference,
        adapters: &[Arc<dyn SourceAdapter>],
    ) -> Result<Vec<Arc<dyn SourceAdapter>>> {
        let find = |provenance: Provenance| {
            adapters
                .iter()
                .find(|a| a.provenance() == provenance)
                .cloned()
        };

        let explicit = match preference {
            Preference::Auto => None,
            Preference::Historical => Some(Provenance::Historical),
            Preference::Live => Some(Provenance::Live),
        };

        let Some(provenance) = explicit else {
            return Ok(self
                .order(operation)
                .iter()
                .filter_map(|p| find(*p))
                .filter(|a| a.supports(operation))
                .collect());
        };

        match find(provenance) {
            Some(adapter) if adapter.supports(operation) => Ok(vec![adapter]),
            Some(adapter) => Err(DataError::UnsupportedOperation {
                adapter: adapter.name().to_string(),
                operation,
            }),
            None => Err(DataError::UnsupportedOperation {
                adapter: provenance.to_string(),
                operation,
            }),
        }
    }
}
