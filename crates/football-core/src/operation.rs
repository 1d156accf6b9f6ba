//! Logical operations, capability sets, and request parameters.
//!
//! An [`Operation`] names one data request a consumer can make. Adapters
//! declare the operations they serve as a [`CapabilitySet`]; requests carry
//! their arguments as [`Params`], whose canonical form feeds the cache key.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// A logical data operation, which doubles as a capability name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Match schedule and results.
    Fixtures,
    /// Season-level team statistics.
    TeamStats,
    /// Match-level expected goals.
    Xg,
    /// Shot events with pitch coordinates.
    ShotCoordinates,
    /// Closing odds from past matches.
    HistoricalOdds,
    /// In-play odds for a fixture.
    LiveOdds,
    /// Matches currently in play.
    LiveScores,
    /// Club Elo ratings.
    EloRatings,
    /// Provider outcome probabilities for a fixture.
    Predictions,
    /// League table.
    Standings,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Fixtures,
        Self::TeamStats,
        Self::Xg,
        Self::ShotCoordinates,
        Self::HistoricalOdds,
        Self::LiveOdds,
        Self::LiveScores,
        Self::EloRatings,
        Self::Predictions,
        Self::Standings,
    ];

    /// Returns the stable snake_case name used in cache keys and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixtures => "fixtures",
            Self::TeamStats => "team_stats",
            Self::Xg => "xg",
            Self::ShotCoordinates => "shot_coordinates",
            Self::HistoricalOdds => "historical_odds",
            Self::LiveOdds => "live_odds",
            Self::LiveScores => "live_scores",
            Self::EloRatings => "elo_ratings",
            Self::Predictions => "predictions",
            Self::Standings => "standings",
        }
    }

    /// Returns true if every capable adapter is consulted for this operation
    /// rather than stopping at the first candidate that answers.
    #[must_use]
    pub const fn is_merge(&self) -> bool {
        matches!(self, Self::Xg)
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| DataError::InvalidParameter(format!("Unknown operation: {s}")))
    }
}

/// Immutable set of operations an adapter can serve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from a list of operations.
    #[must_use]
    pub const fn of(operations: &[Operation]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < operations.len() {
            bits |= operations[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns true if the set contains the operation.
    #[must_use]
    pub const fn contains(&self, operation: Operation) -> bool {
        self.0 & operation.bit() != 0
    }

    /// Returns a copy of the set with the operation added.
    #[must_use]
    pub const fn with(self, operation: Operation) -> Self {
        Self(self.0 | operation.bit())
    }

    /// Returns the number of operations in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained operations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }
}

/// A single request parameter value.
///
/// Values keep their type in the canonical form, so the text `"2023"` and the
/// integer `2023` never produce the same cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A string value.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Flag(bool),
}

impl ParamValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Flag(b) => serde_json::Value::Bool(*b),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(date: NaiveDate) -> Self {
        Self::Text(date.format("%Y-%m-%d").to_string())
    }
}

/// Request parameters, kept sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the common `(league, season)` parameter pair.
    #[must_use]
    pub fn league_season(league: impl Into<String>, season: impl Into<String>) -> Self {
        Self::new()
            .with("league", league.into())
            .with("season", season.into())
    }

    /// Adds a parameter, replacing any previous value for the key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Returns a text parameter.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns a text parameter or an [`DataError::InvalidParameter`] error.
    pub fn require_text(&self, key: &str) -> Result<&str> {
        self.text(key)
            .ok_or_else(|| DataError::InvalidParameter(format!("missing text parameter `{key}`")))
    }

    /// Returns an integer parameter, accepting numeric text as well.
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            ParamValue::Integer(n) => Some(*n),
            ParamValue::Text(s) => s.parse().ok(),
            ParamValue::Flag(_) => None,
        }
    }

    /// Returns an integer parameter or an [`DataError::InvalidParameter`] error.
    pub fn require_integer(&self, key: &str) -> Result<i64> {
        self.integer(key)
            .ok_or_else(|| DataError::InvalidParameter(format!("missing integer parameter `{key}`")))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Type-stable serialization with sorted keys, used for cache keys.
    #[must_use]
    pub fn canonical(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
