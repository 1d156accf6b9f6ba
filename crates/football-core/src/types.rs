//! Normalized record types for football data.
//!
//! Every provider maps its wire schema into these records. Each record carries
//! the [`Provenance`] of the adapter that produced it; it is set during
//! normalization and never inferred afterwards.
//!
//! - [`Fixture`] - Scheduled or played match
//! - [`TeamStatRow`] - Season aggregates for one team
//! - [`XgRecord`] - Match-level expected goals
//! - [`ShotEvent`] - Single shot with pitch coordinates
//! - [`OddsRecord`] - 1X2 prices from one bookmaker
//! - [`EloRating`] - Club Elo rating
//! - [`LiveMatchState`] - Snapshot of an in-play match
//! - [`Prediction`] - Provider outcome probabilities
//! - [`StandingRow`] - League table row

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Which adapter produced a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The free, historical provider.
    Historical,
    /// The paid, live provider.
    Live,
}

impl Provenance {
    /// Returns the stable lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Historical => "historical",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" | "soccerdata" => Ok(Self::Historical),
            "live" | "sportmonks" => Ok(Self::Live),
            other => Err(DataError::Parse(format!("Unknown provenance: {other}"))),
        }
    }
}

/// A scheduled or played match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Provider fixture identifier.
    pub id: String,
    /// Match date.
    pub date: NaiveDate,
    /// Provider league identifier.
    pub league_id: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Home goals; absent until the match has started.
    pub home_score: Option<i64>,
    /// Away goals; absent until the match has started.
    pub away_score: Option<i64>,
    /// Venue name.
    pub venue: Option<String>,
    /// Provider match state (e.g. "NS", "FT").
    pub state: String,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

impl Fixture {
    /// Creates an unplayed fixture with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        league_id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            league_id: league_id.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: None,
            away_score: None,
            venue: None,
            state: "NS".to_string(),
            provenance,
        }
    }

    /// Sets the score.
    #[must_use]
    pub const fn with_score(mut self, home: i64, away: i64) -> Self {
        self.home_score = Some(home);
        self.away_score = Some(away);
        self
    }

    /// Sets the venue.
    #[must_use]
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Sets the match state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Returns true once a score is known.
    #[must_use]
    pub const fn has_started(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}

/// Season aggregates for one team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStatRow {
    /// Team name.
    pub team: String,
    /// League slug the row was requested for.
    pub league: String,
    /// Season the row was requested for.
    pub season: String,
    /// Matches played.
    pub matches_played: Option<i64>,
    /// Wins.
    pub wins: Option<i64>,
    /// Draws.
    pub draws: Option<i64>,
    /// Losses.
    pub losses: Option<i64>,
    /// Goals scored.
    pub goals: Option<i64>,
    /// Goals conceded.
    pub goals_against: Option<i64>,
    /// Expected goals for.
    pub xg: Option<f64>,
    /// Expected goals against.
    pub xga: Option<f64>,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// Match-level expected goals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XgRecord {
    /// Provider fixture identifier.
    pub fixture_id: String,
    /// Match date.
    pub date: NaiveDate,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Home goals.
    pub home_goals: Option<i64>,
    /// Away goals.
    pub away_goals: Option<i64>,
    /// Home expected goals.
    pub home_xg: Option<f64>,
    /// Away expected goals.
    pub away_xg: Option<f64>,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// A single shot with pitch coordinates.
///
/// Coordinates are fractions of the pitch length (`x`) and width (`y`), from
/// the shooting team's perspective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    /// Provider fixture identifier.
    pub fixture_id: String,
    /// Shooting team.
    pub team: String,
    /// Shooting player.
    pub player: String,
    /// Match minute.
    pub minute: Option<i64>,
    /// Position along the pitch.
    pub x: f64,
    /// Position across the pitch.
    pub y: f64,
    /// Shot expected goals.
    pub xg: Option<f64>,
    /// Shot outcome (e.g. "Goal", "SavedShot").
    pub result: String,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// 1X2 prices from one bookmaker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    /// Provider fixture identifier, when known.
    pub fixture_id: Option<String>,
    /// Match date, when known.
    pub date: Option<NaiveDate>,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Bookmaker identifier.
    pub bookmaker: String,
    /// Decimal price for a home win.
    pub home: Option<f64>,
    /// Decimal price for a draw.
    pub draw: Option<f64>,
    /// Decimal price for an away win.
    pub away: Option<f64>,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// Club Elo rating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    /// Club name.
    pub team: String,
    /// Elo rating.
    pub elo: f64,
    /// Global rank.
    pub rank: Option<i64>,
    /// Country code.
    pub country: Option<String>,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// Snapshot of an in-play match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiveMatchState {
    /// Provider fixture identifier.
    pub fixture_id: String,
    /// Current minute.
    pub minute: Option<i64>,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Current home goals.
    pub home_score: Option<i64>,
    /// Current away goals.
    pub away_score: Option<i64>,
    /// Provider match state (e.g. "1st Half").
    pub state: String,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// Provider outcome probabilities for a fixture, in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Provider fixture identifier.
    pub fixture_id: String,
    /// Home win probability.
    pub home_win: Option<f64>,
    /// Draw probability.
    pub draw: Option<f64>,
    /// Away win probability.
    pub away_win: Option<f64>,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}

/// League table row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    /// Table position.
    pub position: i64,
    /// Team name.
    pub team: String,
    /// Matches played.
    pub played: Option<i64>,
    /// Wins.
    pub won: Option<i64>,
    /// Draws.
    pub drawn: Option<i64>,
    /// Losses.
    pub lost: Option<i64>,
    /// Goals scored.
    pub goals_for: Option<i64>,
    /// Goals conceded.
    pub goals_against: Option<i64>,
    /// Goal difference.
    pub goal_difference: Option<i64>,
    /// Points.
    pub points: i64,
    /// Adapter that produced the record.
    pub provenance: Provenance,
}
