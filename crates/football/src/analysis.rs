//! Composite match analysis and model features.
//!
//! [`AnalysisBuilder`] issues several manager requests for one fixture and
//! joins them by team name. A sub-request that fails is logged and left out;
//! the analysis itself never fails.

use std::collections::BTreeMap;
use std::fmt;

use football_core::{
    EloRating, Fetched, LiveMatchState, OddsRecord, Operation, Provenance, Result, TeamStatRow,
    XgRecord,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::manager::HybridDataManager;
use crate::routing::Preference;

/// Elo rating assumed for a team missing from the ratings.
pub const ELO_BASELINE: f64 = 1500.0;

/// Number of recent odds rows kept in an analysis.
pub const DEFAULT_ODDS_SAMPLE: usize = 5;

/// Named numeric features; absent inputs are omitted.
pub type FeatureVector = BTreeMap<String, f64>;

/// One contribution to an analysis: which operation answered, from where.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SourceTag {
    /// Operation that returned data.
    pub operation: Operation,
    /// Adapter that supplied it.
    pub provenance: Provenance,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provenance, self.operation)
    }
}

/// Joined view of one fixture.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// League slug.
    pub league: String,
    /// Season label.
    pub season: String,
    /// Home team as requested.
    pub home_team: String,
    /// Away team as requested.
    pub away_team: String,
    /// Home team season statistics.
    pub home_stats: Option<TeamStatRow>,
    /// Away team season statistics.
    pub away_stats: Option<TeamStatRow>,
    /// Mean xG of the home team in its home matches.
    pub home_avg_xg: Option<f64>,
    /// Mean xG of the away team in its away matches.
    pub away_avg_xg: Option<f64>,
    /// Home team Elo rating.
    pub home_elo: Option<EloRating>,
    /// Away team Elo rating.
    pub away_elo: Option<EloRating>,
    /// Most recent odds involving either team, oldest first.
    pub odds_sample: Vec<OddsRecord>,
    /// The fixture, if it is in play right now.
    pub live: Option<LiveMatchState>,
    /// Contributions in the order they succeeded.
    pub data_sources: Vec<SourceTag>,
}

impl AnalysisResult {
    fn tag<T>(&mut self, operation: Operation, fetched: &Fetched<T>) {
        if let Some(provenance) = fetched.source {
            let tag = SourceTag {
                operation,
                provenance,
            };
            if !self.data_sources.contains(&tag) {
                self.data_sources.push(tag);
            }
        }
    }
}

/// Case-insensitive containment, the loose team-name match.
fn mentions(candidate: &str, team: &str) -> bool {
    candidate.to_lowercase().contains(&team.to_lowercase())
}

/// Finds one row for a team: an exact case-insensitive match first, then
/// containment.
fn find_team<'a, T>(rows: &'a [T], team: &str, name: impl Fn(&T) -> &str) -> Option<&'a T> {
    rows.iter()
        .find(|r| name(r).eq_ignore_ascii_case(team))
        .or_else(|| rows.iter().find(|r| mentions(name(r), team)))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn home_avg_xg(xg: &[XgRecord], team: &str) -> Option<f64> {
    mean(
        xg.iter()
            .filter(|r| mentions(&r.home_team, team))
            .filter_map(|r| r.home_xg),
    )
}

fn away_avg_xg(xg: &[XgRecord], team: &str) -> Option<f64> {
    mean(
        xg.iter()
            .filter(|r| mentions(&r.away_team, team))
            .filter_map(|r| r.away_xg),
    )
}

/// Keeps a sub-request's records, logging failures.
fn settle<T>(operation: Operation, result: Result<Fetched<T>>) -> Option<Fetched<T>> {
    match result {
        Ok(fetched) if fetched.is_empty() => {
            debug!(operation = %operation, "No data for analysis input");
            None
        }
        Ok(fetched) => Some(fetched),
        Err(e) => {
            warn!(operation = %operation, error = %e, "Analysis input failed, skipping");
            None
        }
    }
}

/// Builds analyses and feature vectors from manager requests.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisBuilder<'a> {
    manager: &'a HybridDataManager,
    odds_sample: usize,
}

impl<'a> AnalysisBuilder<'a> {
    /// Create a builder over a manager.
    #[must_use]
    pub const fn new(manager: &'a HybridDataManager) -> Self {
        Self {
            manager,
            odds_sample: DEFAULT_ODDS_SAMPLE,
        }
    }

    /// Set how many recent odds rows an analysis keeps.
    #[must_use]
    pub const fn with_odds_sample(mut self, rows: usize) -> Self {
        self.odds_sample = rows;
        self
    }

    /// Join statistics, xG, Elo, odds and live state for one fixture.
    ///
    /// Live scores are requested only when the live adapter is available.
    pub async fn match_analysis(
        &self,
        league: &str,
        season: &str,
        home_team: &str,
        away_team: &str,
    ) -> AnalysisResult {
        let mut analysis = AnalysisResult {
            league: league.to_string(),
            season: season.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            ..AnalysisResult::default()
        };

        if let Some(stats) = settle(
            Operation::TeamStats,
            self.manager.team_stats(league, season, Preference::Auto).await,
        ) {
            analysis.tag(Operation::TeamStats, &stats);
            analysis.home_stats = find_team(&stats.records, home_team, |r| &r.team).cloned();
            analysis.away_stats = find_team(&stats.records, away_team, |r| &r.team).cloned();
        }

        if let Some(xg) = settle(
            Operation::Xg,
            self.manager.xg(league, season, Preference::Auto).await,
        ) {
            analysis.tag(Operation::Xg, &xg);
            analysis.home_avg_xg = home_avg_xg(&xg.records, home_team);
            analysis.away_avg_xg = away_avg_xg(&xg.records, away_team);
        }

        if let Some(elo) = settle(
            Operation::EloRatings,
            self.manager.elo_ratings(None, Preference::Auto).await,
        ) {
            analysis.tag(Operation::EloRatings, &elo);
            analysis.home_elo = find_team(&elo.records, home_team, |r| &r.team).cloned();
            analysis.away_elo = find_team(&elo.records, away_team, |r| &r.team).cloned();
        }

        if let Some(odds) = settle(
            Operation::HistoricalOdds,
            self.manager.historical_odds(league, season, Preference::Auto).await,
        ) {
            analysis.tag(Operation::HistoricalOdds, &odds);
            let relevant: Vec<&OddsRecord> = odds
                .records
                .iter()
                .filter(|r| mentions(&r.home_team, home_team) || mentions(&r.away_team, away_team))
                .collect();
            let skip = relevant.len().saturating_sub(self.odds_sample);
            analysis.odds_sample = relevant.into_iter().skip(skip).cloned().collect();
        }

        if self.manager.is_available(Provenance::Live) {
            if let Some(live) = settle(
                Operation::LiveScores,
                self.manager.live_scores(Preference::Auto).await,
            ) {
                analysis.tag(Operation::LiveScores, &live);
                analysis.live = live
                    .records
                    .iter()
                    .find(|m| mentions(&m.home_team, home_team) && mentions(&m.away_team, away_team))
                    .cloned();
            }
        }

        analysis
    }

    /// Flat numeric features for one fixture.
    ///
    /// Team statistics give `home_*`/`away_*` counts and xG totals; Elo gives
    /// `home_elo`, `away_elo` and `elo_diff` when ratings are returned, with
    /// [`ELO_BASELINE`] standing in for a team missing from them; xG gives
    /// `home_avg_xg_home` and `away_avg_xg_away` when the teams have matching
    /// matches.
    pub async fn prediction_features(
        &self,
        league: &str,
        season: &str,
        home_team: &str,
        away_team: &str,
    ) -> FeatureVector {
        let mut features = FeatureVector::new();

        if let Some(stats) = settle(
            Operation::TeamStats,
            self.manager.team_stats(league, season, Preference::Auto).await,
        ) {
            for (side, team) in [("home", home_team), ("away", away_team)] {
                if let Some(row) = find_team(&stats.records, team, |r| &r.team) {
                    insert_stats(&mut features, side, row);
                }
            }
        }

        if let Some(elo) = settle(
            Operation::EloRatings,
            self.manager.elo_ratings(None, Preference::Auto).await,
        ) {
            let rating = |team: &str| {
                find_team(&elo.records, team, |r| &r.team).map_or(ELO_BASELINE, |r| r.elo)
            };
            let (home_elo, away_elo) = (rating(home_team), rating(away_team));
            features.insert("home_elo".to_string(), home_elo);
            features.insert("away_elo".to_string(), away_elo);
            features.insert("elo_diff".to_string(), home_elo - away_elo);
        }

        if let Some(xg) = settle(
            Operation::Xg,
            self.manager.xg(league, season, Preference::Auto).await,
        ) {
            if let Some(v) = home_avg_xg(&xg.records, home_team) {
                features.insert("home_avg_xg_home".to_string(), v);
            }
            if let Some(v) = away_avg_xg(&xg.records, away_team) {
                features.insert("away_avg_xg_away".to_string(), v);
            }
        }

        features
    }
}

#[allow(clippy::cast_precision_loss)]
fn insert_stats(features: &mut FeatureVector, side: &str, row: &TeamStatRow) {
    let counts = [
        ("matches_played", row.matches_played),
        ("goals", row.goals),
        ("goals_against", row.goals_against),
        ("wins", row.wins),
        ("draws", row.draws),
        ("losses", row.losses),
    ];
    for (name, value) in counts {
        if let Some(v) = value {
            features.insert(format!("{side}_{name}"), v as f64);
        }
    }
    for (name, value) in [("xg", row.xg), ("xga", row.xga)] {
        if let Some(v) = value {
            features.insert(format!("{side}_{name}"), v);
        }
    }
}
