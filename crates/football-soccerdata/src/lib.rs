#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/footballanalytics/football-data/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Historical football data adapter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use football_soccerdata::HistoricalAdapter;
//! use football_core::{Operation, Params, SourceAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = HistoricalAdapter::new(Some("http://localhost:8001".to_string()));
//!
//!     let params = Params::league_season("premier-league", "2023-2024");
//!     let fixtures = adapter.fetch(Operation::Fixtures, &params).await?;
//!     println!("{} fixtures", fixtures.len());
//!
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use football_core::{
    Availability, AvailabilityProbe, CapabilitySet, DataError, EloRating, Fixture, HttpTransport,
    OddsRecord, Operation, Params, Provenance, RateLimiter, RecordSet, RemoteRequest, Result,
    ShotEvent, SourceAdapter, TeamStatRow, Transport, XgRecord,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Adapter name, also the cache namespace.
pub const NAME: &str = "soccerdata";

/// Default delay between bridge requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(1);

/// Operations served by the historical provider.
pub const CAPABILITIES: CapabilitySet = CapabilitySet::of(&[
    Operation::Fixtures,
    Operation::TeamStats,
    Operation::Xg,
    Operation::ShotCoordinates,
    Operation::HistoricalOdds,
    Operation::EloRatings,
]);

/// League slug to soccerdata league name.
const LEAGUE_MAPPING: &[(&str, &str)] = &[
    ("premier-league", "ENG-Premier League"),
    ("la-liga", "ESP-La Liga"),
    ("bundesliga", "GER-Bundesliga"),
    ("serie-a", "ITA-Serie A"),
    ("ligue-1", "FRA-Ligue 1"),
    ("super-lig", "TUR-Süper Lig"),
    ("eredivisie", "NED-Eredivisie"),
];

/// Bookmaker whose prices are read from football-data.co.uk games.
const ODDS_BOOKMAKER: &str = "B365";

/// Historical data adapter.
///
/// Provides access to:
/// - FBref schedules and standard team season stats
/// - Understat match xG and shot events
/// - football-data.co.uk closing odds
/// - ClubElo ratings
#[derive(Debug)]
pub struct HistoricalAdapter {
    base_url: Option<String>,
    transport: Arc<dyn Transport>,
    rate_limiter: RateLimiter,
    leagues: HashMap<String, String>,
    availability: Availability,
}

impl HistoricalAdapter {
    /// Create an adapter for the bridge at `base_url`.
    ///
    /// Without a URL the adapter reports itself unavailable and is never
    /// called by the manager.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let availability = bridge_probe(base_url.is_some()).probe();
        Self {
            base_url,
            transport: Arc::new(HttpTransport::with_client(reqwest::Client::new())),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
            leagues: LEAGUE_MAPPING
                .iter()
                .map(|(slug, name)| ((*slug).to_string(), (*name).to_string()))
                .collect(),
            availability,
        }
    }

    /// Use a different transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the delay taken before every bridge request.
    #[must_use]
    pub fn with_rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limiter = RateLimiter::new(delay);
        self
    }

    /// Add or replace league slug mappings.
    #[must_use]
    pub fn with_league_table<I, K, V>(mut self, leagues: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.leagues.extend(
            leagues
                .into_iter()
                .map(|(slug, name)| (slug.into().to_lowercase(), name.into())),
        );
        self
    }

    /// Replace the availability check and run it.
    #[must_use]
    pub fn with_probe(mut self, probe: impl AvailabilityProbe) -> Self {
        self.availability = probe.probe();
        self
    }

    /// Translates a league slug to its soccerdata name.
    ///
    /// Unknown slugs are returned unchanged so callers can pass native
    /// soccerdata names directly.
    #[must_use]
    pub fn map_league(&self, league: &str) -> String {
        self.leagues
            .get(&league.to_lowercase())
            .cloned()
            .unwrap_or_else(|| league.to_string())
    }

    fn base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| DataError::Unavailable {
            provider: NAME.to_string(),
            reason: "no soccerdata bridge configured".to_string(),
        })
    }

    /// Request a bridge endpoint and decode its rows.
    async fn rows<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut request = RemoteRequest::new(format!("{}/{path}", self.base_url()?));
        for (key, value) in query {
            request = request.query(*key, value.clone());
        }

        self.rate_limiter.wait().await;
        debug!("soccerdata request: {}", path);
        let body = self.transport.get(NAME, &request).await?;

        serde_json::from_str(&body).map_err(|e| DataError::Parse(format!("{path}: {e}")))
    }

    fn league_season(&self, params: &Params) -> Result<(String, String, String)> {
        let league = params.require_text("league")?;
        let season = params.require_text("season")?;
        Ok((league.to_string(), self.map_league(league), season.to_string()))
    }

    async fn fixtures(&self, params: &Params) -> Result<Vec<Fixture>> {
        let (_, mapped, season) = self.league_season(params)?;
        let rows: Vec<ScheduleRow> = self
            .rows("fbref/schedule", &[("league", mapped.clone()), ("season", season)])
            .await?;
        let mut fixtures = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(fixture) = row.into_fixture(&mapped)? {
                fixtures.push(fixture);
            }
        }
        Ok(fixtures)
    }

    async fn team_stats(&self, params: &Params) -> Result<Vec<TeamStatRow>> {
        let (league, mapped, season) = self.league_season(params)?;
        let rows: Vec<TeamSeasonRow> = self
            .rows(
                "fbref/team_season_stats",
                &[("league", mapped), ("season", season.clone()), ("stat_type", "standard".to_string())],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_stat(&league, &season))
            .collect())
    }

    async fn xg(&self, params: &Params) -> Result<Vec<XgRecord>> {
        let (_, mapped, season) = self.league_season(params)?;
        let rows: Vec<UnderstatGame> = self
            .rows("understat/schedule", &[("league", mapped), ("season", season)])
            .await?;
        rows.into_iter().map(UnderstatGame::into_xg).collect()
    }

    async fn shots(&self, params: &Params) -> Result<Vec<ShotEvent>> {
        let (_, mapped, season) = self.league_season(params)?;
        let rows: Vec<UnderstatShot> = self
            .rows("understat/shots", &[("league", mapped), ("season", season)])
            .await?;
        rows.into_iter().map(UnderstatShot::into_shot).collect()
    }

    async fn odds(&self, params: &Params) -> Result<Vec<OddsRecord>> {
        let (_, mapped, season) = self.league_season(params)?;
        let rows: Vec<MatchHistoryGame> = self
            .rows("matchhistory/games", &[("league", mapped), ("season", season)])
            .await?;
        rows.into_iter().map(MatchHistoryGame::into_odds).collect()
    }

    async fn elo(&self, params: &Params) -> Result<Vec<EloRating>> {
        let date = params
            .text("date")
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string());
        let rows: Vec<ClubEloRow> = self.rows("clubelo/by_date", &[("date", date)]).await?;
        Ok(rows.into_iter().map(ClubEloRow::into_rating).collect())
    }
}

/// Availability check for the bridge: ready once a URL is configured.
fn bridge_probe(configured: bool) -> impl AvailabilityProbe {
    move || {
        if configured {
            Availability::Ready
        } else {
            Availability::Unavailable("no soccerdata bridge configured".to_string())
        }
    }
}

#[async_trait]
impl SourceAdapter for HistoricalAdapter {
    fn provenance(&self) -> Provenance {
        Provenance::Historical
    }

    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> CapabilitySet {
        CAPABILITIES
    }

    fn availability(&self) -> &Availability {
        &self.availability
    }

    #[instrument(skip(self, params), fields(adapter = NAME, operation = %operation))]
    async fn fetch(&self, operation: Operation, params: &Params) -> Result<RecordSet> {
        match operation {
            Operation::Fixtures => self.fixtures(params).await.map(RecordSet::Fixtures),
            Operation::TeamStats => self.team_stats(params).await.map(RecordSet::TeamStats),
            Operation::Xg => self.xg(params).await.map(RecordSet::Xg),
            Operation::ShotCoordinates => self.shots(params).await.map(RecordSet::Shots),
            Operation::HistoricalOdds => self.odds(params).await.map(RecordSet::Odds),
            Operation::EloRatings => self.elo(params).await.map(RecordSet::Elo),
            _ => Err(DataError::UnsupportedOperation {
                adapter: NAME.to_string(),
                operation,
            }),
        }
    }
}

// --- Bridge wire models (soccerdata column names) ---

/// Parses the date part of a soccerdata date or datetime string.
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("Invalid date {raw}: {e}")))
}

/// Converts a numeric cell to a count; pandas serializes integer columns
/// with missing values as floats.
#[allow(clippy::cast_possible_truncation)]
fn count(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i64)
}

/// Parses an FBref score such as `"2–1"`. Extra-time annotations after the
/// second number are ignored.
fn parse_score(score: &str) -> Option<(i64, i64)> {
    let mut parts = score.split(['–', '-']).map(str::trim);
    let home = parts.next()?.parse().ok()?;
    let away: String = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    Some((home, away.parse().ok()?))
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    #[serde(default)]
    league: Option<String>,
    date: Option<String>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    game_id: Option<String>,
}

impl ScheduleRow {
    /// Rows without a date (postponed, not yet rescheduled) are skipped; a
    /// date that does not parse is an error.
    fn into_fixture(self, league: &str) -> Result<Option<Fixture>> {
        let Some(raw_date) = self.date else {
            warn!(home = %self.home_team, away = %self.away_team, "Skipping undated fixture");
            return Ok(None);
        };
        let date = parse_date(&raw_date)?;
        let id = self
            .game_id
            .unwrap_or_else(|| format!("{date}-{}-{}", self.home_team, self.away_team));
        let league_id = self.league.unwrap_or_else(|| league.to_string());

        let mut fixture = Fixture::new(id, date, league_id, self.home_team, self.away_team, Provenance::Historical);
        if let Some((home, away)) = self.score.as_deref().and_then(parse_score) {
            fixture = fixture.with_score(home, away).with_state("FT");
        }
        if let Some(venue) = self.venue.filter(|v| !v.is_empty()) {
            fixture = fixture.with_venue(venue);
        }
        Ok(Some(fixture))
    }
}

#[derive(Debug, Deserialize)]
struct TeamSeasonRow {
    team: String,
    #[serde(default, alias = "MP", alias = "Playing Time_MP")]
    matches_played: Option<f64>,
    #[serde(default, alias = "W")]
    wins: Option<f64>,
    #[serde(default, alias = "D")]
    draws: Option<f64>,
    #[serde(default, alias = "L")]
    losses: Option<f64>,
    #[serde(default, alias = "Gls", alias = "Performance_Gls")]
    goals: Option<f64>,
    #[serde(default, alias = "GA")]
    goals_against: Option<f64>,
    #[serde(default, alias = "xG", alias = "Expected_xG")]
    xg: Option<f64>,
    #[serde(default, alias = "xGA")]
    xga: Option<f64>,
}

impl TeamSeasonRow {
    fn into_stat(self, league: &str, season: &str) -> TeamStatRow {
        TeamStatRow {
            team: self.team,
            league: league.to_string(),
            season: season.to_string(),
            matches_played: count(self.matches_played),
            wins: count(self.wins),
            draws: count(self.draws),
            losses: count(self.losses),
            goals: count(self.goals),
            goals_against: count(self.goals_against),
            xg: self.xg,
            xga: self.xga,
            provenance: Provenance::Historical,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UnderstatGame {
    game_id: serde_json::Value,
    date: String,
    home_team: String,
    away_team: String,
    #[serde(default)]
    home_goals: Option<f64>,
    #[serde(default)]
    away_goals: Option<f64>,
    #[serde(default)]
    home_xg: Option<f64>,
    #[serde(default)]
    away_xg: Option<f64>,
}

impl UnderstatGame {
    fn into_xg(self) -> Result<XgRecord> {
        Ok(XgRecord {
            fixture_id: id_string(&self.game_id),
            date: parse_date(&self.date)?,
            home_team: self.home_team,
            away_team: self.away_team,
            home_goals: count(self.home_goals),
            away_goals: count(self.away_goals),
            home_xg: self.home_xg,
            away_xg: self.away_xg,
            provenance: Provenance::Historical,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UnderstatShot {
    game_id: serde_json::Value,
    team: String,
    player: String,
    #[serde(default)]
    minute: Option<f64>,
    location_x: Option<f64>,
    location_y: Option<f64>,
    #[serde(default)]
    xg: Option<f64>,
    #[serde(default)]
    result: Option<String>,
}

impl UnderstatShot {
    fn into_shot(self) -> Result<ShotEvent> {
        let (Some(x), Some(y)) = (self.location_x, self.location_y) else {
            return Err(DataError::Parse(format!(
                "Shot by {} in game {} has no location",
                self.player,
                id_string(&self.game_id)
            )));
        };
        Ok(ShotEvent {
            fixture_id: id_string(&self.game_id),
            team: self.team,
            player: self.player,
            minute: count(self.minute),
            x,
            y,
            xg: self.xg,
            result: self.result.unwrap_or_default(),
            provenance: Provenance::Historical,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MatchHistoryGame {
    #[serde(default)]
    date: Option<String>,
    home_team: String,
    away_team: String,
    #[serde(default, rename = "B365H")]
    home: Option<f64>,
    #[serde(default, rename = "B365D")]
    draw: Option<f64>,
    #[serde(default, rename = "B365A")]
    away: Option<f64>,
}

impl MatchHistoryGame {
    fn into_odds(self) -> Result<OddsRecord> {
        Ok(OddsRecord {
            fixture_id: None,
            date: self.date.as_deref().map(parse_date).transpose()?,
            home_team: self.home_team,
            away_team: self.away_team,
            bookmaker: ODDS_BOOKMAKER.to_string(),
            home: self.home,
            draw: self.draw,
            away: self.away,
            provenance: Provenance::Historical,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ClubEloRow {
    team: String,
    elo: f64,
    #[serde(default)]
    rank: Option<f64>,
    #[serde(default)]
    country: Option<String>,
}

impl ClubEloRow {
    fn into_rating(self) -> EloRating {
        EloRating {
            team: self.team,
            elo: self.elo,
            rank: count(self.rank),
            country: self.country,
            provenance: Provenance::Historical,
        }
    }
}

/// Renders a numeric or string identifier cell.
fn id_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map_or_else(|| n.to_string(), |i| i.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use football_core::{Record, StaticTransport};

    const BRIDGE: &str = "http://bridge.test";

    fn adapter(transport: Arc<StaticTransport>) -> HistoricalAdapter {
        HistoricalAdapter::new(Some(format!("{BRIDGE}/")))
            .with_transport(transport)
            .with_rate_limit(Duration::ZERO)
    }

    #[test]
    fn test_adapter_metadata() {
        let adapter = HistoricalAdapter::new(Some(BRIDGE.to_string()));
        assert_eq!(adapter.name(), "soccerdata");
        assert_eq!(adapter.provenance(), Provenance::Historical);
        assert!(adapter.is_available());
        assert!(adapter.supports(Operation::ShotCoordinates));
        assert!(adapter.supports(Operation::EloRatings));
        assert!(!adapter.supports(Operation::LiveScores));
        assert!(!adapter.supports(Operation::Predictions));
    }

    #[test]
    fn test_unavailable_without_bridge() {
        let adapter = HistoricalAdapter::new(None);
        assert!(!adapter.is_available());
        assert!(matches!(adapter.availability(), Availability::Unavailable(_)));

        let forced = HistoricalAdapter::new(None).with_probe(|| Availability::Ready);
        assert!(forced.is_available());
    }

    #[test]
    fn test_league_mapping() {
        let adapter = HistoricalAdapter::new(None)
            .with_league_table([("Championship", "ENG-Championship")]);
        assert_eq!(adapter.map_league("premier-league"), "ENG-Premier League");
        assert_eq!(adapter.map_league("Super-Lig"), "TUR-Süper Lig");
        assert_eq!(adapter.map_league("championship"), "ENG-Championship");
        assert_eq!(adapter.map_league("BRA-Serie A"), "BRA-Serie A");
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("2–1"), Some((2, 1)));
        assert_eq!(parse_score("0-3"), Some((0, 3)));
        assert_eq!(parse_score("1–1 (4–3)"), Some((1, 1)));
        assert_eq!(parse_score(""), None);
    }

    #[tokio::test]
    async fn test_fixtures_mapping() {
        let body = r#"[
            {"league": "ENG-Premier League", "season": "2324", "date": "2023-08-11",
             "home_team": "Burnley", "away_team": "Manchester City", "score": "0–3",
             "venue": "Turf Moor", "game_id": "3a6836b4"},
            {"league": "ENG-Premier League", "season": "2324", "date": "2024-05-19",
             "home_team": "Arsenal", "away_team": "Everton", "score": null,
             "venue": "Emirates Stadium", "game_id": null}
        ]"#;
        let transport = Arc::new(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), body),
        );
        let adapter = adapter(transport.clone());

        let set = adapter
            .fetch(
                Operation::Fixtures,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await
            .unwrap();
        let RecordSet::Fixtures(fixtures) = set else {
            panic!("expected fixtures");
        };

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].home_score, Some(0));
        assert_eq!(fixtures[0].away_score, Some(3));
        assert_eq!(fixtures[0].state, "FT");
        assert_eq!(fixtures[0].venue.as_deref(), Some("Turf Moor"));
        assert!(!fixtures[1].has_started());
        assert_eq!(fixtures[1].id, "2024-05-19-Arsenal-Everton");
        assert!(fixtures.iter().all(|f| f.provenance == Provenance::Historical));

        let requests = transport.requests().await;
        assert_eq!(requests[0].param("league"), Some("ENG-Premier League"));
        assert_eq!(requests[0].param("season"), Some("2023-2024"));
    }

    #[tokio::test]
    async fn test_undated_fixtures_are_skipped() {
        let body = r#"[
            {"date": "2023-08-11", "home_team": "Burnley", "away_team": "Manchester City", "score": "0–3"},
            {"date": null, "home_team": "Everton", "away_team": "Luton Town", "score": null}
        ]"#;
        let transport = Arc::new(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), body),
        );
        let fixtures = Fixture::from_set(
            adapter(transport)
                .fetch(
                    Operation::Fixtures,
                    &Params::league_season("premier-league", "2023-2024"),
                )
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home_team, "Burnley");

        let transport = Arc::new(StaticTransport::new().with_response(
            format!("{BRIDGE}/fbref/schedule"),
            r#"[{"date": "next spring", "home_team": "Everton", "away_team": "Luton Town"}]"#,
        ));
        let result = adapter(transport)
            .fetch(
                Operation::Fixtures,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await;
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[tokio::test]
    async fn test_team_stats_accepts_fbref_headers() {
        let body = r#"[
            {"team": "Arsenal", "Playing Time_MP": 38, "Performance_Gls": 91.0, "Expected_xG": 76.2},
            {"team": "Everton", "MP": 38, "Gls": null, "xG": 47.1}
        ]"#;
        let transport = Arc::new(
            StaticTransport::new()
                .with_response(format!("{BRIDGE}/fbref/team_season_stats"), body),
        );
        let set = adapter(transport)
            .fetch(
                Operation::TeamStats,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await
            .unwrap();
        let stats = TeamStatRow::from_set(set).unwrap();

        assert_eq!(stats[0].matches_played, Some(38));
        assert_eq!(stats[0].goals, Some(91));
        assert_eq!(stats[0].xg, Some(76.2));
        assert_eq!(stats[0].league, "premier-league");
        assert_eq!(stats[1].goals, None);
    }

    #[tokio::test]
    async fn test_xg_shots_odds_and_elo() {
        let transport = Arc::new(
            StaticTransport::new()
                .with_response(
                    format!("{BRIDGE}/understat/schedule"),
                    r#"[{"game_id": 22275, "date": "2023-08-11 19:00:00", "home_team": "Burnley",
                         "away_team": "Manchester City", "home_goals": 0, "away_goals": 3,
                         "home_xg": 0.31, "away_xg": 2.4}]"#,
                )
                .with_response(
                    format!("{BRIDGE}/understat/shots"),
                    r#"[{"game_id": 22275, "team": "Manchester City", "player": "Erling Haaland",
                         "minute": 3, "location_x": 0.885, "location_y": 0.5, "xg": 0.76, "result": "Goal"}]"#,
                )
                .with_response(
                    format!("{BRIDGE}/matchhistory/games"),
                    r#"[{"date": "2023-08-11", "home_team": "Burnley", "away_team": "Man City",
                         "FTHG": 0, "FTAG": 3, "B365H": 8.0, "B365D": 5.25, "B365A": 1.33}]"#,
                )
                .with_response(
                    format!("{BRIDGE}/clubelo/by_date"),
                    r#"[{"team": "Man City", "rank": 1, "country": "ENG", "level": 1, "elo": 2057.6},
                        {"team": "Burnley", "rank": null, "country": "ENG", "elo": 1650.0}]"#,
                ),
        );
        let adapter = adapter(transport.clone());
        let params = Params::league_season("premier-league", "2023-2024");

        let xg = XgRecord::from_set(adapter.fetch(Operation::Xg, &params).await.unwrap()).unwrap();
        assert_eq!(xg[0].fixture_id, "22275");
        assert_eq!(xg[0].date, NaiveDate::from_ymd_opt(2023, 8, 11).unwrap());
        assert_eq!(xg[0].away_xg, Some(2.4));

        let shots =
            ShotEvent::from_set(adapter.fetch(Operation::ShotCoordinates, &params).await.unwrap())
                .unwrap();
        assert_eq!(shots[0].x, 0.885);
        assert_eq!(shots[0].result, "Goal");

        let odds =
            OddsRecord::from_set(adapter.fetch(Operation::HistoricalOdds, &params).await.unwrap())
                .unwrap();
        assert_eq!(odds[0].bookmaker, "B365");
        assert_eq!(odds[0].away, Some(1.33));

        let elo = EloRating::from_set(
            adapter
                .fetch(Operation::EloRatings, &Params::new().with("date", "2024-01-15"))
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(elo.len(), 2);
        assert_eq!(elo[1].rank, None);

        let requests = transport.requests().await;
        assert_eq!(requests.last().unwrap().param("date"), Some("2024-01-15"));
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_shot_without_location_fails_loudly() {
        let transport = Arc::new(StaticTransport::new().with_response(
            format!("{BRIDGE}/understat/shots"),
            r#"[{"game_id": 1, "team": "A", "player": "B", "location_x": null, "location_y": 0.5}]"#,
        ));
        let result = adapter(transport)
            .fetch(
                Operation::ShotCoordinates,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await;
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let transport = Arc::new(
            StaticTransport::new()
                .with_failure(format!("{BRIDGE}/fbref/schedule"), "HTTP 502 Bad Gateway")
                .with_response(format!("{BRIDGE}/understat/schedule"), "not json"),
        );
        let adapter = adapter(transport);
        let params = Params::league_season("premier-league", "2023-2024");

        assert!(matches!(
            adapter.fetch(Operation::Fixtures, &params).await,
            Err(DataError::Upstream { .. })
        ));
        assert!(matches!(
            adapter.fetch(Operation::Xg, &params).await,
            Err(DataError::Parse(_))
        ));
        assert!(matches!(
            adapter.fetch(Operation::LiveScores, &params).await,
            Err(DataError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            adapter.fetch(Operation::Fixtures, &Params::new()).await,
            Err(DataError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_rows_are_not_errors() {
        let transport = Arc::new(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), "[]"),
        );
        let set = adapter(transport)
            .fetch(
                Operation::Fixtures,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await
            .unwrap();
        assert!(set.is_empty());
    }
}
