#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/footballanalytics/football-data/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Sportmonks live football data adapter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use football_sportmonks::LiveAdapter;
//! use football_core::{Operation, Params, SourceAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = LiveAdapter::new(std::env::var("SPORTMONKS_API_TOKEN").ok());
//!
//!     let live = adapter.fetch(Operation::LiveScores, &Params::new()).await?;
//!     println!("{} matches in play", live.len());
//!
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use football_core::{
    Availability, AvailabilityProbe, CapabilitySet, DataError, Fixture, HttpTransport,
    LiveMatchState, OddsRecord, Operation, Params, Prediction, Provenance, RateLimiter, RecordSet,
    RemoteRequest, Result, SourceAdapter, StandingRow, Transport, XgRecord,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Adapter name, also the cache namespace.
pub const NAME: &str = "sportmonks";

/// Base URL for the Sportmonks football API.
pub const SPORTMONKS_BASE_URL: &str = "https://api.sportmonks.com/v3/football";

/// Default delay between API requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(500);

/// Operations served by the live provider.
pub const CAPABILITIES: CapabilitySet = CapabilitySet::of(&[
    Operation::Fixtures,
    Operation::Xg,
    Operation::LiveOdds,
    Operation::LiveScores,
    Operation::Predictions,
    Operation::Standings,
]);

/// League slug to Sportmonks league id.
const LEAGUE_IDS: &[(&str, u32)] = &[
    ("premier-league", 8),
    ("la-liga", 564),
    ("bundesliga", 82),
    ("serie-a", 384),
    ("ligue-1", 301),
    ("super-lig", 600),
    ("eredivisie", 72),
    ("primeira-liga", 462),
    ("champions-league", 2),
    ("europa-league", 5),
];

/// Page size requested from list endpoints.
const PER_PAGE: u32 = 100;

/// Upper bound on pages followed for one request.
const MAX_PAGES: u32 = 10;

/// Sportmonks type id for match expected goals.
const XG_TYPE_ID: i64 = 5304;

/// Sportmonks market id for the full-time result (1X2) market.
const FULLTIME_RESULT_MARKET: i64 = 1;

/// Sportmonks live data adapter.
///
/// Provides access to:
/// - League fixtures with scores, venue and state
/// - In-play matches and in-play odds
/// - Match expected goals and outcome probabilities (add-ons)
/// - Live league tables
pub struct LiveAdapter {
    base_url: String,
    api_token: Option<String>,
    transport: Arc<dyn Transport>,
    rate_limiter: RateLimiter,
    leagues: HashMap<String, u32>,
    availability: Availability,
}

impl fmt::Debug for LiveAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveAdapter")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("availability", &self.availability)
            .finish_non_exhaustive()
    }
}

impl LiveAdapter {
    /// Create an adapter with the given API token.
    ///
    /// Without a token the adapter reports a missing credential and is never
    /// called by the manager.
    #[must_use]
    pub fn new(api_token: Option<String>) -> Self {
        let api_token = api_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let availability = token_probe(api_token.is_some()).probe();
        Self {
            base_url: SPORTMONKS_BASE_URL.to_string(),
            api_token,
            transport: Arc::new(HttpTransport::with_client(reqwest::Client::new())),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
            leagues: LEAGUE_IDS
                .iter()
                .map(|(slug, id)| ((*slug).to_string(), *id))
                .collect(),
            availability,
        }
    }

    /// Use a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Set the delay taken before every API request.
    #[must_use]
    pub fn with_rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limiter = RateLimiter::new(delay);
        self
    }

    /// Add or replace league slug to id mappings.
    #[must_use]
    pub fn with_league_table<I, K>(mut self, leagues: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        self.leagues.extend(
            leagues
                .into_iter()
                .map(|(slug, id)| (slug.into().to_lowercase(), id)),
        );
        self
    }

    /// Replace the availability check and run it.
    #[must_use]
    pub fn with_probe(mut self, probe: impl AvailabilityProbe) -> Self {
        self.availability = probe.probe();
        self
    }

    /// Returns the Sportmonks league id for a slug.
    pub fn league_id(&self, league: &str) -> Result<u32> {
        self.leagues
            .get(&league.to_lowercase())
            .copied()
            .ok_or_else(|| DataError::UnknownLeague {
                provider: NAME.to_string(),
                league: league.to_string(),
            })
    }

    fn token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| DataError::MissingCredential {
                provider: NAME.to_string(),
            })
    }

    /// Make one GET request and unwrap the `data` envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let mut request = RemoteRequest::new(format!("{}/{endpoint}", self.base_url))
            .query("api_token", self.token()?);
        for (key, value) in query {
            request = request.query(*key, value.clone());
        }

        self.rate_limiter.wait().await;
        debug!("Sportmonks request: {}", endpoint);
        let text = self.transport.get(NAME, &request).await?;

        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| DataError::Parse(format!("{endpoint}: {e}")))?;
        match (&envelope.data, &envelope.message) {
            (None, Some(message)) => Err(DataError::Upstream {
                provider: NAME.to_string(),
                message: message.clone(),
            }),
            _ => Ok(envelope),
        }
    }

    /// Fetch every page of a list endpoint, up to [`MAX_PAGES`].
    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let mut paged = query.to_vec();
            paged.push(("per_page", PER_PAGE.to_string()));
            paged.push(("page", page.to_string()));

            let envelope: Envelope<Vec<T>> = self.get(endpoint, &paged).await?;
            items.extend(envelope.data.unwrap_or_default());

            if !envelope.pagination.is_some_and(|p| p.has_more) {
                return Ok(items);
            }
        }
        warn!(endpoint, pages = MAX_PAGES, "Stopped following pagination");
        Ok(items)
    }

    async fn fixtures(&self, params: &Params) -> Result<Vec<Fixture>> {
        let league_id = self.league_id(params.require_text("league")?)?;
        let rows: Vec<SmFixture> = self
            .get_list(
                "fixtures",
                &[
                    ("filters", format!("fixtureLeagues:{league_id}")),
                    ("include", "participants;scores;venue;state".to_string()),
                ],
            )
            .await?;
        rows.into_iter()
            .map(|row| row.into_fixture(league_id))
            .collect()
    }

    async fn live_scores(&self) -> Result<Vec<LiveMatchState>> {
        let rows: Vec<SmFixture> = self
            .get_list(
                "livescores/inplay",
                &[("include", "participants;scores;state;periods".to_string())],
            )
            .await?;
        rows.into_iter().map(SmFixture::into_live).collect()
    }

    async fn live_odds(&self, params: &Params) -> Result<Vec<OddsRecord>> {
        let fixture_id = params.require_integer("fixture_id")?;
        let envelope: Envelope<SmFixture> = self
            .get(
                &format!("fixtures/{fixture_id}"),
                &[("include", "participants;inplayOdds".to_string())],
            )
            .await?;
        envelope
            .data
            .map_or_else(|| Ok(Vec::new()), SmFixture::into_odds)
    }

    async fn xg(&self, params: &Params) -> Result<Vec<XgRecord>> {
        let league_id = self.league_id(params.require_text("league")?)?;
        let rows: Vec<SmFixture> = self
            .get_list(
                "fixtures",
                &[
                    ("filters", format!("fixtureLeagues:{league_id}")),
                    ("include", "participants;scores;xGFixture".to_string()),
                ],
            )
            .await?;

        let mut records = Vec::new();
        for row in rows {
            if let Some(record) = row.into_xg()? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn predictions(&self, params: &Params) -> Result<Vec<Prediction>> {
        let fixture_id = params.require_integer("fixture_id")?;
        let rows: Vec<SmPrediction> = self
            .get_list(
                &format!("predictions/probabilities/fixtures/{fixture_id}"),
                &[],
            )
            .await?;
        Ok(rows
            .into_iter()
            .find_map(|row| row.into_prediction(fixture_id))
            .into_iter()
            .collect())
    }

    async fn standings(&self, params: &Params) -> Result<Vec<StandingRow>> {
        let league_id = self.league_id(params.require_text("league")?)?;
        let envelope: Envelope<Vec<SmStanding>> = self
            .get(
                &format!("standings/live/leagues/{league_id}"),
                &[("include", "participant;details.type".to_string())],
            )
            .await?;
        let mut rows: Vec<StandingRow> = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(SmStanding::into_row)
            .collect();
        rows.sort_by_key(|r| r.position);
        Ok(rows)
    }
}

/// Availability check for the API: ready once a token is configured.
fn token_probe(configured: bool) -> impl AvailabilityProbe {
    move || {
        if configured {
            Availability::Ready
        } else {
            Availability::MissingCredential
        }
    }
}

#[async_trait]
impl SourceAdapter for LiveAdapter {
    fn provenance(&self) -> Provenance {
        Provenance::Live
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
            Operation::LiveScores => self.live_scores().await.map(RecordSet::Live),
            Operation::LiveOdds => self.live_odds(params).await.map(RecordSet::Odds),
            Operation::Xg => self.xg(params).await.map(RecordSet::Xg),
            Operation::Predictions => self.predictions(params).await.map(RecordSet::Predictions),
            Operation::Standings => self.standings(params).await.map(RecordSet::Standings),
            _ => Err(DataError::UnsupportedOperation {
                adapter: NAME.to_string(),
                operation,
            }),
        }
    }
}

// --- Sportmonks v3 wire models ---

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Default, Deserialize)]
struct SmNamed {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmParticipant {
    name: String,
    #[serde(default)]
    meta: Option<SmMeta>,
}

#[derive(Debug, Deserialize)]
struct SmMeta {
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmScore {
    #[serde(default)]
    description: Option<String>,
    score: SmScoreValue,
}

#[derive(Debug, Deserialize)]
struct SmScoreValue {
    #[serde(default)]
    goals: Option<i64>,
    #[serde(default)]
    participant: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmState {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SmPeriod {
    #[serde(default)]
    ticking: bool,
    #[serde(default)]
    minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SmOdd {
    #[serde(default)]
    bookmaker_id: Option<i64>,
    #[serde(default)]
    market_id: Option<i64>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SmExpected {
    #[serde(default)]
    type_id: Option<i64>,
    #[serde(default)]
    location: Option<String>,
    data: SmExpectedValue,
}

#[derive(Debug, Deserialize)]
struct SmExpectedValue {
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SmFixture {
    id: i64,
    #[serde(default)]
    starting_at: Option<String>,
    #[serde(default)]
    league_id: Option<i64>,
    #[serde(default)]
    participants: Vec<SmParticipant>,
    #[serde(default)]
    scores: Vec<SmScore>,
    #[serde(default)]
    venue: Option<SmNamed>,
    #[serde(default)]
    state: Option<SmState>,
    #[serde(default)]
    periods: Vec<SmPeriod>,
    #[serde(default, alias = "inplayOdds")]
    inplayodds: Vec<SmOdd>,
    #[serde(default, alias = "xGFixture")]
    xgfixture: Vec<SmExpected>,
}

/// Reads a number that Sportmonks may send as a string.
fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl SmFixture {
    fn date(&self) -> Result<NaiveDate> {
        let raw = self
            .starting_at
            .as_deref()
            .ok_or_else(|| DataError::Parse(format!("Fixture {} has no starting_at", self.id)))?;
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Fixture {}: invalid date {raw}: {e}", self.id)))
    }

    /// Home and away team names, by participant location with list order as
    /// the fallback.
    fn teams(&self) -> Result<(String, String)> {
        let by_location = |side: &str| {
            self.participants
                .iter()
                .find(|p| p.meta.as_ref().and_then(|m| m.location.as_deref()) == Some(side))
                .map(|p| p.name.clone())
        };
        let home = by_location("home").or_else(|| self.participants.first().map(|p| p.name.clone()));
        let away = by_location("away").or_else(|| self.participants.get(1).map(|p| p.name.clone()));
        match (home, away) {
            (Some(home), Some(away)) => Ok((home, away)),
            _ => Err(DataError::Parse(format!(
                "Fixture {} is missing participants",
                self.id
            ))),
        }
    }

    fn current_goals(&self, side: &str) -> Option<i64> {
        self.scores
            .iter()
            .find(|s| {
                s.description.as_deref() == Some("CURRENT")
                    && s.score.participant.as_deref() == Some(side)
            })
            .and_then(|s| s.score.goals)
    }

    fn short_state(&self) -> String {
        self.state
            .as_ref()
            .and_then(|s| s.short_name.clone().or_else(|| s.state.clone()))
            .unwrap_or_else(|| "NS".to_string())
    }

    fn into_fixture(self, league_id: u32) -> Result<Fixture> {
        let date = self.date()?;
        let (home, away) = self.teams()?;
        let league = self.league_id.map_or_else(|| league_id.to_string(), |id| id.to_string());

        let mut fixture = Fixture::new(self.id.to_string(), date, league, home, away, Provenance::Live)
            .with_state(self.short_state());
        if let (Some(h), Some(a)) = (self.current_goals("home"), self.current_goals("away")) {
            fixture = fixture.with_score(h, a);
        }
        if let Some(venue) = self.venue.and_then(|v| v.name) {
            fixture = fixture.with_venue(venue);
        }
        Ok(fixture)
    }

    fn into_live(self) -> Result<LiveMatchState> {
        let (home_team, away_team) = self.teams()?;
        let minute = self.periods.iter().find(|p| p.ticking).and_then(|p| p.minutes);
        let state = self
            .state
            .as_ref()
            .and_then(|s| s.name.clone().or_else(|| s.short_name.clone()))
            .unwrap_or_default();
        Ok(LiveMatchState {
            fixture_id: self.id.to_string(),
            minute,
            home_team,
            away_team,
            home_score: self.current_goals("home"),
            away_score: self.current_goals("away"),
            state,
            provenance: Provenance::Live,
        })
    }

    /// One record per bookmaker quoting the full-time result market.
    fn into_odds(self) -> Result<Vec<OddsRecord>> {
        let (home_team, away_team) = self.teams()?;
        let date = self.date().ok();

        let mut books: BTreeMap<i64, [Option<f64>; 3]> = BTreeMap::new();
        for odd in &self.inplayodds {
            if odd.market_id.is_some_and(|m| m != FULLTIME_RESULT_MARKET) {
                continue;
            }
            let slot = match odd.label.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("home" | "1") => 0,
                Some("draw" | "x") => 1,
                Some("away" | "2") => 2,
                _ => continue,
            };
            let prices = books.entry(odd.bookmaker_id.unwrap_or_default()).or_default();
            prices[slot] = number(&odd.value);
        }

        Ok(books
            .into_iter()
            .map(|(bookmaker, [home, draw, away])| OddsRecord {
                fixture_id: Some(self.id.to_string()),
                date,
                home_team: home_team.clone(),
                away_team: away_team.clone(),
                bookmaker: bookmaker.to_string(),
                home,
                draw,
                away,
                provenance: Provenance::Live,
            })
            .collect())
    }

    /// Match xG, or `None` when the fixture carries no expected-goals data.
    fn into_xg(self) -> Result<Option<XgRecord>> {
        let side_xg = |side: &str| {
            self.xgfixture
                .iter()
                .filter(|e| e.type_id.is_none_or(|t| t == XG_TYPE_ID))
                .find(|e| e.location.as_deref() == Some(side))
                .and_then(|e| e.data.value)
        };
        let (home_xg, away_xg) = (side_xg("home"), side_xg("away"));
        if home_xg.is_none() && away_xg.is_none() {
            return Ok(None);
        }

        let (home_team, away_team) = self.teams()?;
        Ok(Some(XgRecord {
            fixture_id: self.id.to_string(),
            date: self.date()?,
            home_team,
            away_team,
            home_goals: self.current_goals("home"),
            away_goals: self.current_goals("away"),
            home_xg,
            away_xg,
            provenance: Provenance::Live,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct SmPrediction {
    #[serde(default)]
    predictions: serde_json::Value,
}

impl SmPrediction {
    /// Reads a home/draw/away probability object; other prediction types
    /// (over/under, both teams to score) yield `None`.
    fn into_prediction(self, fixture_id: i64) -> Option<Prediction> {
        let home = number(self.predictions.get("home")?);
        let draw = number(self.predictions.get("draw")?);
        let away = number(self.predictions.get("away")?);
        Some(Prediction {
            fixture_id: fixture_id.to_string(),
            home_win: home,
            draw,
            away_win: away,
            provenance: Provenance::Live,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SmStanding {
    position: i64,
    #[serde(default)]
    points: i64,
    #[serde(default)]
    participant: Option<SmNamed>,
    #[serde(default)]
    details: Vec<SmDetail>,
}

#[derive(Debug, Deserialize)]
struct SmDetail {
    #[serde(default)]
    type_id: Option<i64>,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default, rename = "type")]
    kind: Option<SmNamed>,
}

/// Standing detail columns, by type name and by type id.
const STANDING_DETAILS: &[(&str, i64)] = &[
    ("Matches Played", 129),
    ("Won", 130),
    ("Draw", 131),
    ("Lost", 132),
    ("Goals For", 133),
    ("Goals Against", 134),
    ("Goal Difference", 179),
];

impl SmStanding {
    #[allow(clippy::cast_possible_truncation)]
    fn detail(&self, name: &str) -> Option<i64> {
        let type_id = STANDING_DETAILS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id);
        self.details
            .iter()
            .find(|d| {
                let named = d
                    .kind
                    .as_ref()
                    .and_then(|k| k.name.as_deref())
                    .map(|n| n.trim_start_matches("Overall ").eq_ignore_ascii_case(name));
                named.unwrap_or_else(|| d.type_id.is_some() && d.type_id == type_id)
            })
            .and_then(|d| number(&d.value))
            .map(|v| v.round() as i64)
    }

    fn into_row(self) -> StandingRow {
        StandingRow {
            position: self.position,
            team: self
                .participant
                .as_ref()
                .and_then(|p| p.name.clone())
                .unwrap_or_default(),
            played: self.detail("Matches Played"),
            won: self.detail("Won"),
            drawn: self.detail("Draw"),
            lost: self.detail("Lost"),
            goals_for: self.detail("Goals For"),
            goals_against: self.detail("Goals Against"),
            goal_difference: self.detail("Goal Difference"),
            points: self.points,
            provenance: Provenance::Live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use football_core::{Record, StaticTransport};

    const BASE: &str = "http://sportmonks.test/v3/football";

    fn adapter(transport: Arc<StaticTransport>) -> LiveAdapter {
        LiveAdapter::new(Some("secret-token".to_string()))
            .with_base_url(BASE)
            .with_transport(transport)
            .with_rate_limit(Duration::ZERO)
    }

    const FIXTURES: &str = r#"{
        "data": [
            {"id": 18535517, "league_id": 8, "starting_at": "2023-08-11 19:00:00",
             "participants": [
                {"id": 27, "name": "Burnley", "meta": {"location": "home"}},
                {"id": 9, "name": "Manchester City", "meta": {"location": "away"}}],
             "scores": [
                {"description": "1ST_HALF", "score": {"goals": 0, "participant": "home"}},
                {"description": "CURRENT", "score": {"goals": 0, "participant": "home"}},
                {"description": "CURRENT", "score": {"goals": 3, "participant": "away"}}],
             "venue": {"name": "Turf Moor"},
             "state": {"state": "FT", "short_name": "FT", "name": "Full Time"}},
            {"id": 18535999, "league_id": 8, "starting_at": "2024-05-19 15:00:00",
             "participants": [
                {"id": 9, "name": "Manchester City", "meta": {"location": "away"}},
                {"id": 19, "name": "Arsenal", "meta": {"location": "home"}}],
             "scores": [], "venue": null,
             "state": {"state": "NS", "short_name": "NS", "name": "Not Started"}}
        ],
        "pagination": {"count": 2, "per_page": 100, "current_page": 1, "has_more": false}
    }"#;

    #[test]
    fn test_adapter_metadata() {
        let adapter = LiveAdapter::new(Some("token".into()));
        assert_eq!(adapter.name(), "sportmonks");
        assert_eq!(adapter.provenance(), Provenance::Live);
        assert!(adapter.is_available());
        assert!(adapter.supports(Operation::LiveScores));
        assert!(adapter.supports(Operation::Xg));
        assert!(!adapter.supports(Operation::TeamStats));
        assert!(!adapter.supports(Operation::ShotCoordinates));
    }

    #[test]
    fn test_missing_token() {
        let adapter = LiveAdapter::new(None);
        assert_eq!(adapter.availability(), &Availability::MissingCredential);
        assert!(!LiveAdapter::new(Some("  ".into())).is_available());
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", LiveAdapter::new(Some("secret-token".into())));
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_league_ids() {
        let adapter = LiveAdapter::new(None).with_league_table([("mls", 779)]);
        assert_eq!(adapter.league_id("premier-league").unwrap(), 8);
        assert_eq!(adapter.league_id("Super-Lig").unwrap(), 600);
        assert_eq!(adapter.league_id("MLS").unwrap(), 779);
        assert!(matches!(
            adapter.league_id("j-league"),
            Err(DataError::UnknownLeague { .. })
        ));
    }

    #[tokio::test]
    async fn test_fixtures_mapping() {
        let transport =
            Arc::new(StaticTransport::new().with_response(format!("{BASE}/fixtures"), FIXTURES));
        let set = adapter(transport.clone())
            .fetch(
                Operation::Fixtures,
                &Params::league_season("premier-league", "2023-2024"),
            )
            .await
            .unwrap();
        let fixtures = Fixture::from_set(set).unwrap();

        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].id, "18535517");
        assert_eq!(fixtures[0].home_team, "Burnley");
        assert_eq!(fixtures[0].home_score, Some(0));
        assert_eq!(fixtures[0].away_score, Some(3));
        assert_eq!(fixtures[0].state, "FT");
        assert_eq!(fixtures[0].venue.as_deref(), Some("Turf Moor"));

        assert_eq!(fixtures[1].home_team, "Arsenal");
        assert_eq!(fixtures[1].away_team, "Manchester City");
        assert!(!fixtures[1].has_started());
        assert!(fixtures.iter().all(|f| f.provenance == Provenance::Live));

        let requests = transport.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].param("filters"), Some("fixtureLeagues:8"));
        assert_eq!(requests[0].param("api_token"), Some("secret-token"));
    }

    #[tokio::test]
    async fn test_live_scores_mapping() {
        let body = r#"{"data": [
            {"id": 19134454, "starting_at": "2024-01-15 20:00:00",
             "participants": [
                {"name": "Liverpool", "meta": {"location": "home"}},
                {"name": "Chelsea", "meta": {"location": "away"}}],
             "scores": [
                {"description": "CURRENT", "score": {"goals": 2, "participant": "home"}},
                {"description": "CURRENT", "score": {"goals": 1, "participant": "away"}}],
             "state": {"short_name": "2H", "name": "2nd Half"},
             "periods": [
                {"ticking": false, "minutes": 45},
                {"ticking": true, "minutes": 67}]}
        ]}"#;
        let transport = Arc::new(
            StaticTransport::new().with_response(format!("{BASE}/livescores/inplay"), body),
        );
        let live = LiveMatchState::from_set(
            adapter(transport)
                .fetch(Operation::LiveScores, &Params::new())
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(live.len(), 1);
        assert_eq!(live[0].minute, Some(67));
        assert_eq!(live[0].home_score, Some(2));
        assert_eq!(live[0].state, "2nd Half");
    }

    #[tokio::test]
    async fn test_live_odds_grouped_by_bookmaker() {
        let body = r#"{"data": {
            "id": 19134454, "starting_at": "2024-01-15 20:00:00",
            "participants": [
                {"name": "Liverpool", "meta": {"location": "home"}},
                {"name": "Chelsea", "meta": {"location": "away"}}],
            "inplayodds": [
                {"bookmaker_id": 2, "market_id": 1, "label": "Home", "value": "1.45"},
                {"bookmaker_id": 2, "market_id": 1, "label": "Draw", "value": "4.50"},
                {"bookmaker_id": 2, "market_id": 1, "label": "Away", "value": "7.00"},
                {"bookmaker_id": 34, "market_id": 1, "label": "1", "value": 1.5},
                {"bookmaker_id": 34, "market_id": 80, "label": "Over", "value": "1.9"}]
        }}"#;
        let transport = Arc::new(
            StaticTransport::new().with_response(format!("{BASE}/fixtures/19134454"), body),
        );
        let odds = OddsRecord::from_set(
            adapter(transport)
                .fetch(
                    Operation::LiveOdds,
                    &Params::new().with("fixture_id", 19_134_454_i64),
                )
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(odds.len(), 2);
        assert_eq!(odds[0].bookmaker, "2");
        assert_eq!(odds[0].home, Some(1.45));
        assert_eq!(odds[0].away, Some(7.0));
        assert_eq!(odds[1].home, Some(1.5));
        assert_eq!(odds[1].draw, None);
        assert_eq!(odds[0].fixture_id.as_deref(), Some("19134454"));
    }

    #[tokio::test]
    async fn test_xg_skips_fixtures_without_data() {
        let body = r#"{"data": [
            {"id": 1, "starting_at": "2023-08-11 19:00:00",
             "participants": [
                {"name": "Burnley", "meta": {"location": "home"}},
                {"name": "Manchester City", "meta": {"location": "away"}}],
             "xgfixture": [
                {"type_id": 5304, "location": "home", "data": {"value": 0.31}},
                {"type_id": 5304, "location": "away", "data": {"value": 2.4}}]},
            {"id": 2, "starting_at": "2024-05-19 15:00:00",
             "participants": [
                {"name": "Arsenal", "meta": {"location": "home"}},
                {"name": "Everton", "meta": {"location": "away"}}],
             "xgfixture": []}
        ]}"#;
        let transport =
            Arc::new(StaticTransport::new().with_response(format!("{BASE}/fixtures"), body));
        let xg = XgRecord::from_set(
            adapter(transport)
                .fetch(Operation::Xg, &Params::league_season("premier-league", "2023-2024"))
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(xg.len(), 1);
        assert_eq!(xg[0].home_xg, Some(0.31));
        assert_eq!(xg[0].away_xg, Some(2.4));
        assert_eq!(xg[0].provenance, Provenance::Live);
    }

    #[tokio::test]
    async fn test_predictions_pick_result_probabilities() {
        let body = r#"{"data": [
            {"fixture_id": 19134454, "type_id": 231, "predictions": {"yes": 61.2, "no": 38.8}},
            {"fixture_id": 19134454, "type_id": 237,
             "predictions": {"home": 58.3, "draw": 22.9, "away": 18.8}}
        ]}"#;
        let transport = Arc::new(StaticTransport::new().with_response(
            format!("{BASE}/predictions/probabilities/fixtures/19134454"),
            body,
        ));
        let predictions = Prediction::from_set(
            adapter(transport)
                .fetch(
                    Operation::Predictions,
                    &Params::new().with("fixture_id", 19_134_454_i64),
                )
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].home_win, Some(58.3));
        assert_eq!(predictions[0].away_win, Some(18.8));
    }

    #[tokio::test]
    async fn test_standings_sorted_with_details() {
        let body = r#"{"data": [
            {"position": 2, "points": 84, "participant": {"name": "Manchester City"},
             "details": [{"type_id": 129, "value": 38}, {"type_id": 130, "value": 28}]},
            {"position": 1, "points": 89, "participant": {"name": "Arsenal"},
             "details": [
                {"type_id": 999, "value": 38, "type": {"name": "Overall Matches Played"}},
                {"type_id": 998, "value": 91, "type": {"name": "Goals For"}}]}
        ]}"#;
        let transport = Arc::new(
            StaticTransport::new()
                .with_response(format!("{BASE}/standings/live/leagues/8"), body),
        );
        let table = StandingRow::from_set(
            adapter(transport)
                .fetch(
                    Operation::Standings,
                    &Params::new().with("league", "premier-league"),
                )
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(table[0].team, "Arsenal");
        assert_eq!(table[0].played, Some(38));
        assert_eq!(table[0].goals_for, Some(91));
        assert_eq!(table[1].won, Some(28));
        assert_eq!(table[1].points, 84);
    }

    #[tokio::test]
    async fn test_envelope_without_data_is_empty() {
        let transport = Arc::new(StaticTransport::new().with_response(
            format!("{BASE}/livescores/inplay"),
            r#"{"pagination": {"has_more": false}}"#,
        ));
        let set = adapter(transport)
            .fetch(Operation::LiveScores, &Params::new())
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_failures() {
        let transport = Arc::new(
            StaticTransport::new()
                .with_failure(format!("{BASE}/livescores/inplay"), "HTTP 500")
                .with_response(
                    format!("{BASE}/fixtures"),
                    r#"{"message": "You do not have access to this endpoint."}"#,
                ),
        );
        let adapter = adapter(transport.clone());

        assert!(matches!(
            adapter.fetch(Operation::LiveScores, &Params::new()).await,
            Err(DataError::Upstream { .. })
        ));
        assert!(matches!(
            adapter
                .fetch(Operation::Fixtures, &Params::league_season("premier-league", "2023-2024"))
                .await,
            Err(DataError::Upstream { .. })
        ));
        assert!(matches!(
            adapter
                .fetch(Operation::Fixtures, &Params::league_season("j-league", "2024"))
                .await,
            Err(DataError::UnknownLeague { .. })
        ));
        assert!(matches!(
            adapter.fetch(Operation::TeamStats, &Params::new()).await,
            Err(DataError::UnsupportedOperation { .. })
        ));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_without_token_makes_no_call() {
        let transport = Arc::new(StaticTransport::new());
        let adapter = LiveAdapter::new(None)
            .with_base_url(BASE)
            .with_transport(transport.clone())
            .with_rate_limit(Duration::ZERO);

        assert!(matches!(
            adapter.fetch(Operation::LiveScores, &Params::new()).await,
            Err(DataError::MissingCredential { .. })
        ));
        assert_eq!(transport.calls(), 0);
    }
}
