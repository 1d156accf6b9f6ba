//! Request orchestration across adapters and the cache.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use football_cache::{DiskCache, NoopCache, TieredCache};
use football_core::{
    Attempt, AttemptOutcome, Availability, CacheKey, CacheStore, CapabilitySet, DataError,
    EloRating, Fetched, Fixture, HttpTransport, LiveMatchState, OddsRecord, Operation, Params,
    Prediction, Provenance, Record, RecordSet, Result, ShotEvent, SourceAdapter, StandingRow,
    TeamStatRow, Transport, XgRecord,
};
use football_soccerdata::HistoricalAdapter;
use football_sportmonks::LiveAdapter;
use tracing::{debug, instrument, warn};

use crate::config::HybridConfig;
use crate::routing::{Preference, RoutingPolicy};

/// Availability report for one registered adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStatus {
    /// Adapter provenance.
    pub provenance: Provenance,
    /// Adapter name.
    pub name: String,
    /// Backend availability, as probed at construction.
    pub availability: Availability,
    /// Declared operations.
    pub capabilities: CapabilitySet,
}

/// Result of walking the candidate list for one request.
struct Routed {
    found: Option<(RecordSet, Provenance)>,
    attempts: Vec<Attempt>,
}

/// Routes logical requests to adapters, with a cache in front of every
/// remote call.
///
/// For each request the manager resolves the candidate adapters from the
/// [`RoutingPolicy`], then walks them in order:
///
/// 1. An unavailable adapter is skipped and recorded with its reason.
/// 2. A fresh cache entry is served without a remote call.
/// 3. Otherwise the adapter is called; non-empty results are cached.
/// 4. Empty or failed candidates fall through to the next one.
///
/// The first non-empty result wins. When every candidate is empty or
/// unavailable the result is empty; when nothing succeeded and at least one
/// candidate failed the request fails with [`DataError::AllSourcesFailed`].
///
/// # Example
///
/// ```rust,ignore
/// use football::{HybridConfig, HybridDataManager, Preference};
///
/// let manager = HybridDataManager::from_config(&HybridConfig::from_env()?)?;
/// let fixtures = manager
///     .fixtures("premier-league", "2023-2024", Preference::Auto)
///     .await?;
/// println!("{} fixtures from {:?}", fixtures.len(), fixtures.source);
/// ```
pub struct HybridDataManager {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    routing: RoutingPolicy,
}

impl fmt::Debug for HybridDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridDataManager")
            .field(
                "adapters",
                &self.adapters.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl HybridDataManager {
    /// Create a manager with no adapters.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            adapters: Vec::new(),
            cache,
            ttl,
            routing: RoutingPolicy,
        }
    }

    /// Build both adapters and the cache from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or the SQLite cache cannot be created.
    pub fn from_config(config: &HybridConfig) -> Result<Self> {
        let ttl = config.cache_ttl();
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.request_timeout())?);

        let historical = HistoricalAdapter::new(config.historical_url.clone())
            .with_transport(Arc::clone(&transport))
            .with_rate_limit(Duration::from_millis(config.historical_delay_ms))
            .with_league_table(config.historical_leagues.clone());
        let live = LiveAdapter::new(config.live_token.clone())
            .with_transport(transport)
            .with_rate_limit(Duration::from_millis(config.live_delay_ms))
            .with_league_table(config.live_leagues.clone());

        let manager = Self::new(build_cache(config)?, ttl)
            .with_adapter(Arc::new(historical))
            .with_adapter(Arc::new(live));

        for status in manager.status() {
            debug!(
                provider = %status.name,
                availability = %status.availability,
                "Data source configured"
            );
        }
        Ok(manager)
    }

    /// Register an adapter.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        debug!(provider = adapter.name(), "Registering adapter");
        self.adapters.push(adapter);
    }

    /// Register an adapter, builder style.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Registered adapters, in registration order.
    #[must_use]
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// The cache in front of every adapter.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Availability of every registered adapter.
    #[must_use]
    pub fn status(&self) -> Vec<SourceStatus> {
        self.adapters
            .iter()
            .map(|a| SourceStatus {
                provenance: a.provenance(),
                name: a.name().to_string(),
                availability: a.availability().clone(),
                capabilities: a.capabilities(),
            })
            .collect()
    }

    /// Returns true if an adapter with this provenance is registered and usable.
    #[must_use]
    pub fn is_available(&self, provenance: Provenance) -> bool {
        self.adapters
            .iter()
            .any(|a| a.provenance() == provenance && a.is_available())
    }

    /// Run a logical request and return typed records with diagnostics.
    ///
    /// # Errors
    /// Returns [`DataError::UnsupportedOperation`] if an explicit preference
    /// names an adapter without the operation, and
    /// [`DataError::AllSourcesFailed`] if at least one candidate failed and
    /// every other one was skipped. An empty answer from any candidate makes
    /// the result empty, with the failures kept in `attempts`.
    pub async fn request<T: Record>(
        &self,
        operation: Operation,
        params: &Params,
        preference: Preference,
    ) -> Result<Fetched<T>> {
        let Routed { found, attempts } = self.route(operation, params, preference).await?;
        match found {
            Some((set, source)) => Ok(Fetched {
                records: T::from_set(set)?,
                source: Some(source),
                attempts,
            }),
            None => Ok(Fetched {
                records: Vec::new(),
                source: None,
                attempts,
            }),
        }
    }

    #[instrument(skip(self, params), fields(operation = %operation, preference = %preference))]
    async fn route(
        &self,
        operation: Operation,
        params: &Params,
        preference: Preference,
    ) -> Result<Routed> {
        let candidates = self.routing.resolve(operation, preference, &self.adapters)?;
        let mut found = None;
        let mut attempts = Vec::with_capacity(candidates.len());

        for adapter in candidates {
            let outcome = self.attempt(adapter.as_ref(), operation, params).await;
            let outcome = match outcome {
                Ok((set, outcome)) => {
                    if found.is_none() {
                        found = Some((set, adapter.provenance()));
                    }
                    outcome
                }
                Err(outcome) => outcome,
            };
            attempts.push(Attempt::new(adapter.provenance(), adapter.name(), outcome));

            if found.is_some() && !operation.is_merge() {
                break;
            }
        }

        let answered = attempts
            .iter()
            .any(|a| matches!(a.outcome, AttemptOutcome::Empty));
        let failed = attempts
            .iter()
            .any(|a| matches!(a.outcome, AttemptOutcome::Failed(_)));
        if found.is_none() && !answered && failed {
            return Err(DataError::AllSourcesFailed {
                operation,
                attempts,
            });
        }
        Ok(Routed { found, attempts })
    }

    /// Try one adapter: cache first, then the remote call.
    ///
    /// Returns the records and a success outcome, or the outcome explaining
    /// why there are none.
    async fn attempt(
        &self,
        adapter: &dyn SourceAdapter,
        operation: Operation,
        params: &Params,
    ) -> std::result::Result<(RecordSet, AttemptOutcome), AttemptOutcome> {
        if let Some(reason) = adapter.availability().to_error(adapter.name()) {
            debug!(provider = adapter.name(), reason = %reason, "Skipping unavailable adapter");
            return Err(AttemptOutcome::Skipped(reason));
        }

        let key = CacheKey::new(adapter.name(), operation, params);
        if let Some(frame) = self.cache.get(&key).await {
            match RecordSet::from_frame(operation, &frame) {
                Ok(set) if !set.is_empty() => {
                    debug!(provider = adapter.name(), rows = set.len(), "Cache hit");
                    let rows = set.len();
                    return Ok((set, AttemptOutcome::CacheHit { rows }));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(provider = adapter.name(), error = %e, "Unreadable cached records, refetching");
                }
            }
        }

        match adapter.fetch(operation, params).await {
            Ok(set) if set.is_empty() => {
                debug!(provider = adapter.name(), "Adapter returned no records, trying next");
                Err(AttemptOutcome::Empty)
            }
            Ok(set) => {
                self.store(&key, &set).await;
                let rows = set.len();
                Ok((set, AttemptOutcome::Fetched { rows }))
            }
            Err(e) => {
                warn!(provider = adapter.name(), error = %e, "Provider failed, trying next");
                Err(AttemptOutcome::Failed(e))
            }
        }
    }

    async fn store(&self, key: &CacheKey, set: &RecordSet) {
        let written = match set.to_frame() {
            Ok(frame) => self.cache.put(key, &frame, self.ttl).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(key = %key, error = %e, "Failed to cache records");
        }
    }

    // Typed operations

    /// Match schedule and results for a league season.
    pub async fn fixtures(
        &self,
        league: &str,
        season: &str,
        preference: Preference,
    ) -> Result<Fetched<Fixture>> {
        self.request(
            Operation::Fixtures,
            &Params::league_season(league, season),
            preference,
        )
        .await
    }

    /// Season team statistics.
    pub async fn team_stats(
        &self,
        league: &str,
        season: &str,
        preference: Preference,
    ) -> Result<Fetched<TeamStatRow>> {
        self.request(
            Operation::TeamStats,
            &Params::league_season(league, season),
            preference,
        )
        .await
    }

    /// Match expected goals. Every capable adapter is consulted; the first
    /// non-empty result is returned.
    pub async fn xg(
        &self,
        league: &str,
        season: &str,
        preference: Preference,
    ) -> Result<Fetched<XgRecord>> {
        self.request(
            Operation::Xg,
            &Params::league_season(league, season),
            preference,
        )
        .await
    }

    /// Shots with pitch coordinates.
    pub async fn shot_events(
        &self,
        league: &str,
        season: &str,
        preference: Preference,
    ) -> Result<Fetched<ShotEvent>> {
        self.request(
            Operation::ShotCoordinates,
            &Params::league_season(league, season),
            preference,
        )
        .await
    }

    /// Closing 1X2 odds for past matches.
    pub async fn historical_odds(
        &self,
        league: &str,
        season: &str,
        preference: Preference,
    ) -> Result<Fetched<OddsRecord>> {
        self.request(
            Operation::HistoricalOdds,
            &Params::league_season(league, season),
            preference,
        )
        .await
    }

    /// In-play 1X2 odds for a fixture.
    pub async fn live_odds(
        &self,
        fixture_id: i64,
        preference: Preference,
    ) -> Result<Fetched<OddsRecord>> {
        self.request(
            Operation::LiveOdds,
            &Params::new().with("fixture_id", fixture_id),
            preference,
        )
        .await
    }

    /// Matches currently in play.
    pub async fn live_scores(&self, preference: Preference) -> Result<Fetched<LiveMatchState>> {
        self.request(Operation::LiveScores, &Params::new(), preference)
            .await
    }

    /// Club Elo ratings on `date`, today when absent.
    ///
    /// The date is always part of the request, so cached ratings never
    /// outlive the day they were fetched for.
    pub async fn elo_ratings(
        &self,
        date: Option<NaiveDate>,
        preference: Preference,
    ) -> Result<Fetched<EloRating>> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        self.request(
            Operation::EloRatings,
            &Params::new().with("date", date),
            preference,
        )
        .await
    }

    /// Provider outcome probabilities for a fixture.
    pub async fn predictions(
        &self,
        fixture_id: i64,
        preference: Preference,
    ) -> Result<Fetched<Prediction>> {
        self.request(
            Operation::Predictions,
            &Params::new().with("fixture_id", fixture_id),
            preference,
        )
        .await
    }

    /// Current league table.
    pub async fn standings(
        &self,
        league: &str,
        preference: Preference,
    ) -> Result<Fetched<StandingRow>> {
        self.request(
            Operation::Standings,
            &Params::new().with("league", league),
            preference,
        )
        .await
    }
}

fn build_cache(config: &HybridConfig) -> Result<Arc<dyn CacheStore>> {
    if config.cache_ttl_hours == 0 {
        debug!("Cache TTL is zero, caching disabled");
        return Ok(Arc::new(NoopCache::new()));
    }

    #[cfg(feature = "cache-sqlite")]
    {
        if let Some(path) = &config.sqlite_path {
            return Ok(Arc::new(football_cache::SqliteCache::new(path)?));
        }
    }

    let disk = DiskCache::new(&config.cache_dir).with_default_ttl(config.cache_ttl());
    if config.memory_cache {
        Ok(Arc::new(TieredCache::new(disk)))
    } else {
        Ok(Arc::new(disk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use football_cache::InMemoryCache;
    use football_core::StaticTransport;
    use polars::prelude::{Column, DataFrame};
    use serde_json::json;

    const BRIDGE: &str = "http://bridge.test";
    const API: &str = "http://sportmonks.test/v3/football";

    fn schedule(rows: usize) -> String {
        let rows: Vec<_> = (0..rows)
            .map(|i| {
                json!({
                    "league": "ENG-Premier League",
                    "date": format!("2023-08-{:02}", i + 11),
                    "home_team": format!("Home {i}"),
                    "away_team": format!("Away {i}"),
                    "score": "2–1",
                    "game_id": format!("g{i}"),
                })
            })
            .collect();
        serde_json::Value::Array(rows).to_string()
    }

    fn live_fixtures() -> String {
        json!({"data": [{
            "id": 18535517, "league_id": 8, "starting_at": "2023-08-11 19:00:00",
            "participants": [
                {"name": "Burnley", "meta": {"location": "home"}},
                {"name": "Manchester City", "meta": {"location": "away"}}],
            "scores": [],
            "state": {"short_name": "NS"}
        }]})
        .to_string()
    }

    struct Setup {
        transport: Arc<StaticTransport>,
        cache: Arc<InMemoryCache>,
        manager: HybridDataManager,
    }

    fn setup(transport: StaticTransport, bridge: bool, token: Option<&str>) -> Setup {
        let transport = Arc::new(transport);
        let cache = Arc::new(InMemoryCache::new());

        let historical = HistoricalAdapter::new(bridge.then(|| BRIDGE.to_string()))
            .with_transport(transport.clone())
            .with_rate_limit(Duration::ZERO);
        let live = LiveAdapter::new(token.map(str::to_string))
            .with_base_url(API)
            .with_transport(transport.clone())
            .with_rate_limit(Duration::ZERO);

        let manager = HybridDataManager::new(cache.clone(), Duration::from_secs(3600))
            .with_adapter(Arc::new(historical))
            .with_adapter(Arc::new(live));

        Setup {
            transport,
            cache,
            manager,
        }
    }

    #[tokio::test]
    async fn test_fixtures_served_from_cache_on_second_call() {
        let s = setup(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), schedule(10)),
            true,
            None,
        );

        let first = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.source, Some(Provenance::Historical));
        assert!(first.records.iter().all(|f| f.provenance == Provenance::Historical));
        assert!(matches!(first.attempts[0].outcome, AttemptOutcome::Fetched { rows: 10 }));
        assert_eq!(s.transport.calls(), 1);

        let second = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(second.records, first.records);
        assert!(matches!(second.attempts[0].outcome, AttemptOutcome::CacheHit { rows: 10 }));
        assert_eq!(s.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_live_when_historical_is_empty() {
        let s = setup(
            StaticTransport::new()
                .with_response(format!("{BRIDGE}/fbref/schedule"), "[]")
                .with_response(format!("{API}/fixtures"), live_fixtures()),
            true,
            Some("token"),
        );

        let fixtures = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures.source, Some(Provenance::Live));
        assert_eq!(fixtures.records[0].provenance, Provenance::Live);
        assert!(matches!(fixtures.attempts[0].outcome, AttemptOutcome::Empty));
        assert_eq!(s.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_live_when_historical_fails() {
        let s = setup(
            StaticTransport::new()
                .with_failure(format!("{BRIDGE}/fbref/schedule"), "HTTP 502")
                .with_response(format!("{API}/fixtures"), live_fixtures()),
            true,
            Some("token"),
        );

        let fixtures = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(fixtures.source, Some(Provenance::Live));
        assert!(matches!(fixtures.attempts[0].outcome, AttemptOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_both_unavailable_is_empty_not_error() {
        let s = setup(StaticTransport::new(), false, None);

        let fixtures = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert!(fixtures.is_empty());
        assert_eq!(fixtures.source, None);
        assert_eq!(fixtures.attempts.len(), 2);
        assert!(fixtures
            .attempts
            .iter()
            .all(|a| matches!(a.outcome, AttemptOutcome::Skipped(_))));
        assert_eq!(s.transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_sources_failed() {
        let s = setup(
            StaticTransport::new()
                .with_failure(format!("{BRIDGE}/fbref/schedule"), "HTTP 500")
                .with_failure(format!("{API}/fixtures"), "HTTP 503"),
            true,
            Some("token"),
        );

        let err = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap_err();
        match err {
            DataError::AllSourcesFailed {
                operation,
                attempts,
            } => {
                assert_eq!(operation, Operation::Fixtures);
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].adapter, "soccerdata");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_and_failed_is_empty_not_error() {
        let s = setup(
            StaticTransport::new()
                .with_response(format!("{BRIDGE}/fbref/schedule"), "[]")
                .with_failure(format!("{API}/fixtures"), "HTTP 429"),
            true,
            Some("token"),
        );

        let fixtures = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert!(fixtures.is_empty());
        assert_eq!(fixtures.source, None);
        assert!(matches!(fixtures.attempts[0].outcome, AttemptOutcome::Empty));
        assert!(matches!(fixtures.attempts[1].outcome, AttemptOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_and_skipped_is_error() {
        let s = setup(
            StaticTransport::new().with_failure(format!("{BRIDGE}/fbref/schedule"), "HTTP 500"),
            true,
            None,
        );

        let err = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::AllSourcesFailed { .. }));
    }

    #[tokio::test]
    async fn test_live_scores_without_credential() {
        let s = setup(StaticTransport::new(), true, None);

        let live = s.manager.live_scores(Preference::Auto).await.unwrap();
        assert!(live.is_empty());
        assert_eq!(live.missing_credential(), Some("sportmonks"));
        assert_eq!(s.transport.calls(), 0);

        assert!(matches!(
            live.require(),
            Err(DataError::MissingCredential { .. })
        ));
    }

    #[tokio::test]
    async fn test_explicit_preference_without_capability() {
        let s = setup(StaticTransport::new(), true, Some("token"));
        assert!(matches!(
            s.manager
                .request::<TeamStatRow>(
                    Operation::TeamStats,
                    &Params::league_season("premier-league", "2023-2024"),
                    Preference::Live,
                )
                .await,
            Err(DataError::UnsupportedOperation { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_results_are_not_cached() {
        let s = setup(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), "[]"),
            true,
            None,
        );

        for _ in 0..2 {
            let fixtures = s
                .manager
                .fixtures("premier-league", "2023-2024", Preference::Auto)
                .await
                .unwrap();
            assert!(fixtures.is_empty());
        }
        assert_eq!(s.transport.calls(), 2);
        assert!(s.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_refetched() {
        let s = setup(
            StaticTransport::new().with_response(format!("{BRIDGE}/fbref/schedule"), schedule(3)),
            true,
            None,
        );
        let params = Params::league_season("premier-league", "2023-2024");
        let key = CacheKey::new("soccerdata", Operation::Fixtures, &params);
        let bogus = DataFrame::new(vec![Column::new("bogus".into(), [1_i64])]).unwrap();
        s.cache
            .put(&key, &bogus, Duration::from_secs(3600))
            .await
            .unwrap();

        let fixtures = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(fixtures.len(), 3);
        assert_eq!(s.transport.calls(), 1);

        let again = s
            .manager
            .fixtures("premier-league", "2023-2024", Preference::Auto)
            .await
            .unwrap();
        assert_eq!(again.len(), 3);
        assert_eq!(s.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_xg_consults_both_and_prefers_historical() {
        let understat = json!([{
            "game_id": 22256, "date": "2023-08-11 20:00:00",
            "home_team": "Burnley", "away_team": "Manchester City",
            "home_goals": 0, "away_goals": 3, "home_xg": 0.3, "away_xg": 2.41
        }])
        .to_string();
        let sportmonks = json!({"data": [{
            "id": 18535517, "starting_at": "2023-08-11 19:00:00",
            "participants": [
                {"name": "Burnley", "meta": {"location": "home"}},
                {"name": "Manchester City", "meta": {"location": "away"}}],
            "xgfixture": [
                {"type_id": 5304, "location": "home", "data": {"value": 0.4}},
                {"type_id": 5304, "location": "away", "data": {"value": 2.2}}]
        }]})
        .to_string();
        let s = setup(
            StaticTransport::new()
                .with_response(format!("{BRIDGE}/understat/schedule"), understat)
                .with_response(format!("{API}/fixtures"), sportmonks),
            true,
            Some("token"),
        );

        let xg = s.manager.xg("premier-league", "2023-2024", Preference::Auto).await.unwrap();
        assert_eq!(xg.source, Some(Provenance::Historical));
        assert_eq!(xg.records[0].home_xg, Some(0.3));
        assert_eq!(xg.attempts.len(), 2);
        assert!(xg.attempts.iter().all(|a| a.outcome.is_success()));
        assert_eq!(s.transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_typed_operations_honour_preference() {
        let sportmonks = json!({"data": [{
            "id": 18535517, "starting_at": "2023-08-11 19:00:00",
            "participants": [
                {"name": "Burnley", "meta": {"location": "home"}},
                {"name": "Manchester City", "meta": {"location": "away"}}],
            "xgfixture": [
                {"type_id": 5304, "location": "home", "data": {"value": 0.4}},
                {"type_id": 5304, "location": "away", "data": {"value": 2.2}}]
        }]})
        .to_string();
        let s = setup(
            StaticTransport::new().with_response(format!("{API}/fixtures"), sportmonks),
            true,
            Some("token"),
        );

        let xg = s
            .manager
            .xg("premier-league", "2023-2024", Preference::Live)
            .await
            .unwrap();
        assert_eq!(xg.source, Some(Provenance::Live));
        assert_eq!(xg.records[0].home_xg, Some(0.4));
        assert_eq!(xg.attempts.len(), 1);
        assert_eq!(s.transport.calls(), 1);

        assert!(matches!(
            s.manager
                .team_stats("premier-league", "2023-2024", Preference::Live)
                .await,
            Err(DataError::UnsupportedOperation { operation: Operation::TeamStats, .. })
        ));
    }

    #[tokio::test]
    async fn test_elo_request_carries_date() {
        let s = setup(
            StaticTransport::new().with_response(
                format!("{BRIDGE}/clubelo/by_date"),
                r#"[{"team": "Arsenal", "elo": 1950.3, "rank": 2, "country": "ENG"}]"#,
            ),
            true,
            None,
        );

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let ratings = s.manager.elo_ratings(Some(date), Preference::Auto).await.unwrap();
        assert_eq!(ratings.len(), 1);

        let today = s.manager.elo_ratings(None, Preference::Auto).await.unwrap();
        assert_eq!(today.len(), 1);

        let requests = s.transport.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].param("date"), Some("2024-01-15"));
        assert_eq!(
            requests[1].param("date").map(str::to_string),
            Some(Utc::now().date_naive().format("%Y-%m-%d").to_string())
        );
    }

    #[tokio::test]
    async fn test_status_reports_availability() {
        let s = setup(StaticTransport::new(), true, None);
        let status = s.manager.status();

        assert_eq!(status.len(), 2);
        assert_eq!(status[0].name, "soccerdata");
        assert!(status[0].availability.is_ready());
        assert_eq!(status[1].availability, Availability::MissingCredential);
        assert!(status[1].capabilities.contains(Operation::LiveScores));
        assert!(s.manager.is_available(Provenance::Historical));
        assert!(!s.manager.is_available(Provenance::Live));
    }

    #[tokio::test]
    async fn test_from_config_uses_disk_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = HybridConfig {
            cache_dir: dir.path().to_path_buf(),
            ..HybridConfig::default()
        };

        let manager = HybridDataManager::from_config(&config).unwrap();
        assert_eq!(manager.adapters().len(), 2);
        assert!(!manager.is_available(Provenance::Historical));
        assert!(!manager.is_available(Provenance::Live));

        let live = manager.live_scores(Preference::Auto).await.unwrap();
        assert_eq!(live.missing_credential(), Some("sportmonks"));
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_caching() {
        let dir = tempfile::tempdir().unwrap();
        let config = HybridConfig {
            cache_dir: dir.path().join("cache"),
            cache_ttl_hours: 0,
            ..HybridConfig::default()
        };

        let manager = HybridDataManager::from_config(&config).unwrap();
        assert!(format!("{manager:?}").contains("NoopCache"));
        assert!(!config.cache_dir.exists());
    }

    #[cfg(feature = "cache-sqlite")]
    #[tokio::test]
    async fn test_from_config_uses_sqlite_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let config = HybridConfig {
            sqlite_path: Some(path.clone()),
            cache_dir: dir.path().join("unused"),
            ..HybridConfig::default()
        };

        let manager = HybridDataManager::from_config(&config).unwrap();
        assert!(path.exists());
        assert!(!config.cache_dir.exists());
        assert_eq!(manager.cache().invalidate_stale().await.unwrap(), 0);
    }
}
