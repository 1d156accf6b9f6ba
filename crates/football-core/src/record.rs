//! Record sets and their columnar form.
//!
//! Adapters return a [`RecordSet`], one variant per record type. The cache
//! stores record sets as polars [`DataFrame`]s; [`Record`] converts a record
//! type to and from its frame. Dates are stored as `%Y-%m-%d` text and
//! provenance as its lowercase name, so frames read back exactly.

use polars::prelude::*;

use crate::{
    error::{DataError, Result},
    frame,
    operation::Operation,
    types::{
        EloRating, Fixture, LiveMatchState, OddsRecord, Prediction, Provenance, ShotEvent,
        StandingRow, TeamStatRow, XgRecord,
    },
};

/// Normalized records of a single type.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordSet {
    /// Fixtures.
    Fixtures(Vec<Fixture>),
    /// Season team statistics.
    TeamStats(Vec<TeamStatRow>),
    /// Match expected goals.
    Xg(Vec<XgRecord>),
    /// Shot events.
    Shots(Vec<ShotEvent>),
    /// Bookmaker odds, historical or in-play.
    Odds(Vec<OddsRecord>),
    /// Club Elo ratings.
    Elo(Vec<EloRating>),
    /// In-play match states.
    Live(Vec<LiveMatchState>),
    /// Outcome probabilities.
    Predictions(Vec<Prediction>),
    /// League table rows.
    Standings(Vec<StandingRow>),
}

impl RecordSet {
    /// Returns the empty set of the type an operation produces.
    #[must_use]
    pub const fn empty_for(operation: Operation) -> Self {
        match operation {
            Operation::Fixtures => Self::Fixtures(Vec::new()),
            Operation::TeamStats => Self::TeamStats(Vec::new()),
            Operation::Xg => Self::Xg(Vec::new()),
            Operation::ShotCoordinates => Self::Shots(Vec::new()),
            Operation::HistoricalOdds | Operation::LiveOdds => Self::Odds(Vec::new()),
            Operation::LiveScores => Self::Live(Vec::new()),
            Operation::EloRatings => Self::Elo(Vec::new()),
            Operation::Predictions => Self::Predictions(Vec::new()),
            Operation::Standings => Self::Standings(Vec::new()),
        }
    }

    /// Name of the contained record type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fixtures(_) => Fixture::KIND,
            Self::TeamStats(_) => TeamStatRow::KIND,
            Self::Xg(_) => XgRecord::KIND,
            Self::Shots(_) => ShotEvent::KIND,
            Self::Odds(_) => OddsRecord::KIND,
            Self::Elo(_) => EloRating::KIND,
            Self::Live(_) => LiveMatchState::KIND,
            Self::Predictions(_) => Prediction::KIND,
            Self::Standings(_) => StandingRow::KIND,
        }
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Fixtures(v) => v.len(),
            Self::TeamStats(v) => v.len(),
            Self::Xg(v) => v.len(),
            Self::Shots(v) => v.len(),
            Self::Odds(v) => v.len(),
            Self::Elo(v) => v.len(),
            Self::Live(v) => v.len(),
            Self::Predictions(v) => v.len(),
            Self::Standings(v) => v.len(),
        }
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the records to their cache frame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        match self {
            Self::Fixtures(v) => Fixture::to_frame(v),
            Self::TeamStats(v) => TeamStatRow::to_frame(v),
            Self::Xg(v) => XgRecord::to_frame(v),
            Self::Shots(v) => ShotEvent::to_frame(v),
            Self::Odds(v) => OddsRecord::to_frame(v),
            Self::Elo(v) => EloRating::to_frame(v),
            Self::Live(v) => LiveMatchState::to_frame(v),
            Self::Predictions(v) => Prediction::to_frame(v),
            Self::Standings(v) => StandingRow::to_frame(v),
        }
    }

    /// Reads a cache frame back as the record type an operation produces.
    pub fn from_frame(operation: Operation, frame: &DataFrame) -> Result<Self> {
        Ok(match Self::empty_for(operation) {
            Self::Fixtures(_) => Self::Fixtures(Fixture::from_frame(frame)?),
            Self::TeamStats(_) => Self::TeamStats(TeamStatRow::from_frame(frame)?),
            Self::Xg(_) => Self::Xg(XgRecord::from_frame(frame)?),
            Self::Shots(_) => Self::Shots(ShotEvent::from_frame(frame)?),
            Self::Odds(_) => Self::Odds(OddsRecord::from_frame(frame)?),
            Self::Elo(_) => Self::Elo(EloRating::from_frame(frame)?),
            Self::Live(_) => Self::Live(LiveMatchState::from_frame(frame)?),
            Self::Predictions(_) => Self::Predictions(Prediction::from_frame(frame)?),
            Self::Standings(_) => Self::Standings(StandingRow::from_frame(frame)?),
        })
    }
}

/// A normalized record type with a columnar cache form.
pub trait Record: Clone + Send + Sync + Sized + 'static {
    /// Record type name used in diagnostics.
    const KIND: &'static str;

    /// Adapter that produced the record.
    fn provenance(&self) -> Provenance;

    /// Wraps records in their [`RecordSet`] variant.
    fn into_set(records: Vec<Self>) -> RecordSet;

    /// Unwraps records from a [`RecordSet`], failing on a type mismatch.
    fn from_set(set: RecordSet) -> Result<Vec<Self>>;

    /// Converts records to a frame.
    fn to_frame(records: &[Self]) -> Result<DataFrame>;

    /// Reads records back from a frame.
    fn from_frame(frame: &DataFrame) -> Result<Vec<Self>>;
}

fn mismatch(expected: &str, set: &RecordSet) -> DataError {
    DataError::Other(format!(
        "Expected {expected} records, got {}",
        set.kind()
    ))
}

macro_rules! record_set_variant {
    ($kind:literal, $variant:ident) => {
        const KIND: &'static str = $kind;

        fn provenance(&self) -> Provenance {
            self.provenance
        }

        fn into_set(records: Vec<Self>) -> RecordSet {
            RecordSet::$variant(records)
        }

        fn from_set(set: RecordSet) -> Result<Vec<Self>> {
            match set {
                RecordSet::$variant(records) => Ok(records),
                other => Err(mismatch(Self::KIND, &other)),
            }
        }
    };
}

fn col<T, P>(name: &str, values: T) -> Column
where
    Series: NamedFrom<T, P>,
    P: ?Sized,
{
    Column::new(name.into(), values)
}

impl Record for Fixture {
    record_set_variant!("fixture", Fixtures);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("id", records.iter().map(|r| r.id.clone()).collect::<Vec<_>>()),
            col("date", frame::date_strings(records.iter().map(|r| r.date))),
            col("league_id", records.iter().map(|r| r.league_id.clone()).collect::<Vec<_>>()),
            col("home_team", records.iter().map(|r| r.home_team.clone()).collect::<Vec<_>>()),
            col("away_team", records.iter().map(|r| r.away_team.clone()).collect::<Vec<_>>()),
            col("home_score", records.iter().map(|r| r.home_score).collect::<Vec<_>>()),
            col("away_score", records.iter().map(|r| r.away_score).collect::<Vec<_>>()),
            col("venue", records.iter().map(|r| r.venue.clone()).collect::<Vec<_>>()),
            col("state", records.iter().map(|r| r.state.clone()).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let id = frame::text(df, "id")?;
        let date = frame::date(df, "date")?;
        let league_id = frame::text(df, "league_id")?;
        let home_team = frame::text(df, "home_team")?;
        let away_team = frame::text(df, "away_team")?;
        let home_score = frame::opt_int(df, "home_score")?;
        let away_score = frame::opt_int(df, "away_score")?;
        let venue = frame::opt_text(df, "venue")?;
        let state = frame::text(df, "state")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                id: id[i].clone(),
                date: date[i],
                league_id: league_id[i].clone(),
                home_team: home_team[i].clone(),
                away_team: away_team[i].clone(),
                home_score: home_score[i],
                away_score: away_score[i],
                venue: venue[i].clone(),
                state: state[i].clone(),
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for TeamStatRow {
    record_set_variant!("team_stat", TeamStats);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("team", records.iter().map(|r| r.team.clone()).collect::<Vec<_>>()),
            col("league", records.iter().map(|r| r.league.clone()).collect::<Vec<_>>()),
            col("season", records.iter().map(|r| r.season.clone()).collect::<Vec<_>>()),
            col("matches_played", records.iter().map(|r| r.matches_played).collect::<Vec<_>>()),
            col("wins", records.iter().map(|r| r.wins).collect::<Vec<_>>()),
            col("draws", records.iter().map(|r| r.draws).collect::<Vec<_>>()),
            col("losses", records.iter().map(|r| r.losses).collect::<Vec<_>>()),
            col("goals", records.iter().map(|r| r.goals).collect::<Vec<_>>()),
            col("goals_against", records.iter().map(|r| r.goals_against).collect::<Vec<_>>()),
            col("xg", records.iter().map(|r| r.xg).collect::<Vec<_>>()),
            col("xga", records.iter().map(|r| r.xga).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let team = frame::text(df, "team")?;
        let league = frame::text(df, "league")?;
        let season = frame::text(df, "season")?;
        let matches_played = frame::opt_int(df, "matches_played")?;
        let wins = frame::opt_int(df, "wins")?;
        let draws = frame::opt_int(df, "draws")?;
        let losses = frame::opt_int(df, "losses")?;
        let goals = frame::opt_int(df, "goals")?;
        let goals_against = frame::opt_int(df, "goals_against")?;
        let xg = frame::opt_float(df, "xg")?;
        let xga = frame::opt_float(df, "xga")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                team: team[i].clone(),
                league: league[i].clone(),
                season: season[i].clone(),
                matches_played: matches_played[i],
                wins: wins[i],
                draws: draws[i],
                losses: losses[i],
                goals: goals[i],
                goals_against: goals_against[i],
                xg: xg[i],
                xga: xga[i],
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for XgRecord {
    record_set_variant!("xg", Xg);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("fixture_id", records.iter().map(|r| r.fixture_id.clone()).collect::<Vec<_>>()),
            col("date", frame::date_strings(records.iter().map(|r| r.date))),
            col("home_team", records.iter().map(|r| r.home_team.clone()).collect::<Vec<_>>()),
            col("away_team", records.iter().map(|r| r.away_team.clone()).collect::<Vec<_>>()),
            col("home_goals", records.iter().map(|r| r.home_goals).collect::<Vec<_>>()),
            col("away_goals", records.iter().map(|r| r.away_goals).collect::<Vec<_>>()),
            col("home_xg", records.iter().map(|r| r.home_xg).collect::<Vec<_>>()),
            col("away_xg", records.iter().map(|r| r.away_xg).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let fixture_id = frame::text(df, "fixture_id")?;
        let date = frame::date(df, "date")?;
        let home_team = frame::text(df, "home_team")?;
        let away_team = frame::text(df, "away_team")?;
        let home_goals = frame::opt_int(df, "home_goals")?;
        let away_goals = frame::opt_int(df, "away_goals")?;
        let home_xg = frame::opt_float(df, "home_xg")?;
        let away_xg = frame::opt_float(df, "away_xg")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                fixture_id: fixture_id[i].clone(),
                date: date[i],
                home_team: home_team[i].clone(),
                away_team: away_team[i].clone(),
                home_goals: home_goals[i],
                away_goals: away_goals[i],
                home_xg: home_xg[i],
                away_xg: away_xg[i],
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for ShotEvent {
    record_set_variant!("shot", Shots);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("fixture_id", records.iter().map(|r| r.fixture_id.clone()).collect::<Vec<_>>()),
            col("team", records.iter().map(|r| r.team.clone()).collect::<Vec<_>>()),
            col("player", records.iter().map(|r| r.player.clone()).collect::<Vec<_>>()),
            col("minute", records.iter().map(|r| r.minute).collect::<Vec<_>>()),
            col("x", records.iter().map(|r| r.x).collect::<Vec<_>>()),
            col("y", records.iter().map(|r| r.y).collect::<Vec<_>>()),
            col("xg", records.iter().map(|r| r.xg).collect::<Vec<_>>()),
            col("result", records.iter().map(|r| r.result.clone()).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let fixture_id = frame::text(df, "fixture_id")?;
        let team = frame::text(df, "team")?;
        let player = frame::text(df, "player")?;
        let minute = frame::opt_int(df, "minute")?;
        let x = frame::float(df, "x")?;
        let y = frame::float(df, "y")?;
        let xg = frame::opt_float(df, "xg")?;
        let result = frame::text(df, "result")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                fixture_id: fixture_id[i].clone(),
                team: team[i].clone(),
                player: player[i].clone(),
                minute: minute[i],
                x: x[i],
                y: y[i],
                xg: xg[i],
                result: result[i].clone(),
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for OddsRecord {
    record_set_variant!("odds", Odds);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("fixture_id", records.iter().map(|r| r.fixture_id.clone()).collect::<Vec<_>>()),
            col("date", frame::opt_date_strings(records.iter().map(|r| r.date))),
            col("home_team", records.iter().map(|r| r.home_team.clone()).collect::<Vec<_>>()),
            col("away_team", records.iter().map(|r| r.away_team.clone()).collect::<Vec<_>>()),
            col("bookmaker", records.iter().map(|r| r.bookmaker.clone()).collect::<Vec<_>>()),
            col("home", records.iter().map(|r| r.home).collect::<Vec<_>>()),
            col("draw", records.iter().map(|r| r.draw).collect::<Vec<_>>()),
            col("away", records.iter().map(|r| r.away).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let fixture_id = frame::opt_text(df, "fixture_id")?;
        let date = frame::opt_date(df, "date")?;
        let home_team = frame::text(df, "home_team")?;
        let away_team = frame::text(df, "away_team")?;
        let bookmaker = frame::text(df, "bookmaker")?;
        let home = frame::opt_float(df, "home")?;
        let draw = frame::opt_float(df, "draw")?;
        let away = frame::opt_float(df, "away")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                fixture_id: fixture_id[i].clone(),
                date: date[i],
                home_team: home_team[i].clone(),
                away_team: away_team[i].clone(),
                bookmaker: bookmaker[i].clone(),
                home: home[i],
                draw: draw[i],
                away: away[i],
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for EloRating {
    record_set_variant!("elo", Elo);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("team", records.iter().map(|r| r.team.clone()).collect::<Vec<_>>()),
            col("elo", records.iter().map(|r| r.elo).collect::<Vec<_>>()),
            col("rank", records.iter().map(|r| r.rank).collect::<Vec<_>>()),
            col("country", records.iter().map(|r| r.country.clone()).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let team = frame::text(df, "team")?;
        let elo = frame::float(df, "elo")?;
        let rank = frame::opt_int(df, "rank")?;
        let country = frame::opt_text(df, "country")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                team: team[i].clone(),
                elo: elo[i],
                rank: rank[i],
                country: country[i].clone(),
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for LiveMatchState {
    record_set_variant!("live_match", Live);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("fixture_id", records.iter().map(|r| r.fixture_id.clone()).collect::<Vec<_>>()),
            col("minute", records.iter().map(|r| r.minute).collect::<Vec<_>>()),
            col("home_team", records.iter().map(|r| r.home_team.clone()).collect::<Vec<_>>()),
            col("away_team", records.iter().map(|r| r.away_team.clone()).collect::<Vec<_>>()),
            col("home_score", records.iter().map(|r| r.home_score).collect::<Vec<_>>()),
            col("away_score", records.iter().map(|r| r.away_score).collect::<Vec<_>>()),
            col("state", records.iter().map(|r| r.state.clone()).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let fixture_id = frame::text(df, "fixture_id")?;
        let minute = frame::opt_int(df, "minute")?;
        let home_team = frame::text(df, "home_team")?;
        let away_team = frame::text(df, "away_team")?;
        let home_score = frame::opt_int(df, "home_score")?;
        let away_score = frame::opt_int(df, "away_score")?;
        let state = frame::text(df, "state")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                fixture_id: fixture_id[i].clone(),
                minute: minute[i],
                home_team: home_team[i].clone(),
                away_team: away_team[i].clone(),
                home_score: home_score[i],
                away_score: away_score[i],
                state: state[i].clone(),
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for Prediction {
    record_set_variant!("prediction", Predictions);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("fixture_id", records.iter().map(|r| r.fixture_id.clone()).collect::<Vec<_>>()),
            col("home_win", records.iter().map(|r| r.home_win).collect::<Vec<_>>()),
            col("draw", records.iter().map(|r| r.draw).collect::<Vec<_>>()),
            col("away_win", records.iter().map(|r| r.away_win).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let fixture_id = frame::text(df, "fixture_id")?;
        let home_win = frame::opt_float(df, "home_win")?;
        let draw = frame::opt_float(df, "draw")?;
        let away_win = frame::opt_float(df, "away_win")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                fixture_id: fixture_id[i].clone(),
                home_win: home_win[i],
                draw: draw[i],
                away_win: away_win[i],
                provenance: provenance[i],
            })
            .collect())
    }
}

impl Record for StandingRow {
    record_set_variant!("standing", Standings);

    fn to_frame(records: &[Self]) -> Result<DataFrame> {
        frame::build(vec![
            col("position", records.iter().map(|r| r.position).collect::<Vec<_>>()),
            col("team", records.iter().map(|r| r.team.clone()).collect::<Vec<_>>()),
            col("played", records.iter().map(|r| r.played).collect::<Vec<_>>()),
            col("won", records.iter().map(|r| r.won).collect::<Vec<_>>()),
            col("drawn", records.iter().map(|r| r.drawn).collect::<Vec<_>>()),
            col("lost", records.iter().map(|r| r.lost).collect::<Vec<_>>()),
            col("goals_for", records.iter().map(|r| r.goals_for).collect::<Vec<_>>()),
            col("goals_against", records.iter().map(|r| r.goals_against).collect::<Vec<_>>()),
            col("goal_difference", records.iter().map(|r| r.goal_difference).collect::<Vec<_>>()),
            col("points", records.iter().map(|r| r.points).collect::<Vec<_>>()),
            col("provenance", frame::provenance_strings(records.iter().map(|r| r.provenance))),
        ])
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let position = frame::int(df, "position")?;
        let team = frame::text(df, "team")?;
        let played = frame::opt_int(df, "played")?;
        let won = frame::opt_int(df, "won")?;
        let drawn = frame::opt_int(df, "drawn")?;
        let lost = frame::opt_int(df, "lost")?;
        let goals_for = frame::opt_int(df, "goals_for")?;
        let goals_against = frame::opt_int(df, "goals_against")?;
        let goal_difference = frame::opt_int(df, "goal_difference")?;
        let points = frame::int(df, "points")?;
        let provenance = frame::provenance(df)?;

        Ok((0..df.height())
            .map(|i| Self {
                position: position[i],
                team: team[i].clone(),
                played: played[i],
                won: won[i],
                drawn: drawn[i],
                lost: lost[i],
                goals_for: goals_for[i],
                goals_against: goals_against[i],
                goal_difference: goal_difference[i],
                points: points[i],
                provenance: provenance[i],
            })
            .collect())
    }
}
