//! Shared types for the wager tracker.
//!
//! The snapshot-side records (`TeamRef`, `MatchOutcome`, `LeagueEntry`)
//! mirror the football-data.org v4 JSON shapes so both snapshot providers
//! can deserialize straight into them. The engine-side records
//! (`TeamProjection`, `SettlementEntry`) are built fresh per request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Match status
// ---------------------------------------------------------------------------

/// Fixture status as reported by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Suspended,
    Postponed,
    Cancelled,
    Awarded,
}

impl MatchStatus {
    pub fn has_finished(&self) -> bool {
        *self == MatchStatus::Finished
    }

    /// In play or paused at half time.
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::InPlay | MatchStatus::Paused)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Timed => "TIMED",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Paused => "PAUSED",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Suspended => "SUSPENDED",
            MatchStatus::Postponed => "POSTPONED",
            MatchStatus::Cancelled => "CANCELLED",
            MatchStatus::Awarded => "AWARDED",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Upstream short names that are displayed (and looked up) differently.
const SHORT_NAME_OVERRIDES: &[(&str, &str)] = &[
    ("Brighton Hove", "Brighton"),
    ("Wolverhampton", "Wolves"),
    ("Nottingham", "Notts Forest"),
];

/// Map an upstream short name to the name used throughout the wager.
pub fn normalise_short_name(short_name: &str) -> &str {
    SHORT_NAME_OVERRIDES
        .iter()
        .find(|(upstream, _)| *upstream == short_name)
        .map(|(_, display)| *display)
        .unwrap_or(short_name)
}

/// A team as embedded in table entries and fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub short_name: String,
    /// Three-letter code, e.g. "LIV".
    #[serde(default)]
    pub tla: String,
}

impl TeamRef {
    pub fn display_name(&self) -> &str {
        normalise_short_name(&self.short_name)
    }

    /// Whether this team is the one the wager calls `team`.
    pub fn is(&self, team: &str) -> bool {
        self.short_name == team || self.display_name() == team
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Goals for each side; `None` before kick-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Running score while a match is live, final score once finished.
    #[serde(default)]
    pub full_time: ScoreLine,
    #[serde(default)]
    pub half_time: ScoreLine,
}

/// One fixture between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    #[serde(default)]
    pub id: u64,
    pub utc_date: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default)]
    pub matchday: Option<u32>,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    #[serde(default)]
    pub score: Score,
}

impl MatchOutcome {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team.is(team) || self.away_team.is(team)
    }

    /// Fixture between `team_a` and `team_b`, either way round.
    pub fn is_between(&self, team_a: &str, team_b: &str) -> bool {
        (self.home_team.is(team_a) && self.away_team.is(team_b))
            || (self.home_team.is(team_b) && self.away_team.is(team_a))
    }

    /// League points `team` would take from the current full-time score:
    /// 3 when ahead, 1 when level, 0 when behind or not playing.
    pub fn points_for(&self, team: &str) -> i32 {
        let home = self.score.full_time.home.unwrap_or(0);
        let away = self.score.full_time.away.unwrap_or(0);

        let (own, other) = if self.home_team.is(team) {
            (home, away)
        } else if self.away_team.is(team) {
            (away, home)
        } else {
            return 0;
        };

        match own.cmp(&other) {
            Ordering::Greater => 3,
            Ordering::Equal => 1,
            Ordering::Less => 0,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {} ({})",
            self.home_team.display_name(),
            self.score.full_time.home.unwrap_or(0),
            self.score.full_time.away.unwrap_or(0),
            self.away_team.display_name(),
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// League table
// ---------------------------------------------------------------------------

/// One row of the live league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub position: u32,
    pub team: TeamRef,
    pub played_games: i32,
    #[serde(default)]
    pub won: i32,
    #[serde(default)]
    pub draw: i32,
    #[serde(default)]
    pub lost: i32,
    pub points: i32,
    #[serde(default)]
    pub goals_for: i32,
    #[serde(default)]
    pub goals_against: i32,
    #[serde(default)]
    pub goal_difference: i32,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Display details of a match that is currently being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMatch {
    /// Home side's three-letter code.
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
}

/// Per-team working record for one settlement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamProjection {
    pub team_name: String,
    pub player_name: String,
    /// Points on the table, live match included.
    pub current_points: i32,
    /// `current_points` less whatever a live match is currently worth.
    pub adjusted_points: i32,
    pub matches_played: i32,
    /// Fixtures still to be completed; a live match counts as remaining.
    pub remaining_matches: i32,
    /// Unfinished fixtures between the two rival teams.
    pub remaining_head_to_head_matches: i32,
    pub live_match: Option<LiveMatch>,
}

impl TeamProjection {
    pub fn is_live(&self) -> bool {
        self.live_match.is_some()
    }
}

// ---------------------------------------------------------------------------
// Wager
// ---------------------------------------------------------------------------

/// One party to the wager: the team they hold and the two rival teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub team: String,
    pub player: String,
    pub opponents: [String; 2],
}

/// Which way money moves between two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OweDirection {
    /// Self is behind and pays the other player.
    To,
    /// Self is level or ahead and collects from the other player.
    From,
}

impl OweDirection {
    /// Ties resolve to `From`.
    pub fn between(own_points: i32, other_points: i32) -> Self {
        if own_points < other_points {
            OweDirection::To
        } else {
            OweDirection::From
        }
    }

    pub fn label(&self, counterparty: &str) -> String {
        format!("{self} {counterparty}")
    }
}

impl fmt::Display for OweDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OweDirection::To => write!(f, "To"),
            OweDirection::From => write!(f, "From"),
        }
    }
}

/// One player's row in the settlement response.
///
/// Field names are the wire format consumed by the bet page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEntry {
    /// Lower-cased team name.
    pub team_name: String,
    #[serde(rename = "name")]
    pub player_name: String,
    pub played: i32,
    pub points: i32,
    #[serde(rename = "owea")]
    pub owe_a: String,
    #[serde(rename = "amounta")]
    pub amount_a: i32,
    #[serde(rename = "oweb")]
    pub owe_b: String,
    #[serde(rename = "amountb")]
    pub amount_b: i32,
    pub best_case: i32,
    pub worst_case: i32,
    pub balance: String,
    pub balance_amount: i32,
    pub live: bool,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The three reads a team build performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    LeagueEntry,
    HeadToHead,
    LatestMatch,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::LeagueEntry => write!(f, "league entry"),
            FetchKind::HeadToHead => write!(f, "head-to-head matches"),
            FetchKind::LatestMatch => write!(f, "latest match"),
        }
    }
}

/// Failures reported by a snapshot provider.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("No {kind} found for {team}")]
    RecordNotFound { kind: FetchKind, team: String },

    #[error("Failed to decode snapshot record: {0}")]
    Decode(String),
}

/// Failures of a whole settlement computation.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Failed to fetch {kind} for {team}: {source}")]
    Fetch {
        kind: FetchKind,
        team: String,
        #[source]
        source: SnapshotError,
    },

    #[error("Team projection task failed: {0}")]
    TaskFailed(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
