//! Mock snapshot provider for integration testing.
//!
//! Holds a league table and fixture list in memory, answers the three
//! reads from them, and can be told to fail specific reads. Counts every
//! call so tests can check the fan-out.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bet_standings::snapshot::SnapshotProvider;
use bet_standings::types::*;

/// Clock the mock treats as "now".
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 16, 0, 0).unwrap()
}

pub fn team(short_name: &str, tla: &str) -> TeamRef {
    TeamRef {
        id: 0,
        name: format!("{short_name} FC"),
        short_name: short_name.to_string(),
        tla: tla.to_string(),
    }
}

pub fn tla(short_name: &str) -> &'static str {
    match short_name {
        "Liverpool" => "LIV",
        "Chelsea" => "CHE",
        "Tottenham" => "TOT",
        "Everton" => "EVE",
        "Arsenal" => "ARS",
        _ => "UNK",
    }
}

pub fn assignments() -> [TeamAssignment; 3] {
    let a = |t: &str, p: &str, x: &str, y: &str| TeamAssignment {
        team: t.to_string(),
        player: p.to_string(),
        opponents: [x.to_string(), y.to_string()],
    };
    [
        a("Liverpool", "Steve", "Chelsea", "Tottenham"),
        a("Chelsea", "Tim", "Liverpool", "Tottenham"),
        a("Tottenham", "Thommo", "Liverpool", "Chelsea"),
    ]
}

/// A deterministic in-memory snapshot provider.
#[derive(Default)]
pub struct MockSnapshot {
    table: Vec<LeagueEntry>,
    matches: Vec<MatchOutcome>,
    next_id: u64,
    /// Reads to fail, keyed by (kind, team).
    failures: Arc<Mutex<HashMap<(&'static str, String), String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, short_name: &str, points: i32, played: i32) -> Self {
        self.table.push(LeagueEntry {
            position: self.table.len() as u32 + 1,
            team: team(short_name, tla(short_name)),
            played_games: played,
            won: 0,
            draw: 0,
            lost: 0,
            points,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
        });
        self
    }

    /// Add a fixture kicking off `days_ago` days before [`now`]
    /// (negative for future fixtures).
    pub fn with_match(
        mut self,
        home: &str,
        away: &str,
        status: MatchStatus,
        score: Option<(u32, u32)>,
        days_ago: i64,
    ) -> Self {
        self.next_id += 1;
        let full_time = match score {
            Some((h, a)) => ScoreLine { home: Some(h), away: Some(a) },
            None => ScoreLine::default(),
        };
        self.matches.push(MatchOutcome {
            id: self.next_id,
            utc_date: now() - Duration::days(days_ago) - Duration::minutes(30),
            status,
            matchday: None,
            home_team: team(home, tla(home)),
            away_team: team(away, tla(away)),
            score: Score { full_time, half_time: ScoreLine::default() },
        });
        self
    }

    pub fn fail_latest_match(&self, short_name: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(("latest", short_name.to_string()), "no latest match".into());
    }

    pub fn fail_league_entry(&self, short_name: &str, msg: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(("entry", short_name.to_string()), msg.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn failure(&self, kind: &'static str, team: &str) -> Option<String> {
        self.failures.lock().unwrap().get(&(kind, team.to_string())).cloned()
    }
}

#[async_trait]
impl SnapshotProvider for MockSnapshot {
    async fn league_entry(&self, team: &str) -> Result<LeagueEntry, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.failure("entry", team) {
            return Err(SnapshotError::UpstreamUnavailable(msg));
        }
        self.table
            .iter()
            .find(|e| e.team.is(team))
            .cloned()
            .ok_or_else(|| SnapshotError::RecordNotFound {
                kind: FetchKind::LeagueEntry,
                team: team.to_string(),
            })
    }

    async fn head_to_head_matches(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> Result<Vec<MatchOutcome>, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .matches
            .iter()
            .filter(|m| m.is_between(team_a, team_b))
            .cloned()
            .collect())
    }

    async fn latest_match(&self, team: &str) -> Result<MatchOutcome, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failure("latest", team).is_some() {
            return Err(SnapshotError::RecordNotFound {
                kind: FetchKind::LatestMatch,
                team: team.to_string(),
            });
        }
        self.matches
            .iter()
            .filter(|m| m.involves(team) && m.utc_date <= now())
            .max_by_key(|m| m.utc_date)
            .cloned()
            .ok_or_else(|| SnapshotError::RecordNotFound {
                kind: FetchKind::LatestMatch,
                team: team.to_string(),
            })
    }
}
