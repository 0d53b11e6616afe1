//! File-backed snapshot provider.
//!
//! Loads a league table and fixture list from a JSON file once at
//! startup. Useful for offline runs and for reproducing a settlement
//! from a saved feed dump. The file uses the same record shapes as
//! the football-data.org feed:
//!
//! ```json
//! { "table": [ <LeagueEntry>, ... ], "matches": [ <MatchOutcome>, ... ] }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::{find_league_entry, select_head_to_head, select_latest, SnapshotProvider};
use crate::types::{LeagueEntry, MatchOutcome, SnapshotError};

/// Raw contents of a snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub table: Vec<LeagueEntry>,
    #[serde(default)]
    pub matches: Vec<MatchOutcome>,
}

pub struct FileSnapshot {
    snapshot: Snapshot,
    /// Fixed "now" for latest-match lookups; wall clock when unset.
    as_of: Option<DateTime<Utc>>,
}

impl FileSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, as_of: None }
    }

    /// Pin the clock used to decide which fixtures have kicked off.
    pub fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(now);
        self
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;

        let snapshot: Snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse snapshot from {}", path.display()))?;

        info!(
            path = %path.display(),
            teams = snapshot.table.len(),
            matches = snapshot.matches.len(),
            "Snapshot loaded from disk"
        );

        Ok(Self::new(snapshot))
    }

    fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl SnapshotProvider for FileSnapshot {
    async fn league_entry(&self, team: &str) -> Result<LeagueEntry, SnapshotError> {
        find_league_entry(&self.snapshot.table, team)
    }

    async fn head_to_head_matches(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> Result<Vec<MatchOutcome>, SnapshotError> {
        Ok(select_head_to_head(&self.snapshot.matches, team_a, team_b))
    }

    async fn latest_match(&self, team: &str) -> Result<MatchOutcome, SnapshotError> {
        select_latest(&self.snapshot.matches, team, self.now())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
