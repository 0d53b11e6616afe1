//! Snapshot providers.
//!
//! Defines the `SnapshotProvider` trait the engine reads league and
//! fixture data through, and provides implementations for:
//! - football-data.org v4 REST API (live feed)
//! - a JSON snapshot file on disk (offline runs)

pub mod file;
pub mod football_data;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, ProviderConfig, ProviderKind};
use crate::types::{FetchKind, LeagueEntry, MatchOutcome, SnapshotError};

use self::file::FileSnapshot;
use self::football_data::FootballDataClient;

/// Read-only access to a league table and its fixtures.
///
/// Implementors bound each call with their own timeout; the engine treats
/// a timeout like any other fetch failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// The team's current row in the league table.
    async fn league_entry(&self, team: &str) -> Result<LeagueEntry, SnapshotError>;

    /// Every fixture between `team_a` and `team_b`, in any order.
    async fn head_to_head_matches(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> Result<Vec<MatchOutcome>, SnapshotError>;

    /// The team's most recent fixture that kicked off at or before now.
    async fn latest_match(&self, team: &str) -> Result<MatchOutcome, SnapshotError>;
}

/// Build the provider selected in config.
pub fn from_config(cfg: &ProviderConfig) -> Result<Arc<dyn SnapshotProvider>> {
    match cfg.kind {
        ProviderKind::FootballData => {
            let api_key = match cfg.api_key_env.as_deref() {
                Some(env) => Some(SecretString::new(AppConfig::resolve_env(env)?)),
                None => None,
            };
            let client = FootballDataClient::new(
                &cfg.base_url,
                &cfg.competition,
                api_key,
                Duration::from_secs(cfg.timeout_secs),
            )?
            .with_cache_ttl(Duration::from_secs(cfg.cache_ttl_secs));
            Ok(Arc::new(client))
        }
        ProviderKind::File => {
            let path = cfg
                .snapshot_path
                .as_deref()
                .context("provider.snapshot_path is required for the file provider")?;
            Ok(Arc::new(FileSnapshot::load(path)?))
        }
    }
}

// ---------------------------------------------------------------------------
// Selection helpers shared by providers that hold a full table/fixture list
// ---------------------------------------------------------------------------

pub(crate) fn find_league_entry(
    table: &[LeagueEntry],
    team: &str,
) -> Result<LeagueEntry, SnapshotError> {
    table
        .iter()
        .find(|entry| entry.team.is(team))
        .cloned()
        .ok_or_else(|| SnapshotError::RecordNotFound {
            kind: FetchKind::LeagueEntry,
            team: team.to_string(),
        })
}

pub(crate) fn select_head_to_head(
    matches: &[MatchOutcome],
    team_a: &str,
    team_b: &str,
) -> Vec<MatchOutcome> {
    matches
        .iter()
        .filter(|m| m.is_between(team_a, team_b))
        .cloned()
        .collect()
}

pub(crate) fn select_latest(
    matches: &[MatchOutcome],
    team: &str,
    now: DateTime<Utc>,
) -> Result<MatchOutcome, SnapshotError> {
    matches
        .iter()
        .filter(|m| m.involves(team) && m.utc_date <= now)
        .max_by_key(|m| m.utc_date)
        .cloned()
        .ok_or_else(|| SnapshotError::RecordNotFound {
            kind: FetchKind::LatestMatch,
            team: team.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
