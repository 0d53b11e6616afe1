//! football-data.org v4 integration.
//!
//! Live league table and fixture feed.
//!
//! API docs: https://docs.football-data.org/general/v4/
//! Base URL: https://api.football-data.org/v4
//! Auth: `X-Auth-Token` header. Free tier: 10 requests/minute.
//!
//! Every read pulls the whole competition resource and selects locally;
//! the feed has no per-team table endpoint and head-to-head lookups by
//! team pair are not supported. Each resource is kept for a short TTL and
//! concurrent reads wait on a single in-flight request, so one settlement
//! costs at most one standings call and one matches call.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{find_league_entry, select_head_to_head, select_latest, SnapshotProvider};
use crate::types::{FetchKind, LeagueEntry, MatchOutcome, SnapshotError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org/v4";

/// Standings come in TOTAL / HOME / AWAY flavours; only TOTAL is the table.
const TOTAL_STANDING: &str = "TOTAL";

/// How long a fetched table or fixture list is reused.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    standings: Vec<Standing>,
}

#[derive(Debug, Deserialize)]
struct Standing {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    table: Vec<LeagueEntry>,
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<MatchOutcome>,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct CacheEntry<T> {
    value: Arc<Vec<T>>,
    fetched_at: Instant,
}

/// One cached resource. The lock is held across the fetch, so callers
/// arriving mid-request wait for it instead of issuing their own.
struct ResourceCache<T> {
    entry: Mutex<Option<CacheEntry<T>>>,
}

impl<T> ResourceCache<T> {
    fn new() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }

    /// Failed fetches are not stored.
    async fn get_or_fetch<F, Fut>(&self, ttl: Duration, fetch: F) -> Result<Arc<Vec<T>>, SnapshotError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, SnapshotError>>,
    {
        let mut entry = self.entry.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < ttl {
                return Ok(Arc::clone(&cached.value));
            }
        }

        let value = Arc::new(fetch().await?);
        *entry = Some(CacheEntry {
            value: Arc::clone(&value),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct FootballDataClient {
    http: Client,
    base_url: String,
    /// Competition code, e.g. "PL".
    competition: String,
    api_key: Option<SecretString>,
    cache_ttl: Duration,
    table_cache: ResourceCache<LeagueEntry>,
    matches_cache: ResourceCache<MatchOutcome>,
}

impl FootballDataClient {
    /// `timeout` bounds each individual request.
    pub fn new(
        base_url: &str,
        competition: &str,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("bet-standings/0.1.0")
            .build()
            .context("Failed to build HTTP client for football-data.org")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            competition: competition.to_string(),
            api_key,
            cache_ttl: DEFAULT_CACHE_TTL,
            table_cache: ResourceCache::new(),
            matches_cache: ResourceCache::new(),
        })
    }

    /// `Duration::ZERO` refetches on every read.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    fn standings_url(&self) -> String {
        format!("{}/competitions/{}/standings", self.base_url, self.competition)
    }

    fn matches_url(&self) -> String {
        format!("{}/competitions/{}/matches", self.base_url, self.competition)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SnapshotError> {
        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Auth-Token", key.expose_secret().as_str());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SnapshotError::UpstreamUnavailable(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::status_error(url, status));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| SnapshotError::UpstreamUnavailable(format!("{url}: {e}")))?;

        Self::decode(&body)
    }

    fn status_error(url: &str, status: StatusCode) -> SnapshotError {
        SnapshotError::UpstreamUnavailable(format!("{url} returned {status}"))
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SnapshotError> {
        serde_json::from_str(body).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// The TOTAL table out of a standings payload.
    fn total_table(resp: StandingsResponse) -> Result<Vec<LeagueEntry>, SnapshotError> {
        resp.standings
            .into_iter()
            .find(|s| s.kind == TOTAL_STANDING)
            .map(|s| s.table)
            .ok_or_else(|| SnapshotError::Decode("standings payload has no TOTAL table".into()))
    }

    async fn fetch_table(&self) -> Result<Vec<LeagueEntry>, SnapshotError> {
        let url = self.standings_url();
        debug!(url = %url, "Fetching league table");
        let resp: StandingsResponse = self.get_json(&url).await?;
        Self::total_table(resp)
    }

    async fn fetch_matches(&self) -> Result<Vec<MatchOutcome>, SnapshotError> {
        let url = self.matches_url();
        debug!(url = %url, "Fetching competition matches");
        let resp: MatchesResponse = self.get_json(&url).await?;
        Ok(resp.matches)
    }

    async fn table(&self) -> Result<Arc<Vec<LeagueEntry>>, SnapshotError> {
        self.table_cache.get_or_fetch(self.cache_ttl, || self.fetch_table()).await
    }

    async fn matches(&self) -> Result<Arc<Vec<MatchOutcome>>, SnapshotError> {
        self.matches_cache.get_or_fetch(self.cache_ttl, || self.fetch_matches()).await
    }
}

// ---------------------------------------------------------------------------
// SnapshotProvider trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl SnapshotProvider for FootballDataClient {
    async fn league_entry(&self, team: &str) -> Result<LeagueEntry, SnapshotError> {
        let table = self.table().await?;
        let entry = find_league_entry(&table, team)?;
        debug!(
            team,
            kind = %FetchKind::LeagueEntry,
            points = entry.points,
            played = entry.played_games,
            "Fetched"
        );
        Ok(entry)
    }

    async fn head_to_head_matches(
        &self,
        team_a: &str,
        team_b: &str,
    ) -> Result<Vec<MatchOutcome>, SnapshotError> {
        let matches = self.matches().await?;
        let h2h = select_head_to_head(&matches, team_a, team_b);
        debug!(team_a, team_b, kind = %FetchKind::HeadToHead, count = h2h.len(), "Fetched");
        Ok(h2h)
    }

    async fn latest_match(&self, team: &str) -> Result<MatchOutcome, SnapshotError> {
        let matches = self.matches().await?;
        let latest = select_latest(&matches, team, Utc::now())?;
        debug!(team, kind = %FetchKind::LatestMatch, fixture = %latest, "Fetched");
        Ok(latest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
