//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the feed API key) are referenced by env-var name in the config
//! and resolved at runtime via `std::env::var`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

use crate::engine::{LeagueRules, DEFAULT_SEASON_LENGTH, DEFAULT_STAKE_PER_POINT};
use crate::snapshot::football_data::{DEFAULT_BASE_URL, DEFAULT_CACHE_TTL};
use crate::types::TeamAssignment;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub league: LeagueConfig,
    pub provider: ProviderConfig,
    /// Exactly three parties, one team each.
    pub wager: Vec<WagerConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LeagueConfig {
    #[serde(default = "default_season_length")]
    pub season_length: i32,
    #[serde(default = "default_stake_per_point")]
    pub stake_per_point: i32,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            season_length: DEFAULT_SEASON_LENGTH,
            stake_per_point: DEFAULT_STAKE_PER_POINT,
        }
    }
}

impl LeagueConfig {
    pub fn rules(&self) -> LeagueRules {
        LeagueRules {
            season_length: self.season_length,
            stake_per_point: self.stake_per_point,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    FootballData,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_competition")]
    pub competition: String,
    pub api_key_env: Option<String>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long fetched feed resources are reused; 0 disables.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WagerConfig {
    pub team: String,
    pub player: String,
}

fn default_season_length() -> i32 {
    DEFAULT_SEASON_LENGTH
}

fn default_stake_per_point() -> i32 {
    DEFAULT_STAKE_PER_POINT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_competition() -> String {
    "PL".to_string()
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.wager.len() != 3 {
            bail!("expected exactly 3 [[wager]] entries, found {}", self.wager.len());
        }

        let mut teams = HashSet::new();
        for w in &self.wager {
            if !teams.insert(w.team.as_str()) {
                bail!("team {} appears in more than one wager entry", w.team);
            }
        }

        if self.league.season_length <= 0 {
            bail!("league.season_length must be positive");
        }
        if self.league.stake_per_point <= 0 {
            bail!("league.stake_per_point must be positive");
        }
        if self.provider.kind == ProviderKind::File && self.provider.snapshot_path.is_none() {
            bail!("provider.snapshot_path is required when provider.kind = \"file\"");
        }
        Ok(())
    }

    /// Each party's assignment; rivals are the other two teams in
    /// configured order.
    pub fn assignments(&self) -> [TeamAssignment; 3] {
        let w = &self.wager;
        let assign = |own: usize, a: usize, b: usize| TeamAssignment {
            team: w[own].team.clone(),
            player: w[own].player.clone(),
            opponents: [w[a].team.clone(), w[b].team.clone()],
        };
        [assign(0, 1, 2), assign(1, 0, 2), assign(2, 0, 1)]
    }

    /// Resolve an environment variable name to its value.
    /// Used for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
