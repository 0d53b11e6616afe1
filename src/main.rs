//! Bet standings server.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the snapshot provider, and serves the settlement over HTTP
//! until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use bet_standings::config;
use bet_standings::server::{self, ServerState};
use bet_standings::snapshot;

/// Overrides the config file location.
const CONFIG_PATH_ENV: &str = "BET_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    let rules = cfg.league.rules();
    let assignments = cfg.assignments();
    info!(
        config = %config_path,
        provider = ?cfg.provider.kind,
        season_length = rules.season_length,
        stake_per_point = rules.stake_per_point,
        teams = ?assignments.iter().map(|a| a.team.as_str()).collect::<Vec<_>>(),
        "Bet standings starting up"
    );

    let provider = snapshot::from_config(&cfg.provider)?;
    let state = Arc::new(ServerState::new(provider, assignments, rules));

    server::serve(state, cfg.server.port).await
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bet_standings=info"));

    let json_logging = std::env::var("BET_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
