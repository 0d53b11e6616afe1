//! HTTP route handlers.
//!
//! State is shared via `Arc<ServerState>`; nothing in it is mutated after
//! startup, so handlers never lock.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::engine::{compute_settlement, LeagueRules};
use crate::snapshot::SnapshotProvider;
use crate::types::TeamAssignment;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct ServerState {
    pub provider: Arc<dyn SnapshotProvider>,
    pub assignments: [TeamAssignment; 3],
    pub rules: LeagueRules,
}

impl ServerState {
    pub fn new(
        provider: Arc<dyn SnapshotProvider>,
        assignments: [TeamAssignment; 3],
        rules: LeagueRules,
    ) -> Self {
        Self {
            provider,
            assignments,
            rules,
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /football/bet/data/
pub async fn get_bet_data(State(state): State<AppState>) -> Response {
    let no_cache = [(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE))];

    match compute_settlement(Arc::clone(&state.provider), &state.assignments, state.rules).await {
        Ok(entries) => (no_cache, Json(entries)).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to create bet response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                no_cache,
                "Failed to create bet response",
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
