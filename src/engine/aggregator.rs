//! Projection aggregator.
//!
//! Fans out one task per tracked team; each team task spawns its three
//! reads (table row, rival head-to-head fixtures, latest fixture) as tasks
//! of their own and builds the team's projection. The first failure
//! anywhere becomes the aggregate result. Sibling tasks at either level
//! are detached, not aborted: they run to completion and their results
//! are dropped.

use futures::future::try_join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::projection::ProjectionBuilder;
use crate::snapshot::SnapshotProvider;
use crate::types::{FetchKind, SettlementError, SnapshotError, TeamAssignment, TeamProjection};

fn fetch_error(kind: FetchKind, team: &str) -> impl FnOnce(SnapshotError) -> SettlementError {
    let team = team.to_string();
    move |source| SettlementError::Fetch { kind, team, source }
}

/// Await a spawned task. Dropping the handle instead detaches the task.
async fn joined<T>(handle: JoinHandle<Result<T, SettlementError>>) -> Result<T, SettlementError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => Err(SettlementError::TaskFailed(e.to_string())),
    }
}

/// Fetch one team's data and build its projection.
pub async fn project_team(
    provider: Arc<dyn SnapshotProvider>,
    assignment: &TeamAssignment,
    builder: ProjectionBuilder,
) -> Result<TeamProjection, SettlementError> {
    let team = assignment.team.clone();
    let [rival_a, rival_b] = assignment.opponents.clone();

    let entry = tokio::spawn({
        let provider = Arc::clone(&provider);
        let team = team.clone();
        async move {
            provider
                .league_entry(&team)
                .await
                .map_err(fetch_error(FetchKind::LeagueEntry, &team))
        }
    });
    let head_to_head = tokio::spawn({
        let provider = Arc::clone(&provider);
        async move {
            provider
                .head_to_head_matches(&rival_a, &rival_b)
                .await
                .map_err(fetch_error(FetchKind::HeadToHead, &format!("{rival_a} v {rival_b}")))
        }
    });
    let latest = tokio::spawn({
        let provider = Arc::clone(&provider);
        let team = team.clone();
        async move {
            provider
                .latest_match(&team)
                .await
                .map_err(fetch_error(FetchKind::LatestMatch, &team))
        }
    });

    let (entry, head_to_head, latest) =
        tokio::try_join!(joined(entry), joined(head_to_head), joined(latest))?;

    let projection = builder.build(assignment, &entry, &head_to_head, &latest);
    debug!(
        team = %team,
        points = projection.current_points,
        adjusted = projection.adjusted_points,
        remaining = projection.remaining_matches,
        head_to_head = projection.remaining_head_to_head_matches,
        live = projection.is_live(),
        "Team projected"
    );
    Ok(projection)
}

/// Project all three teams concurrently, in the order given.
pub async fn aggregate(
    provider: Arc<dyn SnapshotProvider>,
    assignments: &[TeamAssignment; 3],
    builder: ProjectionBuilder,
) -> Result<[TeamProjection; 3], SettlementError> {
    let handles: Vec<_> = assignments
        .iter()
        .cloned()
        .map(|assignment| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { project_team(provider, &assignment, builder).await })
        })
        .collect();

    let projections = try_join_all(handles.into_iter().map(joined)).await?;

    projections.try_into().map_err(|v: Vec<TeamProjection>| {
        SettlementError::TaskFailed(format!("expected 3 projections, got {}", v.len()))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
