//! Core engine: fetch → project → settle.

pub mod aggregator;
pub mod projection;
pub mod settlement;

use std::sync::Arc;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::snapshot::SnapshotProvider;
use crate::types::{SettlementError, SettlementEntry, TeamAssignment};

use self::projection::ProjectionBuilder;
use self::settlement::SettlementCalculator;

/// Fixtures per team in a 20-team double round-robin.
pub const DEFAULT_SEASON_LENGTH: i32 = 38;

/// Money per league point of difference.
pub const DEFAULT_STAKE_PER_POINT: i32 = 5;

/// League constants injected into the builder and calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueRules {
    pub season_length: i32,
    pub stake_per_point: i32,
}

impl Default for LeagueRules {
    fn default() -> Self {
        Self {
            season_length: DEFAULT_SEASON_LENGTH,
            stake_per_point: DEFAULT_STAKE_PER_POINT,
        }
    }
}

/// Compute the ranked settlement for the three wager parties.
///
/// Either every row is produced or the first fetch error is returned.
pub async fn compute_settlement(
    provider: Arc<dyn SnapshotProvider>,
    assignments: &[TeamAssignment; 3],
    rules: LeagueRules,
) -> Result<Vec<SettlementEntry>, SettlementError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("settlement", %request_id);

    async move {
        let projections =
            aggregator::aggregate(provider, assignments, ProjectionBuilder::new(rules)).await?;
        let entries = SettlementCalculator::new(rules).settle_all(&projections);

        info!(
            rows = entries.len(),
            live = entries.iter().filter(|e| e.live).count(),
            "Settlement computed"
        );
        Ok(entries)
    }
    .instrument(span)
    .await
}
