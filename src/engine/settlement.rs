//! Settlement calculator.
//!
//! Money moves between players at a fixed stake per league point of
//! difference. Each row also carries the best-case and worst-case swing
//! for the rest of the season:
//!
//! - best case: self wins every remaining fixture; each rival only
//!   picks up a point per remaining fixture between the two rivals and
//!   nothing elsewhere.
//! - worst case: self takes nothing more; each rival wins every remaining
//!   fixture except those between the rivals, which count against self
//!   once via a correction term.

use tracing::debug;

use super::LeagueRules;
use crate::types::{OweDirection, SettlementEntry, TeamProjection};

/// Points for a win.
const WIN_POINTS: i32 = 3;

/// Guaranteed floor per fixture between the two rivals in the best case.
const HEAD_TO_HEAD_FLOOR: i32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct SettlementCalculator {
    rules: LeagueRules,
}

impl SettlementCalculator {
    pub fn new(rules: LeagueRules) -> Self {
        Self { rules }
    }

    /// Signed amount `own` is up on `other` at current points, and which
    /// way it is paid.
    pub fn owed(&self, own: &TeamProjection, other: &TeamProjection) -> (OweDirection, i32) {
        let direction = OweDirection::between(own.current_points, other.current_points);
        let amount = (own.current_points - other.current_points) * self.rules.stake_per_point;
        (direction, amount)
    }

    /// Sum of both signed pairwise differences, staked.
    pub fn net_balance(&self, own: &TeamProjection, a: &TeamProjection, b: &TeamProjection) -> i32 {
        (own.current_points - a.current_points + own.current_points - b.current_points)
            * self.rules.stake_per_point
    }

    fn best_vs(own: &TeamProjection, opponent: &TeamProjection) -> i32 {
        let max_own = own.adjusted_points + own.remaining_matches * WIN_POINTS;
        let min_other =
            opponent.adjusted_points + own.remaining_head_to_head_matches * HEAD_TO_HEAD_FLOOR;
        max_own - min_other
    }

    pub fn best_case(&self, own: &TeamProjection, a: &TeamProjection, b: &TeamProjection) -> i32 {
        (Self::best_vs(own, a) + Self::best_vs(own, b)) * self.rules.stake_per_point
    }

    fn worst_vs(own: &TeamProjection, opponent: &TeamProjection) -> i32 {
        let min_own = own.adjusted_points;
        let max_other = opponent.adjusted_points
            + (opponent.remaining_matches - own.remaining_head_to_head_matches) * WIN_POINTS;
        min_own - max_other
    }

    /// The correction assumes both rivals' remaining fixtures against each
    /// other are exactly `own.remaining_head_to_head_matches`; uneven
    /// schedules over- or under-count.
    pub fn worst_case(&self, own: &TeamProjection, a: &TeamProjection, b: &TeamProjection) -> i32 {
        (Self::worst_vs(own, a) + Self::worst_vs(own, b)
            - own.remaining_head_to_head_matches * WIN_POINTS)
            * self.rules.stake_per_point
    }

    /// One player's row against the other two, `a` first.
    pub fn settle(
        &self,
        own: &TeamProjection,
        a: &TeamProjection,
        b: &TeamProjection,
    ) -> SettlementEntry {
        let (direction_a, amount_a) = self.owed(own, a);
        let (direction_b, amount_b) = self.owed(own, b);
        let live = own.live_match.as_ref();

        SettlementEntry {
            team_name: own.team_name.to_lowercase(),
            player_name: own.player_name.clone(),
            played: own.matches_played,
            points: own.current_points,
            owe_a: direction_a.label(&a.player_name),
            amount_a,
            owe_b: direction_b.label(&b.player_name),
            amount_b,
            best_case: self.best_case(own, a, b),
            worst_case: self.worst_case(own, a, b),
            balance: format!("{}'s Balance", own.player_name),
            balance_amount: self.net_balance(own, a, b),
            live: live.is_some(),
            home_team: live.map(|m| m.home_team.clone()),
            away_team: live.map(|m| m.away_team.clone()),
            home_team_score: live.map(|m| m.home_score),
            away_team_score: live.map(|m| m.away_score),
        }
    }

    /// Settle every player against the other two (in input order), then
    /// rank by points, highest first. Equal points keep input order.
    pub fn settle_all(&self, projections: &[TeamProjection; 3]) -> Vec<SettlementEntry> {
        let [first, second, third] = projections;

        let mut entries = vec![
            self.settle(first, second, third),
            self.settle(second, first, third),
            self.settle(third, first, second),
        ];

        // `sort_by` is stable.
        entries.sort_by(|x, y| y.points.cmp(&x.points));

        debug!(
            leader = %entries[0].player_name,
            points = entries[0].points,
            "Settlement ranked"
        );

        entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
