//! Team projection builder.
//!
//! Turns one team's raw table row, the fixtures between its two rivals,
//! and its latest fixture into a `TeamProjection`. A match that is still
//! being played is backed out: its provisional points are removed from
//! `adjusted_points` and it is counted as a remaining fixture.

use tracing::debug;

use super::LeagueRules;
use crate::types::{LeagueEntry, LiveMatch, MatchOutcome, TeamAssignment, TeamProjection};

#[derive(Debug, Clone, Copy)]
pub struct ProjectionBuilder {
    rules: LeagueRules,
}

impl ProjectionBuilder {
    pub fn new(rules: LeagueRules) -> Self {
        Self { rules }
    }

    /// Build the projection in one step; nothing is patched afterwards.
    ///
    /// `head_to_head` are the fixtures between the assignment's two
    /// opponents; only unfinished ones count.
    pub fn build(
        &self,
        assignment: &TeamAssignment,
        entry: &LeagueEntry,
        head_to_head: &[MatchOutcome],
        latest: &MatchOutcome,
    ) -> TeamProjection {
        let played_out = (self.rules.season_length - entry.played_games).max(0);

        let remaining_head_to_head_matches = head_to_head
            .iter()
            .filter(|m| !m.status.has_finished())
            .count() as i32;

        let (adjusted_points, remaining_matches, live_match) = if latest.status.is_live() {
            let provisional = latest.points_for(&assignment.team);
            debug!(
                team = %assignment.team,
                fixture = %latest,
                provisional,
                "Backing out live match"
            );
            (
                entry.points - provisional,
                played_out + 1,
                Some(LiveMatch {
                    home_team: latest.home_team.tla.clone(),
                    away_team: latest.away_team.tla.clone(),
                    home_score: latest.score.full_time.home.unwrap_or(0),
                    away_score: latest.score.full_time.away.unwrap_or(0),
                }),
            )
        } else {
            (entry.points, played_out, None)
        };

        TeamProjection {
            team_name: assignment.team.clone(),
            player_name: assignment.player.clone(),
            current_points: entry.points,
            adjusted_points,
            matches_played: entry.played_games,
            remaining_matches,
            remaining_head_to_head_matches,
            live_match,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
