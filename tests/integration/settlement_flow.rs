//! End-to-end settlement runs against the in-memory snapshot.
//!
//! Covers: ranking, pairwise amounts, live-match back-out, season end,
//! fetch failures and repeatability.

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use bet_standings::engine::{compute_settlement, LeagueRules};
use bet_standings::snapshot::SnapshotProvider;
use bet_standings::types::*;

use crate::mock_snapshot::{assignments, MockSnapshot};

/// Mid-season table: 40 / 38 / 35 after 28 games, one fixture left
/// between every pair of tracked teams, nobody playing right now.
fn mid_season() -> MockSnapshot {
    MockSnapshot::new()
        .with_entry("Liverpool", 40, 28)
        .with_entry("Chelsea", 38, 28)
        .with_entry("Tottenham", 35, 28)
        .with_match("Liverpool", "Chelsea", MatchStatus::Finished, Some((2, 2)), 90)
        .with_match("Liverpool", "Everton", MatchStatus::Finished, Some((1, 0)), 3)
        .with_match("Everton", "Chelsea", MatchStatus::Finished, Some((0, 2)), 3)
        .with_match("Tottenham", "Arsenal", MatchStatus::Finished, Some((1, 1)), 4)
        .with_match("Chelsea", "Tottenham", MatchStatus::Timed, None, -7)
        .with_match("Tottenham", "Liverpool", MatchStatus::Timed, None, -14)
        .with_match("Chelsea", "Liverpool", MatchStatus::Scheduled, None, -21)
}

async fn settle(mock: &Arc<MockSnapshot>) -> Result<Vec<SettlementEntry>, SettlementError> {
    let provider: Arc<dyn SnapshotProvider> = mock.clone();
    compute_settlement(provider, &assignments(), LeagueRules::default()).await
}

fn row<'a>(entries: &'a [SettlementEntry], player: &str) -> &'a SettlementEntry {
    entries
        .iter()
        .find(|e| e.player_name == player)
        .unwrap_or_else(|| panic!("no row for {player}"))
}

#[tokio::test]
async fn test_rows_ranked_by_points() {
    let mock = Arc::new(mid_season());
    let entries = assert_ok!(settle(&mock).await);

    let players: Vec<_> = entries.iter().map(|e| e.player_name.as_str()).collect();
    assert_eq!(players, ["Steve", "Tim", "Thommo"]);
    assert_eq!(entries[0].team_name, "liverpool");
    assert_eq!(entries[0].played, 28);
    assert!(entries.iter().all(|e| !e.live));
}

#[tokio::test]
async fn test_pairwise_amounts_and_labels() {
    let mock = Arc::new(mid_season());
    let entries = assert_ok!(settle(&mock).await);

    let steve = row(&entries, "Steve");
    assert_eq!(steve.owe_a, "From Tim");
    assert_eq!(steve.amount_a, 10);
    assert_eq!(steve.owe_b, "From Thommo");
    assert_eq!(steve.amount_b, 25);
    assert_eq!(steve.balance, "Steve's Balance");
    assert_eq!(steve.balance_amount, 35);

    let tim = row(&entries, "Tim");
    assert_eq!(tim.owe_a, "To Steve");
    assert_eq!(tim.amount_a, -10);
    assert_eq!(tim.owe_b, "From Thommo");
    assert_eq!(tim.amount_b, 15);

    let thommo = row(&entries, "Thommo");
    assert_eq!(thommo.owe_a, "To Steve");
    assert_eq!(thommo.owe_b, "To Tim");
    assert_eq!(thommo.balance_amount, -40);
}

#[tokio::test]
async fn test_money_is_zero_sum() {
    let mock = Arc::new(mid_season());
    let entries = assert_ok!(settle(&mock).await);

    assert_eq!(entries.iter().map(|e| e.balance_amount).sum::<i32>(), 0);

    let steve = row(&entries, "Steve");
    let tim = row(&entries, "Tim");
    let thommo = row(&entries, "Thommo");
    assert_eq!(steve.amount_a, -tim.amount_a);
    assert_eq!(steve.amount_b, -thommo.amount_a);
    assert_eq!(tim.amount_b, -thommo.amount_b);
}

#[tokio::test]
async fn test_best_and_worst_case_mid_season() {
    let mock = Arc::new(mid_season());
    let entries = assert_ok!(settle(&mock).await);
    let steve = row(&entries, "Steve");

    // 10 left, one fixture left between Chelsea and Tottenham.
    // best:  (70 - 39) + (70 - 36)
    // worst: (40 - 65) + (40 - 62) - 3
    assert_eq!(steve.best_case, 65 * 5);
    assert_eq!(steve.worst_case, -50 * 5);

    for e in &entries {
        assert!(e.worst_case <= e.balance_amount, "{}: worst above balance", e.player_name);
        assert!(e.balance_amount <= e.best_case, "{}: best below balance", e.player_name);
    }
}

#[tokio::test]
async fn test_live_match_is_backed_out() {
    let mock = Arc::new(
        MockSnapshot::new()
            .with_entry("Liverpool", 40, 28)
            .with_entry("Chelsea", 38, 28)
            // Includes the point from the draw in progress.
            .with_entry("Tottenham", 30, 29)
            .with_match("Liverpool", "Everton", MatchStatus::Finished, Some((1, 0)), 3)
            .with_match("Everton", "Chelsea", MatchStatus::Finished, Some((0, 2)), 3)
            .with_match("Tottenham", "Arsenal", MatchStatus::InPlay, Some((1, 1)), 0),
    );
    let entries = assert_ok!(settle(&mock).await);

    let thommo = row(&entries, "Thommo");
    assert!(thommo.live);
    assert_eq!(thommo.points, 30);
    assert_eq!(thommo.played, 29);
    assert_eq!(thommo.home_team.as_deref(), Some("TOT"));
    assert_eq!(thommo.away_team.as_deref(), Some("ARS"));
    assert_eq!(thommo.home_team_score, Some(1));
    assert_eq!(thommo.away_team_score, Some(1));

    // Adjusted 29 with 10 to play; no rival fixtures left.
    // best: (29 + 30 - 40) + (29 + 30 - 38)
    assert_eq!(thommo.best_case, (19 + 21) * 5);
    // Owed amounts stay on current points.
    assert_eq!(thommo.amount_a, (30 - 40) * 5);

    let steve = row(&entries, "Steve");
    assert!(!steve.live);
    assert!(steve.home_team.is_none());
    assert!(steve.away_team_score.is_none());
}

#[tokio::test]
async fn test_season_over_cases_collapse_to_balance() {
    let mock = Arc::new(
        MockSnapshot::new()
            .with_entry("Liverpool", 80, 38)
            .with_entry("Chelsea", 72, 38)
            .with_entry("Tottenham", 75, 38)
            .with_match("Chelsea", "Tottenham", MatchStatus::Finished, Some((0, 1)), 10)
            .with_match("Tottenham", "Liverpool", MatchStatus::Finished, Some((2, 2)), 20)
            .with_match("Liverpool", "Chelsea", MatchStatus::Finished, Some((3, 0)), 30)
            .with_match("Liverpool", "Everton", MatchStatus::Finished, Some((1, 0)), 1)
            .with_match("Chelsea", "Arsenal", MatchStatus::Finished, Some((1, 0)), 1)
            .with_match("Everton", "Tottenham", MatchStatus::Finished, Some((1, 0)), 1),
    );
    let entries = assert_ok!(settle(&mock).await);

    let players: Vec<_> = entries.iter().map(|e| e.player_name.as_str()).collect();
    assert_eq!(players, ["Steve", "Thommo", "Tim"]);
    for e in &entries {
        assert_eq!(e.best_case, e.balance_amount, "{}", e.player_name);
        assert_eq!(e.worst_case, e.balance_amount, "{}", e.player_name);
    }
}

#[tokio::test]
async fn test_level_points_keep_configured_order() {
    let mock = Arc::new(
        MockSnapshot::new()
            .with_entry("Tottenham", 40, 28)
            .with_entry("Chelsea", 40, 28)
            .with_entry("Liverpool", 40, 28)
            .with_match("Liverpool", "Everton", MatchStatus::Finished, Some((1, 0)), 3)
            .with_match("Everton", "Chelsea", MatchStatus::Finished, Some((0, 2)), 3)
            .with_match("Tottenham", "Arsenal", MatchStatus::Finished, Some((1, 1)), 4),
    );
    let entries = assert_ok!(settle(&mock).await);

    let players: Vec<_> = entries.iter().map(|e| e.player_name.as_str()).collect();
    assert_eq!(players, ["Steve", "Tim", "Thommo"]);
    // Ties collect rather than pay.
    assert!(entries.iter().all(|e| e.owe_a.starts_with("From") && e.amount_a == 0));
}

#[tokio::test]
async fn test_missing_latest_match_fails_request() {
    let mock = Arc::new(mid_season());
    mock.fail_latest_match("Chelsea");

    let err = assert_err!(settle(&mock).await);
    match err {
        SettlementError::Fetch { kind, team, source } => {
            assert_eq!(kind, FetchKind::LatestMatch);
            assert_eq!(team, "Chelsea");
            assert!(matches!(source, SnapshotError::RecordNotFound { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_upstream_outage_is_reported() {
    let mock = Arc::new(mid_season());
    mock.fail_league_entry("Tottenham", "connection refused");

    let err = assert_err!(settle(&mock).await);
    let msg = err.to_string();
    assert!(msg.contains("Tottenham"));
    assert!(msg.contains("connection refused"));
}

#[tokio::test]
async fn test_team_missing_from_table() {
    let mock = Arc::new(
        MockSnapshot::new()
            .with_entry("Liverpool", 40, 28)
            .with_entry("Chelsea", 38, 28)
            .with_match("Liverpool", "Everton", MatchStatus::Finished, Some((1, 0)), 3)
            .with_match("Everton", "Chelsea", MatchStatus::Finished, Some((0, 2)), 3)
            .with_match("Tottenham", "Arsenal", MatchStatus::Finished, Some((1, 1)), 4),
    );
    let err = assert_err!(settle(&mock).await);
    assert!(matches!(
        err,
        SettlementError::Fetch { kind: FetchKind::LeagueEntry, .. }
    ));
}

#[tokio::test]
async fn test_nine_reads_per_request() {
    let mock = Arc::new(mid_season());
    assert_ok!(settle(&mock).await);
    assert_eq!(mock.call_count(), 9);
}

#[tokio::test]
async fn test_repeat_requests_are_identical() {
    let mock = Arc::new(mid_season());
    let first = assert_ok!(settle(&mock).await);
    let second = assert_ok!(settle(&mock).await);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_wire_field_names() {
    let mock = Arc::new(mid_season());
    let entries = assert_ok!(settle(&mock).await);
    let json = serde_json::to_value(&entries).unwrap();

    let first = &json[0];
    for key in [
        "team_name", "name", "played", "points", "owea", "amounta", "oweb", "amountb",
        "best_case", "worst_case", "balance", "balance_amount", "live", "home_team",
        "away_team", "home_team_score", "away_team_score",
    ] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
    assert!(first["home_team"].is_null());
}

/// The worst case charges the rivals' mutual fixtures once through the
/// correction term, assuming both rivals have that many left. Pinned
/// here so any change to the approximation is deliberate.
#[tokio::test]
async fn test_worst_case_correction_with_two_rival_fixtures_left() {
    let mock = Arc::new(
        mid_season().with_match("Tottenham", "Chelsea", MatchStatus::Postponed, None, 30),
    );
    let entries = assert_ok!(settle(&mock).await);
    let steve = row(&entries, "Steve");

    // (40 - (38 + 8*3)) + (40 - (35 + 8*3)) - 2*3
    assert_eq!(steve.worst_case, (-22 - 19 - 6) * 5);
    // (70 - 40) + (70 - 37)
    assert_eq!(steve.best_case, (30 + 33) * 5);
}
