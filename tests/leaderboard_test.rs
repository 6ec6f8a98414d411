// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fitrank Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Leaderboard ranking and user overview integration tests.

use chrono::{Duration, Utc};
use fitrank::{
    LeaderboardPeriod, PointSource, PointsEngine, PointsError, UserId, LEVEL_THRESHOLDS,
};

fn backdated(engine: &PointsEngine, user: UserId, delta: i64, days_ago: i64) {
    engine
        .record_points_at(
            user,
            delta,
            PointSource::PostLiked,
            Utc::now() - Duration::days(days_ago),
        )
        .unwrap();
}

#[test]
fn ranks_by_windowed_sum_descending() {
    let engine = PointsEngine::new();
    let a = engine.register_user("Ada", "Lovelace", None);
    let b = engine.register_user("Grace", "Hopper", None);
    let c = engine.register_user("Edsger", "Dijkstra", None);

    backdated(&engine, a, 10, 1);
    backdated(&engine, b, 15, 1);
    backdated(&engine, c, 5, 40); // outside the window

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);

    assert_eq!(board.users.len(), 2);
    assert_eq!(board.users[0].user_id, b);
    assert_eq!(board.users[0].rank, 1);
    assert_eq!(board.users[0].period_points, 15);
    assert_eq!(board.users[1].user_id, a);
    assert_eq!(board.users[1].rank, 2);
    assert_eq!(board.users[1].period_points, 10);
}

#[test]
fn out_of_window_entries_still_count_toward_totals() {
    let engine = PointsEngine::new();
    let user = engine.register_user("Ada", "Lovelace", None);

    backdated(&engine, user, 5, 40);
    backdated(&engine, user, 1, 1);

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    assert_eq!(board.users[0].period_points, 1);
    assert_eq!(board.users[0].total_points, 6);
}

#[test]
fn all_time_ignores_the_window() {
    let engine = PointsEngine::new();
    let a = engine.register_user("Ada", "Lovelace", None);
    let b = engine.register_user("Grace", "Hopper", None);

    backdated(&engine, a, 20, 40);
    backdated(&engine, b, 5, 1);

    let board = engine.leaderboard(LeaderboardPeriod::AllTime, 10);
    assert_eq!(board.users[0].user_id, a);
    assert_eq!(board.users[0].period_points, 20);
    assert_eq!(board.users[1].user_id, b);
}

#[test]
fn rank_follows_window_sum_not_cached_total() {
    let engine = PointsEngine::new();
    let veteran = engine.register_user("Ada", "Lovelace", None);
    let newcomer = engine.register_user("Grace", "Hopper", None);

    // Veteran has a large all-time balance but little recent activity.
    backdated(&engine, veteran, 100, 60);
    backdated(&engine, veteran, 1, 1);
    backdated(&engine, newcomer, 10, 1);

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    assert_eq!(board.users[0].user_id, newcomer);
    assert_eq!(board.users[0].total_points, 10);
    assert_eq!(board.users[1].user_id, veteran);
    assert_eq!(board.users[1].total_points, 101);
}

#[test]
fn dropped_profiles_compact_the_ranks() {
    let engine = PointsEngine::new();
    let a = engine.register_user("Ada", "Lovelace", None);
    let b = engine.register_user("Grace", "Hopper", None);
    let c = engine.register_user("Edsger", "Dijkstra", None);

    backdated(&engine, a, 30, 1);
    backdated(&engine, b, 20, 1);
    backdated(&engine, c, 10, 1);

    // The 2nd-ranked user's profile disappears between writes and the read.
    engine.remove_user(b).unwrap();

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    assert_eq!(board.users.len(), 2);
    assert_eq!(board.users[0].user_id, a);
    assert_eq!(board.users[0].rank, 1);
    assert_eq!(board.users[1].user_id, c);
    assert_eq!(board.users[1].rank, 2);
}

#[test]
fn zero_and_negative_window_sums_stay_eligible() {
    let engine = PointsEngine::new();
    let a = engine.register_user("Ada", "Lovelace", None);
    let b = engine.register_user("Grace", "Hopper", None);

    backdated(&engine, a, 1, 1);
    backdated(&engine, a, -1, 1);
    backdated(&engine, b, -3, 1);

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    assert_eq!(board.users.len(), 2);
    assert_eq!(board.users[0].user_id, a);
    assert_eq!(board.users[0].period_points, 0);
    assert_eq!(board.users[1].user_id, b);
    assert_eq!(board.users[1].period_points, -3);
    // The cached total is floor-clamped even though the window sum is not.
    assert_eq!(board.users[1].total_points, 0);
}

#[test]
fn limit_truncates_the_ranking() {
    let engine = PointsEngine::new();
    for i in 1..=5 {
        let user = engine.register_user(format!("User{i}"), "Test", None);
        backdated(&engine, user, i, 1);
    }

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 3);
    assert_eq!(board.users.len(), 3);
    assert_eq!(board.users[0].period_points, 5);
    assert_eq!(board.users[2].period_points, 3);
}

#[test]
fn empty_ledger_yields_empty_board() {
    let engine = PointsEngine::new();
    engine.register_user("Ada", "Lovelace", None);

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    assert!(board.users.is_empty());
    assert_eq!(board.period, LeaderboardPeriod::Last30Days);
}

#[test]
fn board_rows_carry_profile_fields_and_level() {
    let engine = PointsEngine::new();
    let user = engine.register_user("Ada", "Lovelace", Some("http://pic".to_string()));
    backdated(&engine, user, 25, 1);

    let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 10);
    let row = &board.users[0];
    assert_eq!(row.name, "Ada");
    assert_eq!(row.last_name, "Lovelace");
    assert_eq!(row.profile_picture_url.as_deref(), Some("http://pic"));
    assert_eq!(row.level, 3); // 25 points: threshold 20 <= 25 < 70
}

#[test]
fn overview_composes_level_and_progress() {
    let engine = PointsEngine::new();
    let user = engine.register_user("Ada", "Lovelace", None);
    engine.record_points(user, 7, PointSource::PostLiked).unwrap();

    let overview = engine.user_overview(user).unwrap();
    assert_eq!(overview.total_points, 7);
    assert_eq!(overview.level, 2);
    assert_eq!(overview.current_level_min, 5);
    assert_eq!(overview.next_level_min, Some(20));
    assert_eq!(overview.points_to_next_level, Some(13));
    assert_eq!(overview.levels.len(), LEVEL_THRESHOLDS.len());
    assert_eq!(overview.user.name, "Ada");
}

#[test]
fn overview_at_top_level_has_no_next() {
    let engine = PointsEngine::new();
    let user = engine.register_user("Ada", "Lovelace", None);
    engine
        .record_points(user, 60_000, PointSource::PostLiked)
        .unwrap();

    let overview = engine.user_overview(user).unwrap();
    assert_eq!(overview.level, 10);
    assert_eq!(overview.next_level_min, None);
    assert_eq!(overview.points_to_next_level, None);
}

#[test]
fn overview_for_unknown_user_is_not_found() {
    let engine = PointsEngine::new();
    assert_eq!(
        engine.user_overview(UserId(9)).unwrap_err(),
        PointsError::UserNotFound
    );
}

#[test]
fn overview_of_fresh_user_is_level_one() {
    let engine = PointsEngine::new();
    let user = engine.register_user("Ada", "Lovelace", None);

    let overview = engine.user_overview(user).unwrap();
    assert_eq!(overview.level, 1);
    assert_eq!(overview.current_level_min, 0);
    assert_eq!(overview.points_to_next_level, Some(5));
    assert!(overview.levels[0].unlocked);
    assert!(!overview.levels[1].unlocked);
}
