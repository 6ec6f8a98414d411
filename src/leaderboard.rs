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

//! Leaderboard ranking and the per-user points overview.
//!
//! The ranking runs two sequential reads with no lock held between them: a
//! windowed group-by over the ledger, then a profile join. The result is a
//! point-in-time snapshot, not a linearizable view; a profile changing
//! between the two reads is accepted for display-only data.

use crate::base::UserId;
use crate::engine::PointsEngine;
use crate::error::PointsError;
use crate::level::{level_of, levels_overview, LevelStatus};
use crate::profile::ProfileSnapshot;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the rolling ranking window in days.
pub const WINDOW_DAYS: i64 = 30;

/// Ranking window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaderboardPeriod {
    /// Rolling window over the last 30 days.
    #[default]
    #[serde(rename = "last_30_days")]
    Last30Days,
    /// No time bound.
    #[serde(rename = "all_time")]
    AllTime,
}

impl LeaderboardPeriod {
    /// Start of the window relative to `now`, or `None` when unbounded.
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Last30Days => Some(now - Duration::days(WINDOW_DAYS)),
            Self::AllTime => None,
        }
    }
}

impl fmt::Display for LeaderboardPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Last30Days => "last_30_days",
            Self::AllTime => "all_time",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LeaderboardPeriod {
    type Err = PointsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_30_days" => Ok(Self::Last30Days),
            "all_time" => Ok(Self::AllTime),
            _ => Err(PointsError::InvalidPeriod),
        }
    }
}

/// One row of the ranked leaderboard.
///
/// `total_points` (and the level derived from it) is the all-time cached
/// balance; the rank itself follows `period_points`, so the two may disagree
/// in ordering under a windowed period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedUser {
    /// 1-based position in the ranked output; gap-free even when grouped
    /// users were dropped at the join.
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
    pub level: u32,
    pub total_points: i64,
    /// Sum of ledger deltas within the selected window.
    pub period_points: i64,
}

/// Ranked leaderboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub period: LeaderboardPeriod,
    pub users: Vec<RankedUser>,
}

/// Per-user points overview payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverview {
    pub user: ProfileSnapshot,
    pub total_points: i64,
    pub level: u32,
    pub current_level_min: i64,
    pub next_level_min: Option<i64>,
    pub points_to_next_level: Option<i64>,
    pub levels: Vec<LevelStatus>,
}

impl PointsEngine {
    /// Builds the ranked leaderboard for a period, truncated to `limit`.
    ///
    /// Grouped users whose profile no longer resolves (e.g. deleted
    /// accounts) are silently dropped and later ranks compact; users with
    /// zero or negative windowed sums stay eligible.
    pub fn leaderboard(&self, period: LeaderboardPeriod, limit: usize) -> Leaderboard {
        let since = period.window_start(Utc::now());
        let grouped = self.ledger().sum_by_user(since, limit);

        // Nothing grouped means nothing to join.
        if grouped.is_empty() {
            return Leaderboard {
                period,
                users: Vec::new(),
            };
        }

        let mut users = Vec::with_capacity(grouped.len());
        for (user_id, period_points) in grouped {
            let Some(profile) = self.get_profile(&user_id) else {
                continue;
            };
            let snapshot = profile.snapshot();
            drop(profile);

            let level = level_of(snapshot.total_points).level;
            users.push(RankedUser {
                rank: users.len() + 1,
                user_id: snapshot.user_id,
                name: snapshot.name,
                last_name: snapshot.last_name,
                profile_picture_url: snapshot.profile_picture_url,
                level,
                total_points: snapshot.total_points,
                period_points,
            });
        }

        Leaderboard { period, users }
    }

    /// Composes the points overview for one user from the cached balance.
    ///
    /// Never scans the ledger.
    ///
    /// # Errors
    ///
    /// [`PointsError::UserNotFound`] if no profile exists for `user_id`.
    pub fn user_overview(&self, user_id: UserId) -> Result<UserOverview, PointsError> {
        let profile = self
            .get_profile(&user_id)
            .ok_or(PointsError::UserNotFound)?;
        let snapshot = profile.snapshot();
        drop(profile);

        let total_points = snapshot.total_points;
        let info = level_of(total_points);

        Ok(UserOverview {
            user: snapshot,
            total_points,
            level: info.level,
            current_level_min: info.current_level_min,
            next_level_min: info.next_level_min,
            points_to_next_level: info.next_level_min.map(|next| (next - total_points).max(0)),
            levels: levels_overview(total_points),
        })
    }
}
