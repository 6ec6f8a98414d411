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

//! Level progression derived from total points.
//!
//! Pure functions over a fixed, process-wide threshold table. No I/O, no
//! per-user state; the table never changes after process start.

use serde::{Deserialize, Serialize};

/// Minimum total points for each level, index 0 = level 1.
///
/// Level 1's floor is zero, so every balance satisfies it.
pub const LEVEL_THRESHOLDS: [i64; 10] = [0, 5, 20, 70, 150, 500, 2000, 8000, 30000, 50000];

/// A user's current level and the thresholds around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// 1-based level number.
    pub level: u32,
    /// Minimum points of the current level.
    pub current_level_min: i64,
    /// Minimum points of the next level, `None` at the top of the table.
    pub next_level_min: Option<i64>,
}

/// One row of the full progression view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStatus {
    pub level: u32,
    pub min_points: i64,
    pub unlocked: bool,
}

/// Maps a total-points value to its level.
///
/// Negative input is clamped to zero first; the balance invariant makes
/// negative totals impossible in steady state, but the function stays total.
pub fn level_of(total_points: i64) -> LevelInfo {
    let points = total_points.max(0);

    let mut level = 1;
    for (index, min) in LEVEL_THRESHOLDS.iter().enumerate().rev() {
        if points >= *min {
            level = index + 1;
            break;
        }
    }

    LevelInfo {
        level: level as u32,
        current_level_min: LEVEL_THRESHOLDS[level - 1],
        next_level_min: LEVEL_THRESHOLDS.get(level).copied(),
    }
}

/// Evaluates every level against a total, in table order.
pub fn levels_overview(total_points: i64) -> Vec<LevelStatus> {
    let points = total_points.max(0);

    LEVEL_THRESHOLDS
        .iter()
        .enumerate()
        .map(|(index, min)| LevelStatus {
            level: (index + 1) as u32,
            min_points: *min,
            unlocked: points >= *min,
        })
        .collect()
}
