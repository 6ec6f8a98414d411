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

//! # Fitrank
//!
//! This library provides the points and leaderboard engine of a social
//! fitness community: users post, comment, like, and reply; qualifying
//! actions append to a point ledger whose running total feeds a level
//! progression and two ranked leaderboards (rolling 30 days and all time).
//!
//! ## Core Components
//!
//! - [`PointsEngine`]: profile registry plus the atomic ledger/balance
//!   record path
//! - [`PointLedger`]: append-only log of point deltas
//! - [`level_of`] / [`levels_overview`]: pure level progression over the
//!   fixed threshold table
//! - [`Community`]: engagement operations that emit point awards and
//!   notifications as independent side effects
//!
//! ## Example
//!
//! ```
//! use fitrank::{LeaderboardPeriod, PointSource, PointsEngine};
//!
//! let engine = PointsEngine::new();
//! let ada = engine.register_user("Ada", "Lovelace", None);
//!
//! // Someone liked Ada's post.
//! engine.record_points(ada, 1, PointSource::PostLiked).unwrap();
//!
//! let board = engine.leaderboard(LeaderboardPeriod::Last30Days, 20);
//! assert_eq!(board.users[0].user_id, ada);
//! assert_eq!(board.users[0].period_points, 1);
//! ```
//!
//! ## Thread Safety
//!
//! Writes for the same user serialize at that user's profile lock, with the
//! ledger append inside the critical section so ledger and cached balance
//! move in lockstep. Writes for different users never contend. Leaderboard
//! reads are point-in-time snapshots taken without locks across steps.

pub mod community;
mod base;
mod effects;
mod engine;
pub mod error;
mod entry;
mod leaderboard;
mod ledger;
pub mod level;
mod notify;
mod profile;

pub use base::{CommentId, EntryId, PostId, UserId};
pub use community::{CommentView, Community, LikeToggle, PostView};
pub use effects::{Effect, EffectBus};
pub use engine::PointsEngine;
pub use entry::{PointEntry, PointSource};
pub use error::PointsError;
pub use leaderboard::{Leaderboard, LeaderboardPeriod, RankedUser, UserOverview, WINDOW_DAYS};
pub use ledger::PointLedger;
pub use level::{level_of, levels_overview, LevelInfo, LevelStatus, LEVEL_THRESHOLDS};
pub use notify::{Notification, NotificationDraft, NotificationKind, NotificationStore};
pub use profile::{Profile, ProfileSnapshot};
