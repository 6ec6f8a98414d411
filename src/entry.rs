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

//! Point sources and ledger entries.
//!
//! A [`PointEntry`] is an immutable fact: once appended to the ledger it is
//! never mutated or deleted. The [`PointSource`] enumeration is closed; every
//! point-changing event in the system maps to exactly one source.

use crate::base::{EntryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cause of a point change.
///
/// Each source carries a base weight of one point; callers negate the weight
/// to reverse an award (e.g. when a like is withdrawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    /// Someone commented on the user's post.
    CommentOnPost,
    /// Someone liked the user's comment.
    CommentLiked,
    /// Someone liked the user's post.
    PostLiked,
    /// Someone replied to the user's comment.
    CommentReply,
}

impl PointSource {
    /// Base weight of this source in points.
    pub fn weight(self) -> i64 {
        match self {
            Self::CommentOnPost => 1,
            Self::CommentLiked => 1,
            Self::PostLiked => 1,
            Self::CommentReply => 1,
        }
    }
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CommentOnPost => "comment_on_post",
            Self::CommentLiked => "comment_liked",
            Self::PostLiked => "post_liked",
            Self::CommentReply => "comment_reply",
        };
        write!(f, "{name}")
    }
}

/// An immutable point-change fact in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointEntry {
    pub id: EntryId,
    pub user_id: UserId,
    /// Signed point delta; never zero (zero-delta writes are dropped before
    /// the ledger).
    pub delta: i64,
    pub source: PointSource,
    pub created_at: DateTime<Utc>,
}
