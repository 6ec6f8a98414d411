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

//! Error types for point recording and engagement operations.

use thiserror::Error;

/// Errors surfaced by the points engine and the community layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointsError {
    /// Referenced user profile does not exist
    #[error("user not found")]
    UserNotFound,

    /// Referenced post does not exist
    #[error("post not found")]
    PostNotFound,

    /// Referenced comment does not exist
    #[error("comment not found")]
    CommentNotFound,

    /// Caller does not own the resource being modified
    #[error("not the owner of this resource")]
    NotOwner,

    /// Leaderboard period string is not a known period
    #[error("unknown leaderboard period")]
    InvalidPeriod,
}

#[cfg(test)]
mod tests {
    use super::PointsError;

    #[test]
    fn error_display_messages() {
        assert_eq!(PointsError::UserNotFound.to_string(), "user not found");
        assert_eq!(PointsError::PostNotFound.to_string(), "post not found");
        assert_eq!(
            PointsError::CommentNotFound.to_string(),
            "comment not found"
        );
        assert_eq!(
            PointsError::NotOwner.to_string(),
            "not the owner of this resource"
        );
        assert_eq!(
            PointsError::InvalidPeriod.to_string(),
            "unknown leaderboard period"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = PointsError::UserNotFound;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
