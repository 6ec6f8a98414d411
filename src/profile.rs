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

//! User profiles and the cached point balance.
//!
//! Each [`Profile`] embeds `total_points`, the denormalized cache of the
//! ledger sum for that user. The cache is updated in lockstep with every
//! ledger append and clamped at zero; it is the only field read on the hot
//! path (overview display, ranking join).

use crate::base::UserId;
use parking_lot::{Mutex, MutexGuard};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;

#[derive(Debug)]
pub(crate) struct ProfileData {
    pub(crate) user_id: UserId,
    pub(crate) name: String,
    pub(crate) last_name: String,
    pub(crate) profile_picture_url: Option<String>,
    pub(crate) total_points: i64,
}

impl ProfileData {
    fn assert_invariants(&self) {
        debug_assert!(
            self.total_points >= 0,
            "Invariant violated: cached balance went negative: {}",
            self.total_points
        );
    }

    /// Adds `delta` to the cached balance, clamping a negative result to
    /// zero within the same update.
    ///
    /// Returns `true` when the clamp fired, so the caller can log the lossy
    /// event. The ledger history is never rewritten to match.
    pub(crate) fn apply_delta(&mut self, delta: i64) -> bool {
        self.total_points += delta;
        let clamped = self.total_points < 0;
        if clamped {
            self.total_points = 0;
        }
        self.assert_invariants();
        clamped
    }
}

/// A user profile with its cached point balance.
#[derive(Debug)]
pub struct Profile {
    inner: Mutex<ProfileData>,
}

impl Profile {
    pub(crate) fn new(
        user_id: UserId,
        name: String,
        last_name: String,
        profile_picture_url: Option<String>,
    ) -> Self {
        Self {
            inner: Mutex::new(ProfileData {
                user_id,
                name,
                last_name,
                profile_picture_url,
                total_points: 0,
            }),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.inner.lock().user_id
    }

    /// Current cached balance.
    pub fn total_points(&self) -> i64 {
        self.inner.lock().total_points
    }

    /// Consistent copy of the profile row.
    pub fn snapshot(&self) -> ProfileSnapshot {
        let data = self.inner.lock();
        ProfileSnapshot {
            user_id: data.user_id,
            name: data.name.clone(),
            last_name: data.last_name.clone(),
            profile_picture_url: data.profile_picture_url.clone(),
            total_points: data.total_points,
        }
    }

    /// Exclusive access for the engine's record path.
    ///
    /// The ledger append and the balance mutation both happen under this
    /// guard, which is what serializes same-user writes.
    pub(crate) fn balance(&self) -> MutexGuard<'_, ProfileData> {
        self.inner.lock()
    }
}

impl Serialize for Profile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Profile", 5)?;
        state.serialize_field("user_id", &data.user_id)?;
        state.serialize_field("name", &data.name)?;
        state.serialize_field("last_name", &data.last_name)?;
        state.serialize_field("profile_picture_url", &data.profile_picture_url)?;
        state.serialize_field("total_points", &data.total_points)?;
        state.end()
    }
}

/// Plain copy of a profile row, detached from its lock.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: UserId,
    pub name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
    pub total_points: i64,
}
