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

//! Points engine.
//!
//! The [`PointsEngine`] owns the profile registry and the point ledger and
//! performs the atomic record unit: append a ledger entry, add the delta to
//! the user's cached balance, clamp a negative result to zero.
//!
//! # Thread Safety
//!
//! Profiles live in a [`DashMap`]; each profile guards its balance with a
//! mutex. The ledger append happens inside that critical section, so the
//! ledger and the cached balance move in lockstep per user while writes for
//! different users never contend.

use crate::base::UserId;
use crate::entry::PointSource;
use crate::error::PointsError;
use crate::ledger::PointLedger;
use crate::profile::Profile;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Central engine managing profiles and the point ledger.
///
/// # Invariants
///
/// - `total_points` equals the clamp-fold of all committed deltas for that
///   user (each write clamps a negative intermediate to zero).
/// - A ledger entry exists if and only if its balance delta was applied.
/// - Ledger entries are never rewritten, even when a clamp fires.
pub struct PointsEngine {
    /// User profiles indexed by user ID.
    profiles: DashMap<UserId, Profile>,
    /// Append-only ledger of point deltas.
    ledger: PointLedger,
    /// Next user ID to allocate.
    next_user_id: AtomicU64,
}

impl PointsEngine {
    /// Creates a new engine with no profiles or ledger entries.
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
            ledger: PointLedger::new(),
            next_user_id: AtomicU64::new(1),
        }
    }

    /// Registers a new profile with a zero balance and returns its id.
    pub fn register_user(
        &self,
        name: impl Into<String>,
        last_name: impl Into<String>,
        profile_picture_url: Option<String>,
    ) -> UserId {
        let user_id = UserId(self.next_user_id.fetch_add(1, Ordering::Relaxed));
        self.profiles.insert(
            user_id,
            Profile::new(user_id, name.into(), last_name.into(), profile_picture_url),
        );
        user_id
    }

    /// Removes a profile.
    ///
    /// Ledger entries for the user are kept; the leaderboard join drops
    /// users it can no longer resolve.
    pub fn remove_user(&self, user_id: UserId) -> Result<(), PointsError> {
        self.profiles
            .remove(&user_id)
            .map(|_| ())
            .ok_or(PointsError::UserNotFound)
    }

    /// Retrieves a profile by user ID.
    pub fn get_profile(
        &self,
        user_id: &UserId,
    ) -> Option<dashmap::mapref::one::Ref<'_, UserId, Profile>> {
        self.profiles.get(user_id)
    }

    /// Returns an iterator over all profiles.
    pub fn profiles(
        &self,
    ) -> impl Iterator<Item = dashmap::mapref::multiple::RefMulti<'_, UserId, Profile>> {
        self.profiles.iter()
    }

    /// Records a point delta for a user, timestamped now.
    ///
    /// See [`PointsEngine::record_points_at`] for the semantics.
    pub fn record_points(
        &self,
        user_id: UserId,
        delta: i64,
        source: PointSource,
    ) -> Result<(), PointsError> {
        self.record_points_at(user_id, delta, source, Utc::now())
    }

    /// Records a point delta with an explicit timestamp.
    ///
    /// This is the backfill/import path; replay tooling uses it to carry
    /// original event times into the windowed ranking.
    ///
    /// A zero delta is a no-op: no entry is created and the balance is
    /// untouched, before the user is even looked up. Otherwise, as a single
    /// atomic unit under the profile's lock: a [`crate::PointEntry`] is
    /// appended, the cached balance is incremented by `delta`, and a
    /// negative result is clamped to zero. Clamp events are logged; the
    /// ledger is not rewritten to match, so a floored balance can exceed
    /// the raw sum of its entries.
    ///
    /// # Errors
    ///
    /// [`PointsError::UserNotFound`] if no profile exists for `user_id`;
    /// nothing is written in that case.
    pub fn record_points_at(
        &self,
        user_id: UserId,
        delta: i64,
        source: PointSource,
        created_at: DateTime<Utc>,
    ) -> Result<(), PointsError> {
        if delta == 0 {
            return Ok(());
        }

        let profile = self
            .profiles
            .get(&user_id)
            .ok_or(PointsError::UserNotFound)?;

        // Single atomic unit: the append and the balance mutation happen
        // under the same guard, and concurrent writes for this user
        // serialize here.
        let mut balance = profile.balance();
        let entry = self.ledger.append(user_id, delta, source, created_at);
        let clamped = balance.apply_delta(delta);
        if clamped {
            warn!(
                user = %user_id,
                entry = %entry.id,
                delta,
                source = %source,
                "balance clamped to zero"
            );
        }

        Ok(())
    }

    /// The append-only ledger.
    pub fn ledger(&self) -> &PointLedger {
        &self.ledger
    }
}

impl Default for PointsEngine {
    fn default() -> Self {
        Self::new()
    }
}
