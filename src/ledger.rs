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

//! Append-only point ledger.
//!
//! The ledger is the source of truth for windowed aggregation. Appends are
//! concurrent and keyed by a monotonically allocated [`EntryId`]; entries are
//! never mutated or deleted.

use crate::base::{EntryId, UserId};
use crate::entry::{PointEntry, PointSource};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Concurrent append-only log of [`PointEntry`] facts.
///
/// Entries are indexed by id for O(1) access; aggregation walks all entries,
/// which is acceptable because only the leaderboard read path scans the
/// ledger (the balance hot path reads the cached total instead).
#[derive(Debug)]
pub struct PointLedger {
    /// All entries, indexed by entry ID.
    entries: DashMap<EntryId, Arc<PointEntry>>,

    /// Next entry ID to allocate.
    next_id: AtomicU64,
}

impl PointLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Appends a new entry and returns it.
    ///
    /// Callers guarantee `delta != 0`; the engine drops zero deltas before
    /// they reach the ledger.
    pub(crate) fn append(
        &self,
        user_id: UserId,
        delta: i64,
        source: PointSource,
        created_at: DateTime<Utc>,
    ) -> Arc<PointEntry> {
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(PointEntry {
            id,
            user_id,
            delta,
            source,
            created_at,
        });
        self.entries.insert(id, Arc::clone(&entry));
        entry
    }

    /// Number of entries in the ledger.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries for one user, oldest first.
    ///
    /// Audit/test helper; the ranking path uses [`PointLedger::sum_by_user`]
    /// instead.
    pub fn entries_for(&self, user_id: UserId) -> Vec<Arc<PointEntry>> {
        let mut entries: Vec<Arc<PointEntry>> = self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| Arc::clone(e.value()))
            .collect();
        entries.sort_unstable_by_key(|e| e.id.0);
        entries
    }

    /// Groups entries by user, summing deltas, optionally bounded to entries
    /// at or after `since`.
    ///
    /// The result is ordered descending by sum (ascending user id on ties so
    /// output is deterministic) and truncated to `limit`. Users with zero or
    /// negative sums within the window are kept; the floor clamp applies only
    /// to the cached balance, never to window sums.
    pub fn sum_by_user(&self, since: Option<DateTime<Utc>>, limit: usize) -> Vec<(UserId, i64)> {
        let mut sums: HashMap<UserId, i64> = HashMap::new();
        for entry in self.entries.iter() {
            if let Some(cutoff) = since {
                if entry.created_at < cutoff {
                    continue;
                }
            }
            *sums.entry(entry.user_id).or_insert(0) += entry.delta;
        }

        let mut grouped: Vec<(UserId, i64)> = sums.into_iter().collect();
        grouped.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        grouped.truncate(limit);
        grouped
    }
}

impl Default for PointLedger {
    fn default() -> Self {
        Self::new()
    }
}
