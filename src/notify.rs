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

//! Per-user notification inboxes.
//!
//! Notifications are a read-only collaborator from the point-accounting
//! perspective: they are created as a side effect of engagement events and
//! never participate in, or block, the balance transaction.

use crate::base::{CommentId, PostId, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened to the recipient's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CommentOnPost,
    CommentReply,
    PostLiked,
    CommentLiked,
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub recipient: UserId,
    pub actor: UserId,
    pub kind: NotificationKind,
    pub post_id: PostId,
    pub comment_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// A notification before delivery assigns it an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient: UserId,
    pub actor: UserId,
    pub kind: NotificationKind,
    pub post_id: PostId,
    pub comment_id: Option<CommentId>,
}

/// In-memory notification inboxes, one per user.
pub struct NotificationStore {
    inboxes: DashMap<UserId, Mutex<Vec<Notification>>>,
    next_id: AtomicU64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            inboxes: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers a draft into the recipient's inbox.
    pub fn push(&self, draft: NotificationDraft) {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            recipient: draft.recipient,
            actor: draft.actor,
            kind: draft.kind,
            post_id: draft.post_id,
            comment_id: draft.comment_id,
            created_at: Utc::now(),
            read: false,
        };

        self.inboxes
            .entry(draft.recipient)
            .or_default()
            .lock()
            .push(notification);
    }

    /// The user's notifications, newest first.
    pub fn for_user(&self, user_id: UserId) -> Vec<Notification> {
        let Some(inbox) = self.inboxes.get(&user_id) else {
            return Vec::new();
        };
        let mut notifications = inbox.lock().clone();
        notifications.reverse();
        notifications
    }

    /// Count of unread notifications for the user.
    pub fn unread_count(&self, user_id: UserId) -> usize {
        self.inboxes
            .get(&user_id)
            .map(|inbox| inbox.lock().iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Marks every notification in the user's inbox as read.
    pub fn mark_all_read(&self, user_id: UserId) {
        if let Some(inbox) = self.inboxes.get(&user_id) {
            for notification in inbox.lock().iter_mut() {
                notification.read = true;
            }
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(recipient: u64, actor: u64) -> NotificationDraft {
        NotificationDraft {
            recipient: UserId(recipient),
            actor: UserId(actor),
            kind: NotificationKind::PostLiked,
            post_id: PostId(1),
            comment_id: None,
        }
    }

    #[test]
    fn push_delivers_unread() {
        let store = NotificationStore::new();
        store.push(draft(1, 2));

        assert_eq!(store.unread_count(UserId(1)), 1);
        let notifications = store.for_user(UserId(1));
        assert_eq!(notifications.len(), 1);
        assert!(!notifications[0].read);
        assert_eq!(notifications[0].actor, UserId(2));
    }

    #[test]
    fn for_user_returns_newest_first() {
        let store = NotificationStore::new();
        store.push(draft(1, 2));
        store.push(draft(1, 3));

        let notifications = store.for_user(UserId(1));
        assert_eq!(notifications[0].actor, UserId(3));
        assert_eq!(notifications[1].actor, UserId(2));
    }

    #[test]
    fn mark_all_read_clears_unread_count() {
        let store = NotificationStore::new();
        store.push(draft(1, 2));
        store.push(draft(1, 3));

        store.mark_all_read(UserId(1));
        assert_eq!(store.unread_count(UserId(1)), 0);
        assert!(store.for_user(UserId(1)).iter().all(|n| n.read));
    }

    #[test]
    fn empty_inbox_reads_as_empty() {
        let store = NotificationStore::new();
        assert!(store.for_user(UserId(9)).is_empty());
        assert_eq!(store.unread_count(UserId(9)), 0);
    }
}
