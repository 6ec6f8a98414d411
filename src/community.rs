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

//! Community engagement: posts, comments, replies, and likes.
//!
//! These operations are the only callers of the point ledger. Every
//! qualifying action queues a point award and a notification as two
//! independent effects on the [`EffectBus`]; the primary operation succeeds
//! regardless of what happens to either effect.
//!
//! Acting on your own content toggles likes and creates comments as usual
//! but awards no points and notifies nobody.

use crate::base::{CommentId, PostId, UserId};
use crate::effects::{Effect, EffectBus};
use crate::engine::PointsEngine;
use crate::entry::PointSource;
use crate::error::PointsError;
use crate::notify::{NotificationDraft, NotificationKind, NotificationStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Post {
    id: PostId,
    author_id: UserId,
    content: String,
    created_at: DateTime<Utc>,
    likes: HashSet<UserId>,
}

#[derive(Debug)]
struct Comment {
    id: CommentId,
    post_id: PostId,
    author_id: UserId,
    parent: Option<CommentId>,
    content: String,
    created_at: DateTime<Utc>,
    likes: HashSet<UserId>,
}

/// Read model of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: usize,
}

/// Read model of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub parent: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: usize,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    /// `true` when the toggle added a like, `false` when it removed one.
    pub liked: bool,
    pub likes_count: usize,
}

/// Engagement service over posts, comments, and likes.
pub struct Community {
    engine: Arc<PointsEngine>,
    notifications: Arc<NotificationStore>,
    effects: EffectBus,
    posts: DashMap<PostId, Post>,
    comments: DashMap<CommentId, Comment>,
    next_post_id: AtomicU64,
    next_comment_id: AtomicU64,
}

impl Community {
    /// Creates the engagement service around an engine and a notification
    /// store, spawning the effect worker.
    pub fn new(engine: Arc<PointsEngine>, notifications: Arc<NotificationStore>) -> Self {
        let effects = EffectBus::new(Arc::clone(&engine), Arc::clone(&notifications));
        Self {
            engine,
            notifications,
            effects,
            posts: DashMap::new(),
            comments: DashMap::new(),
            next_post_id: AtomicU64::new(1),
            next_comment_id: AtomicU64::new(1),
        }
    }

    /// The engine this community feeds.
    pub fn engine(&self) -> &Arc<PointsEngine> {
        &self.engine
    }

    /// The notification store this community delivers into.
    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    /// Blocks until every queued point award and notification has run.
    ///
    /// Effects are best-effort and asynchronous; this barrier is for
    /// shutdown and for tests that assert on effect outcomes.
    pub fn flush_effects(&self) {
        self.effects.flush();
    }

    fn require_user(&self, user_id: UserId) -> Result<(), PointsError> {
        if self.engine.get_profile(&user_id).is_none() {
            return Err(PointsError::UserNotFound);
        }
        Ok(())
    }

    fn award(&self, recipient: UserId, delta: i64, source: PointSource) {
        self.effects.dispatch(Effect::Points {
            user_id: recipient,
            delta,
            source,
        });
    }

    fn notify(&self, draft: NotificationDraft) {
        self.effects.dispatch(Effect::Notify(draft));
    }

    /// Creates a post.
    pub fn create_post(
        &self,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Result<PostId, PointsError> {
        self.require_user(author_id)?;

        let id = PostId(self.next_post_id.fetch_add(1, Ordering::Relaxed));
        self.posts.insert(
            id,
            Post {
                id,
                author_id,
                content: content.into(),
                created_at: Utc::now(),
                likes: HashSet::new(),
            },
        );
        Ok(id)
    }

    /// Comments on a post, awarding the post author a point and notifying
    /// them unless they commented on their own post.
    pub fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Result<CommentId, PointsError> {
        self.require_user(author_id)?;
        let post_author = self
            .posts
            .get(&post_id)
            .map(|post| post.author_id)
            .ok_or(PointsError::PostNotFound)?;

        let id = self.insert_comment(post_id, author_id, None, content.into());

        if post_author != author_id {
            self.award(
                post_author,
                PointSource::CommentOnPost.weight(),
                PointSource::CommentOnPost,
            );
            self.notify(NotificationDraft {
                recipient: post_author,
                actor: author_id,
                kind: NotificationKind::CommentOnPost,
                post_id,
                comment_id: Some(id),
            });
        }

        Ok(id)
    }

    /// Replies to a comment, awarding the parent comment's author a point
    /// and notifying them unless they replied to themselves.
    pub fn reply_to_comment(
        &self,
        parent_id: CommentId,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Result<CommentId, PointsError> {
        self.require_user(author_id)?;
        let (post_id, parent_author) = self
            .comments
            .get(&parent_id)
            .map(|comment| (comment.post_id, comment.author_id))
            .ok_or(PointsError::CommentNotFound)?;

        let id = self.insert_comment(post_id, author_id, Some(parent_id), content.into());

        if parent_author != author_id {
            self.award(
                parent_author,
                PointSource::CommentReply.weight(),
                PointSource::CommentReply,
            );
            self.notify(NotificationDraft {
                recipient: parent_author,
                actor: author_id,
                kind: NotificationKind::CommentReply,
                post_id,
                comment_id: Some(id),
            });
        }

        Ok(id)
    }

    fn insert_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        parent: Option<CommentId>,
        content: String,
    ) -> CommentId {
        let id = CommentId(self.next_comment_id.fetch_add(1, Ordering::Relaxed));
        self.comments.insert(
            id,
            Comment {
                id,
                post_id,
                author_id,
                parent,
                content,
                created_at: Utc::now(),
                likes: HashSet::new(),
            },
        );
        id
    }

    /// Toggles the caller's like on a post.
    ///
    /// Liking someone else's post awards its author a point and notifies
    /// them; withdrawing the like reverses the point without a
    /// notification.
    pub fn toggle_post_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<LikeToggle, PointsError> {
        self.require_user(user_id)?;
        let mut post = self.posts.get_mut(&post_id).ok_or(PointsError::PostNotFound)?;

        let author_id = post.author_id;
        let liked = if post.likes.remove(&user_id) {
            false
        } else {
            post.likes.insert(user_id);
            true
        };
        let likes_count = post.likes.len();
        drop(post);

        if author_id != user_id {
            let weight = PointSource::PostLiked.weight();
            self.award(
                author_id,
                if liked { weight } else { -weight },
                PointSource::PostLiked,
            );
            if liked {
                self.notify(NotificationDraft {
                    recipient: author_id,
                    actor: user_id,
                    kind: NotificationKind::PostLiked,
                    post_id,
                    comment_id: None,
                });
            }
        }

        Ok(LikeToggle { liked, likes_count })
    }

    /// Toggles the caller's like on a comment; same semantics as
    /// [`Community::toggle_post_like`].
    pub fn toggle_comment_like(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<LikeToggle, PointsError> {
        self.require_user(user_id)?;
        let mut comment = self
            .comments
            .get_mut(&comment_id)
            .ok_or(PointsError::CommentNotFound)?;

        let author_id = comment.author_id;
        let post_id = comment.post_id;
        let liked = if comment.likes.remove(&user_id) {
            false
        } else {
            comment.likes.insert(user_id);
            true
        };
        let likes_count = comment.likes.len();
        drop(comment);

        if author_id != user_id {
            let weight = PointSource::CommentLiked.weight();
            self.award(
                author_id,
                if liked { weight } else { -weight },
                PointSource::CommentLiked,
            );
            if liked {
                self.notify(NotificationDraft {
                    recipient: author_id,
                    actor: user_id,
                    kind: NotificationKind::CommentLiked,
                    post_id,
                    comment_id: Some(comment_id),
                });
            }
        }

        Ok(LikeToggle { liked, likes_count })
    }

    /// Rewrites a comment's content. Only the author may update it.
    pub fn update_comment(
        &self,
        comment_id: CommentId,
        user_id: UserId,
        content: impl Into<String>,
    ) -> Result<(), PointsError> {
        let mut comment = self
            .comments
            .get_mut(&comment_id)
            .ok_or(PointsError::CommentNotFound)?;
        if comment.author_id != user_id {
            return Err(PointsError::NotOwner);
        }
        comment.content = content.into();
        Ok(())
    }

    /// Deletes a comment and its direct replies. Only the author may
    /// delete it. Points already awarded for it stay on the ledger.
    pub fn delete_comment(
        &self,
        comment_id: CommentId,
        user_id: UserId,
    ) -> Result<(), PointsError> {
        {
            let comment = self
                .comments
                .get(&comment_id)
                .ok_or(PointsError::CommentNotFound)?;
            if comment.author_id != user_id {
                return Err(PointsError::NotOwner);
            }
        }
        self.comments
            .retain(|_, c| c.id != comment_id && c.parent != Some(comment_id));
        Ok(())
    }

    /// Deletes a post and every comment on it. Only the author may delete
    /// it.
    pub fn delete_post(&self, post_id: PostId, user_id: UserId) -> Result<(), PointsError> {
        {
            let post = self.posts.get(&post_id).ok_or(PointsError::PostNotFound)?;
            if post.author_id != user_id {
                return Err(PointsError::NotOwner);
            }
        }
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
        Ok(())
    }

    /// Users who currently like a post, in id order.
    pub fn post_likers(&self, post_id: PostId) -> Result<Vec<UserId>, PointsError> {
        let post = self.posts.get(&post_id).ok_or(PointsError::PostNotFound)?;
        let mut likers: Vec<UserId> = post.likes.iter().copied().collect();
        likers.sort_unstable();
        Ok(likers)
    }

    /// Users who currently like a comment, in id order.
    pub fn comment_likers(&self, comment_id: CommentId) -> Result<Vec<UserId>, PointsError> {
        let comment = self
            .comments
            .get(&comment_id)
            .ok_or(PointsError::CommentNotFound)?;
        let mut likers: Vec<UserId> = comment.likes.iter().copied().collect();
        likers.sort_unstable();
        Ok(likers)
    }

    /// Read model of one post.
    pub fn post(&self, post_id: PostId) -> Option<PostView> {
        self.posts.get(&post_id).map(|post| PostView {
            id: post.id,
            author_id: post.author_id,
            content: post.content.clone(),
            created_at: post.created_at,
            likes_count: post.likes.len(),
        })
    }

    /// Comments on a post, oldest first.
    pub fn comments_of(&self, post_id: PostId) -> Vec<CommentView> {
        let mut comments: Vec<CommentView> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                parent: c.parent,
                content: c.content.clone(),
                created_at: c.created_at,
                likes_count: c.likes.len(),
            })
            .collect();
        comments.sort_unstable_by_key(|c| c.id.0);
        comments
    }
}
