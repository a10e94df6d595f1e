//! Social graph entities and store query filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;
pub type LikeId = i64;

// ============================================================================
// Entities
// ============================================================================

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A top-level piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub text: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post, optionally replying to another comment of the same post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Text length in characters (not bytes)
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// What a like points at. Exactly one target per like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeTarget {
    Post(PostId),
    Comment(CommentId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub author_id: UserId,
    pub target: LikeTarget,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// The liked post, if this like targets a post
    pub fn post_id(&self) -> Option<PostId> {
        match self.target {
            LikeTarget::Post(id) => Some(id),
            LikeTarget::Comment(_) => None,
        }
    }
}

/// Directed follow edge: `follower_id` follows `followee_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn is_self_loop(&self) -> bool {
        self.follower_id == self.followee_id
    }
}

// ============================================================================
// Query filters
// ============================================================================
//
// `Default` means "every row". Each populated field narrows the result.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub ids: Option<BTreeSet<UserId>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub ids: Option<BTreeSet<PostId>>,
    pub author_ids: Option<BTreeSet<UserId>>,
    pub created_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilter {
    pub post_ids: Option<BTreeSet<PostId>>,
    pub created_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikeFilter {
    /// Restrict to likes targeting one of these posts (comment likes are excluded)
    pub post_ids: Option<BTreeSet<PostId>>,
    pub created_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowFilter {
    pub created_since: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn since(created_since: DateTime<Utc>) -> Self {
        Self {
            created_since: Some(created_since),
            ..Default::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.ids.as_ref().map_or(true, |ids| ids.contains(&post.id))
            && self
                .author_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&post.author_id))
            && self
                .created_since
                .map_or(true, |since| post.created_at >= since)
    }
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.ids.as_ref().map_or(true, |ids| ids.contains(&user.id))
    }
}

impl CommentFilter {
    pub fn for_post(post_id: PostId) -> Self {
        Self {
            post_ids: Some(BTreeSet::from([post_id])),
            ..Default::default()
        }
    }

    pub fn since(created_since: DateTime<Utc>) -> Self {
        Self {
            created_since: Some(created_since),
            ..Default::default()
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.post_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&comment.post_id))
            && self
                .created_since
                .map_or(true, |since| comment.created_at >= since)
    }
}

impl LikeFilter {
    pub fn for_post(post_id: PostId) -> Self {
        Self {
            post_ids: Some(BTreeSet::from([post_id])),
            ..Default::default()
        }
    }

    pub fn since(created_since: DateTime<Utc>) -> Self {
        Self {
            created_since: Some(created_since),
            ..Default::default()
        }
    }

    pub fn matches(&self, like: &Like) -> bool {
        let target_ok = match &self.post_ids {
            None => true,
            Some(ids) => like.post_id().is_some_and(|id| ids.contains(&id)),
        };
        target_ok
            && self
                .created_since
                .map_or(true, |since| like.created_at >= since)
    }
}

impl FollowFilter {
    pub fn since(created_since: DateTime<Utc>) -> Self {
        Self {
            created_since: Some(created_since),
        }
    }

    pub fn matches(&self, follow: &Follow) -> bool {
        self.created_since
            .map_or(true, |since| follow.created_at >= since)
    }
}
