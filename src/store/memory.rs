//! In-memory GraphStore backed by a [`Snapshot`].
//!
//! Used by the CLI (`--snapshot data.json`) and by tests. The snapshot is
//! immutable once the store is built, so no locking is needed.

use super::models::*;
use super::traits::GraphStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A materialized copy of the whole dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub follows: Vec<Follow>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        tracing::info!(
            users = snapshot.users.len(),
            posts = snapshot.posts.len(),
            comments = snapshot.comments.len(),
            likes = snapshot.likes.len(),
            follows = snapshot.follows.len(),
            "Loaded snapshot from {}",
            path.display()
        );
        Ok(snapshot)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.push(post);
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn with_like(mut self, like: Like) -> Self {
        self.likes.push(like);
        self
    }

    pub fn with_follow(mut self, follow: Follow) -> Self {
        self.follows.push(follow);
        self
    }
}

/// Read-only GraphStore over an owned [`Snapshot`]
pub struct InMemoryGraphStore {
    snapshot: Snapshot,
}

impl InMemoryGraphStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(Snapshot::from_json_file(path)?))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn query_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        Ok(self
            .snapshot
            .users
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        Ok(self
            .snapshot
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn query_comments(&self, filter: &CommentFilter) -> Result<Vec<Comment>> {
        Ok(self
            .snapshot
            .comments
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn query_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>> {
        Ok(self
            .snapshot
            .likes
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn query_follows(&self, filter: &FollowFilter) -> Result<Vec<Follow>> {
        Ok(self
            .snapshot
            .follows
            .iter()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect())
    }
}
