//! GraphStore trait definition
//!
//! Read-only access to a social graph snapshot. The analytics engine only
//! depends on this trait, so any backend (Neo4j, an in-memory snapshot, a
//! test fake) can be injected.

use super::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract read interface over users, posts, comments, likes and follows.
///
/// Implementations must return a consistent view for the duration of one
/// analytics call. Errors are returned as-is to the caller; the engine
/// neither retries nor masks them.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Users matching the filter
    async fn query_users(&self, filter: &UserFilter) -> Result<Vec<User>>;

    /// Posts matching the filter
    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// Comments matching the filter
    async fn query_comments(&self, filter: &CommentFilter) -> Result<Vec<Comment>>;

    /// Likes matching the filter
    async fn query_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>>;

    /// Follow edges matching the filter
    async fn query_follows(&self, filter: &FollowFilter) -> Result<Vec<Follow>>;

    /// Health check (optional)
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
