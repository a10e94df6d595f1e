//! Test helper factories
//!
//! Convenience constructors for store entities with sensible defaults, and a
//! small fixed snapshot shared by engine and report tests.
#![allow(dead_code)]

use crate::store::*;
use chrono::{DateTime, TimeZone, Utc};

/// Timestamp on `day` of March 2024 at `hour`:00 UTC
pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

// ============================================================================
// Entity factories
// ============================================================================

pub fn user(id: UserId, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        display_name: username.to_string(),
        email: Some(format!("{username}@example.com")),
        joined_at: ts(1, 0),
        is_active: true,
    }
}

pub fn post(id: PostId, author_id: UserId, created_at: DateTime<Utc>) -> Post {
    Post {
        id,
        author_id,
        text: format!("Post {id}"),
        media_url: None,
        created_at,
    }
}

pub fn comment(
    id: CommentId,
    post_id: PostId,
    author_id: UserId,
    parent_id: Option<CommentId>,
    text: &str,
    created_at: DateTime<Utc>,
) -> Comment {
    Comment {
        id,
        post_id,
        author_id,
        parent_id,
        text: text.to_string(),
        created_at,
    }
}

pub fn post_like(id: LikeId, author_id: UserId, post_id: PostId, created_at: DateTime<Utc>) -> Like {
    Like {
        id,
        author_id,
        target: LikeTarget::Post(post_id),
        created_at,
    }
}

pub fn comment_like(
    id: LikeId,
    author_id: UserId,
    comment_id: CommentId,
    created_at: DateTime<Utc>,
) -> Like {
    Like {
        id,
        author_id,
        target: LikeTarget::Comment(comment_id),
        created_at,
    }
}

pub fn follow(follower_id: UserId, followee_id: UserId, created_at: DateTime<Utc>) -> Follow {
    Follow {
        follower_id,
        followee_id,
        created_at,
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Four users, three posts, one three-level thread, a ghost follower (dave → carol).
pub fn sample_snapshot() -> Snapshot {
    Snapshot::new()
        .with_user(user(1, "alice"))
        .with_user(user(2, "bob"))
        .with_user(user(3, "carol"))
        .with_user(user(4, "dave"))
        .with_post(post(1, 1, ts(10, 9)))
        .with_post(post(2, 2, ts(12, 9)))
        .with_post(post(3, 3, ts(15, 9)))
        .with_comment(comment(1, 1, 2, None, "Finally!", ts(10, 10)))
        .with_comment(comment(
            2,
            1,
            3,
            Some(1),
            "Agreed, the new syntax reads much better",
            ts(10, 11),
        ))
        .with_comment(comment(3, 1, 1, Some(2), "yes", ts(10, 12)))
        .with_comment(comment(4, 1, 4, None, "meh", ts(11, 8)))
        .with_comment(comment(5, 2, 1, None, "nice", ts(12, 10)))
        .with_like(post_like(1, 2, 1, ts(10, 10)))
        .with_like(post_like(2, 3, 1, ts(11, 9)))
        .with_like(post_like(3, 1, 2, ts(12, 11)))
        .with_like(comment_like(4, 1, 1, ts(10, 13)))
        .with_follow(follow(2, 1, ts(2, 0)))
        .with_follow(follow(3, 1, ts(3, 0)))
        .with_follow(follow(4, 1, ts(4, 0)))
        .with_follow(follow(1, 2, ts(5, 0)))
        .with_follow(follow(4, 3, ts(6, 0)))
}
