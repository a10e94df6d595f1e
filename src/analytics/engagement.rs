//! Engagement rates per post and per user.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::store::{Comment, Like, Post, PostId, User, UserId};

use super::extraction::UserDirectory;
use super::models::{percent_of, FollowGraph, PostEngagement, UserEngagementSummary};

/// Engagement for each post in `posts`.
///
/// `posts` is expected to be already restricted to the lookback window.
/// Likes and comments are matched by post ID regardless of when they were
/// made. Posts whose author is unknown are dropped.
pub fn post_engagement(
    posts: &[Post],
    likes: &[Like],
    comments: &[Comment],
    follows: &FollowGraph,
    users: &UserDirectory,
) -> Vec<PostEngagement> {
    let mut likers: HashMap<PostId, HashSet<UserId>> = HashMap::new();
    for l in likes {
        if let Some(post_id) = l.post_id() {
            likers.entry(post_id).or_default().insert(l.author_id);
        }
    }
    let mut commenters: HashMap<PostId, HashSet<UserId>> = HashMap::new();
    for c in comments {
        commenters.entry(c.post_id).or_default().insert(c.author_id);
    }

    let mut seen = HashSet::new();
    let mut rows: Vec<PostEngagement> = posts
        .iter()
        .filter(|p| seen.insert(p.id))
        .filter_map(|p| {
            let author_name = users.name(p.author_id)?.to_string();
            let like_count = likers.get(&p.id).map_or(0, HashSet::len);
            let comment_count = commenters.get(&p.id).map_or(0, HashSet::len);
            let follower_count = follows.follower_count(p.author_id);
            Some(PostEngagement {
                post_id: p.id,
                author_id: p.author_id,
                author_name,
                post_text: p.text.clone(),
                post_time: p.created_at,
                like_count,
                comment_count,
                follower_count,
                engagement_rate: percent_of(like_count + comment_count, follower_count),
                engagement_rank: 0,
            })
        })
        .collect();

    assign_dense_rank(&mut rows);

    rows.sort_by(|a, b| {
        let by_rate = match (a.engagement_rate, b.engagement_rate) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        by_rate
            .then(a.engagement_rank.cmp(&b.engagement_rank))
            .then(a.post_id.cmp(&b.post_id))
    });
    rows
}

/// Dense rank over `likes + comments`, highest first. Equal totals share a
/// rank and the next distinct total gets the next integer.
fn assign_dense_rank(rows: &mut [PostEngagement]) {
    let distinct: BTreeSet<usize> = rows.iter().map(PostEngagement::interactions).collect();
    let rank_of: HashMap<usize, usize> = distinct
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &total)| (total, i + 1))
        .collect();
    for row in rows.iter_mut() {
        row.engagement_rank = rank_of[&row.interactions()];
    }
}

#[derive(Default)]
struct Received {
    posts: HashSet<PostId>,
    likes: HashSet<i64>,
    comments: HashSet<i64>,
}

/// Lifetime engagement summary for every user, ordered by likes received
/// desc then user ID asc.
pub fn user_engagement_summary(
    users: &[User],
    posts: &[Post],
    likes: &[Like],
    comments: &[Comment],
    follows: &FollowGraph,
) -> Vec<UserEngagementSummary> {
    let author_of: HashMap<PostId, UserId> = posts.iter().map(|p| (p.id, p.author_id)).collect();

    let mut received: HashMap<UserId, Received> = HashMap::new();
    for p in posts {
        received.entry(p.author_id).or_default().posts.insert(p.id);
    }
    for l in likes {
        if let Some(author) = l.post_id().and_then(|id| author_of.get(&id)) {
            received.entry(*author).or_default().likes.insert(l.id);
        }
    }
    for c in comments {
        if let Some(author) = author_of.get(&c.post_id) {
            received.entry(*author).or_default().comments.insert(c.id);
        }
    }

    let mut seen = HashSet::new();
    let mut rows: Vec<UserEngagementSummary> = users
        .iter()
        .filter(|u| seen.insert(u.id))
        .map(|u| {
            let r = received.get(&u.id);
            let likes_received = r.map_or(0, |r| r.likes.len());
            let comments_received = r.map_or(0, |r| r.comments.len());
            let follower_count = follows.follower_count(u.id);
            UserEngagementSummary {
                user_id: u.id,
                username: u.username.clone(),
                post_count: r.map_or(0, |r| r.posts.len()),
                likes_received,
                comments_received,
                follower_count,
                following_count: follows.following_count(u.id),
                avg_like_rate: percent_of(likes_received, follower_count),
                avg_comment_rate: percent_of(comments_received, follower_count),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.likes_received
            .cmp(&a.likes_received)
            .then(a.user_id.cmp(&b.user_id))
    });
    rows
}
