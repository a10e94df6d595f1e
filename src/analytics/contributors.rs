//! Windowed contributor ranking.
//!
//! Score weights: posts 3, comments 2, likes 1, new followers 5. Following
//! someone new is reported but carries no weight.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::store::{Comment, CommentId, Follow, Like, LikeId, Post, PostId, User, UserId};

use super::models::ContributorScore;

pub const POST_WEIGHT: usize = 3;
pub const COMMENT_WEIGHT: usize = 2;
pub const LIKE_WEIGHT: usize = 1;
pub const NEW_FOLLOWER_WEIGHT: usize = 5;

#[derive(Default)]
struct Activity {
    posts: HashSet<PostId>,
    comments: HashSet<CommentId>,
    likes: HashSet<LikeId>,
    following: HashSet<UserId>,
    followers: HashSet<UserId>,
}

/// Top `limit` users by activity score over everything created at or after
/// `since`. Ties go to the lower user ID.
///
/// Every signal uses the same `since` bound; rows older than it are ignored
/// even if the caller passes them in.
pub fn top_contributors(
    users: &[User],
    posts: &[Post],
    comments: &[Comment],
    likes: &[Like],
    follows: &[Follow],
    since: DateTime<Utc>,
    limit: usize,
) -> Vec<ContributorScore> {
    let mut activity: HashMap<UserId, Activity> = HashMap::new();

    for p in posts.iter().filter(|p| p.created_at >= since) {
        activity.entry(p.author_id).or_default().posts.insert(p.id);
    }
    for c in comments.iter().filter(|c| c.created_at >= since) {
        activity.entry(c.author_id).or_default().comments.insert(c.id);
    }
    for l in likes.iter().filter(|l| l.created_at >= since) {
        activity.entry(l.author_id).or_default().likes.insert(l.id);
    }
    for f in follows
        .iter()
        .filter(|f| f.created_at >= since && !f.is_self_loop())
    {
        activity
            .entry(f.follower_id)
            .or_default()
            .following
            .insert(f.followee_id);
        activity
            .entry(f.followee_id)
            .or_default()
            .followers
            .insert(f.follower_id);
    }

    let empty = Activity::default();
    let mut seen = HashSet::new();
    let mut scores: Vec<ContributorScore> = users
        .iter()
        .filter(|u| seen.insert(u.id))
        .map(|u| {
            let a = activity.get(&u.id).unwrap_or(&empty);
            let post_count = a.posts.len();
            let comment_count = a.comments.len();
            let like_count = a.likes.len();
            let new_followers = a.followers.len();
            ContributorScore {
                user_id: u.id,
                username: u.username.clone(),
                post_count,
                comment_count,
                like_count,
                new_following: a.following.len(),
                new_followers,
                activity_score: activity_score(post_count, comment_count, like_count, new_followers),
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        b.activity_score
            .cmp(&a.activity_score)
            .then(a.user_id.cmp(&b.user_id))
    });
    scores.truncate(limit);
    scores
}

pub fn activity_score(posts: usize, comments: usize, likes: usize, new_followers: usize) -> usize {
    posts * POST_WEIGHT
        + comments * COMMENT_WEIGHT
        + likes * LIKE_WEIGHT
        + new_followers * NEW_FOLLOWER_WEIGHT
}
