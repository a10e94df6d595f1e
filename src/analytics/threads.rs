//! Comment-thread analysis: depth statistics per post and per-post
//! activity timelines.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::store::{Comment, Like, Post, PostId, UserId};

use super::extraction::{CommentForest, UserDirectory};
use super::models::{ActivityKind, ThreadDepthStats, TimelineEvent};

#[derive(Default)]
struct PostThreads {
    total: usize,
    depth_sum: usize,
    max_depth: usize,
    authors: HashSet<UserId>,
    usernames: BTreeSet<String>,
}

/// Per-post thread depth statistics for posts whose deepest comment is at
/// least `min_depth` levels down.
///
/// Ordered by max depth desc, total comments desc, post ID asc.
pub fn analyze_thread_depth(
    posts: &[Post],
    comments: &[Comment],
    users: &UserDirectory,
    min_depth: usize,
    preview_chars: usize,
) -> Vec<ThreadDepthStats> {
    let forest = CommentForest::new(comments);
    let depths = forest.depths();

    let mut per_post: HashMap<PostId, PostThreads> = HashMap::new();
    for (&comment_id, &depth) in &depths {
        let Some(c) = forest.get(comment_id) else {
            continue;
        };
        let entry = per_post.entry(c.post_id).or_default();
        entry.total += 1;
        entry.depth_sum += depth;
        entry.max_depth = entry.max_depth.max(depth);
        entry.authors.insert(c.author_id);
        if let Some(name) = users.name(c.author_id) {
            entry.usernames.insert(name.to_string());
        }
    }

    let mut seen_posts = HashSet::new();
    let mut results: Vec<ThreadDepthStats> = posts
        .iter()
        .filter(|p| seen_posts.insert(p.id))
        .filter_map(|p| {
            let stats = per_post.get(&p.id)?;
            if stats.max_depth < min_depth {
                return None;
            }
            Some(ThreadDepthStats {
                post_id: p.id,
                post_preview: p.text.chars().take(preview_chars).collect(),
                total_comments: stats.total,
                max_thread_depth: stats.max_depth,
                avg_thread_depth: stats.depth_sum as f64 / stats.total as f64,
                unique_participants: stats.authors.len(),
                participants: stats.usernames.iter().cloned().collect(),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.max_thread_depth
            .cmp(&a.max_thread_depth)
            .then(b.total_comments.cmp(&a.total_comments))
            .then(a.post_id.cmp(&b.post_id))
    });
    results
}

/// Time-ordered comment and like activity on one post.
///
/// Each like event carries the number of likes the post received on the
/// same UTC calendar day. Events at the same instant keep a stable order:
/// comments before likes, then by ID.
pub fn post_activity_timeline(
    post_id: PostId,
    comments: &[Comment],
    likes: &[Like],
    users: &UserDirectory,
) -> Vec<TimelineEvent> {
    let mut post_comments: Vec<&Comment> = comments.iter().filter(|c| c.post_id == post_id).collect();
    post_comments.sort_by_key(|c| (c.created_at, c.id));
    post_comments.dedup_by_key(|c| c.id);

    let mut post_likes: Vec<&Like> = likes
        .iter()
        .filter(|l| l.post_id() == Some(post_id) && users.contains(l.author_id))
        .collect();
    post_likes.sort_by_key(|l| (l.created_at, l.id));
    post_likes.dedup_by_key(|l| l.id);

    let mut likes_per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for l in &post_likes {
        *likes_per_day.entry(l.created_at.date_naive()).or_default() += 1;
    }

    let mut events: Vec<TimelineEvent> = Vec::with_capacity(post_comments.len() + post_likes.len());
    for c in post_comments {
        let Some(name) = users.name(c.author_id) else {
            continue;
        };
        events.push(TimelineEvent {
            activity_type: ActivityKind::Comment,
            timestamp: c.created_at,
            username: name.to_string(),
            content: Some(c.text.clone()),
            like_count: None,
        });
    }
    for l in post_likes {
        let Some(name) = users.name(l.author_id) else {
            continue;
        };
        events.push(TimelineEvent {
            activity_type: ActivityKind::Like,
            timestamp: l.created_at,
            username: name.to_string(),
            content: None,
            like_count: likes_per_day.get(&l.created_at.date_naive()).copied(),
        });
    }

    // Stable: equal timestamps keep comments-then-likes insertion order
    events.sort_by_key(|e| e.timestamp);
    events
}
