//! Controversy scoring.
//!
//! A discussion where comment lengths vary wildly (one-liners next to long
//! rebuttals) scores higher than one with uniform comments. The score is the
//! sample standard deviation of comment lengths times the comment count.

use std::collections::{HashMap, HashSet};

use crate::store::{Comment, Post, PostId, UserId};

use super::extraction::UserDirectory;
use super::models::ControversialPost;

/// Mean and sample standard deviation (N − 1 denominator).
///
/// Returns `(0.0, 0.0)` for no values and a zero deviation for one value.
pub fn mean_and_sample_stddev(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (sum_sq / (n - 1) as f64).sqrt())
}

#[derive(Default)]
struct PostComments {
    lengths: Vec<f64>,
    reply_lengths: Vec<f64>,
    commenters: HashSet<UserId>,
}

/// Posts with at least `min_comments` comments whose comment-length standard
/// deviation is at least `min_stddev`, ordered by controversy score desc
/// then post ID asc.
pub fn identify_controversial_posts(
    posts: &[Post],
    comments: &[Comment],
    users: &UserDirectory,
    min_comments: usize,
    min_stddev: f64,
) -> Vec<ControversialPost> {
    let mut seen = HashSet::new();
    let mut per_post: HashMap<PostId, PostComments> = HashMap::new();
    for c in comments.iter().filter(|c| seen.insert(c.id)) {
        let entry = per_post.entry(c.post_id).or_default();
        let len = c.text_len() as f64;
        entry.lengths.push(len);
        entry.commenters.insert(c.author_id);
        if c.is_reply() {
            entry.reply_lengths.push(len);
        }
    }

    let mut seen_posts = HashSet::new();
    let mut results: Vec<ControversialPost> = posts
        .iter()
        .filter(|p| seen_posts.insert(p.id))
        .filter_map(|p| {
            let stats = per_post.get(&p.id)?;
            let total = stats.lengths.len();
            if total < min_comments {
                return None;
            }
            let (avg, stddev) = mean_and_sample_stddev(&stats.lengths);
            if stddev < min_stddev {
                return None;
            }
            let (avg_reply, _) = mean_and_sample_stddev(&stats.reply_lengths);
            let author = users.name(p.author_id)?.to_string();

            Some(ControversialPost {
                post_id: p.id,
                post_text: p.text.clone(),
                post_time: p.created_at,
                author,
                total_comments: total,
                unique_commenters: stats.commenters.len(),
                avg_comment_length: avg,
                stddev_comment_length: stddev,
                reply_count: stats.reply_lengths.len(),
                avg_reply_length: avg_reply,
                controversy_score: controversy_score(stddev, total),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.controversy_score
            .total_cmp(&a.controversy_score)
            .then(a.post_id.cmp(&b.post_id))
    });
    results
}

/// `stddev × total_comments`
pub fn controversy_score(stddev: f64, total_comments: usize) -> f64 {
    stddev * total_comments as f64
}
