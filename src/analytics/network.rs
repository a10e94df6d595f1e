//! Follow-network metrics: edge list, ghost followers and density.

use std::collections::{HashMap, HashSet};

use crate::store::{Comment, Like, Post, PostId, UserId};

use super::extraction::UserDirectory;
use super::models::{FollowEdge, FollowGraph, GhostFollower, NetworkDensity};

/// Follow edges with both endpoints resolved to usernames.
///
/// Edges touching an unknown user are dropped. Ordered by follower username
/// then followee username.
pub fn follower_network(follows: &FollowGraph, users: &UserDirectory) -> Vec<FollowEdge> {
    let mut edges: Vec<FollowEdge> = follows
        .edges()
        .filter_map(|(follower, followee, at)| {
            Some(FollowEdge {
                follower_username: users.name(follower)?.to_string(),
                followee_username: users.name(followee)?.to_string(),
                follow_time: at,
            })
        })
        .collect();
    edges.sort_by(|a, b| {
        a.follower_username
            .cmp(&b.follower_username)
            .then_with(|| a.followee_username.cmp(&b.followee_username))
    });
    edges
}

/// Users who follow at least one account whose posts they never liked or
/// commented on. Ordered by user ID.
///
/// Followees missing from `users` are ignored, both as ghost candidates and
/// in `following_count`.
///
/// Only post likes count as interaction; liking one of the followee's
/// comments does not.
pub fn ghost_followers(
    follows: &FollowGraph,
    users: &UserDirectory,
    posts: &[Post],
    likes: &[Like],
    comments: &[Comment],
) -> Vec<GhostFollower> {
    let author_of: HashMap<PostId, UserId> = posts.iter().map(|p| (p.id, p.author_id)).collect();

    // (actor, author) pairs with at least one interaction
    let mut interacted: HashSet<(UserId, UserId)> = HashSet::new();
    for l in likes {
        if let Some(&author) = l.post_id().and_then(|id| author_of.get(&id)) {
            interacted.insert((l.author_id, author));
        }
    }
    for c in comments {
        if let Some(&author) = author_of.get(&c.post_id) {
            interacted.insert((c.author_id, author));
        }
    }

    follows
        .followers_with_edges()
        .into_iter()
        .filter_map(|follower| {
            let username = users.name(follower)?.to_string();
            let followees: Vec<(UserId, &str)> = follows
                .followees(follower)
                .into_iter()
                .filter_map(|id| users.name(id).map(|name| (id, name)))
                .collect();
            let mut ghosted: Vec<String> = followees
                .iter()
                .filter(|(followee, _)| !interacted.contains(&(follower, *followee)))
                .map(|(_, name)| name.to_string())
                .collect();
            if ghosted.is_empty() {
                return None;
            }
            ghosted.sort();
            Some(GhostFollower {
                user_id: follower,
                username,
                following_count: followees.len(),
                ghosted_count: ghosted.len(),
                ghosted_followees: ghosted,
            })
        })
        .collect()
}

/// `edges / (n × (n − 1))` over users that appear in at least one edge.
///
/// Callers pass a graph built with `build_user_follow_graph` so the counts
/// agree with [`follower_network`].
pub fn network_density(follows: &FollowGraph) -> NetworkDensity {
    let n = follows.node_count();
    let e = follows.edge_count();
    let density = if n < 2 {
        None
    } else {
        Some(e as f64 / (n as f64 * (n - 1) as f64))
    };
    NetworkDensity {
        node_count: n,
        edge_count: e,
        density,
    }
}
