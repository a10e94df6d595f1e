//! Store → in-memory index extraction.
//!
//! Builds the per-call lookup structures the analyzers work on:
//!
//! - [`UserDirectory`]: user ID → username
//! - [`FollowGraph`]: deduplicated directed follow edges (petgraph)
//! - [`CommentForest`]: parent → children adjacency plus iterative depth assignment
//!
//! Everything here is rebuilt from scratch for each analytics call and owned
//! by that call. Relationships are kept as id-indexed maps and edge lists,
//! never as mutual references between entities.

use crate::store::{
    Comment, CommentId, Follow, FollowFilter, GraphStore, User, UserFilter, UserId,
};
use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::FollowGraph;

// ============================================================================
// Users
// ============================================================================

/// Username lookup by user ID
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<UserId, String>,
}

impl UserDirectory {
    pub fn from_users(users: &[User]) -> Self {
        let names = users
            .iter()
            .map(|u| (u.id, u.username.clone()))
            .collect();
        Self { names }
    }

    pub fn name(&self, user_id: UserId) -> Option<&str> {
        self.names.get(&user_id).map(String::as_str)
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.names.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// Follows
// ============================================================================

/// Build a deduplicated follow graph. Self-loops are dropped.
pub fn build_follow_graph(follows: &[Follow]) -> FollowGraph {
    collect_follows(follows.iter(), follows.len())
}

/// Follow graph over known users only.
///
/// Edges with an endpoint missing from `users` are dropped before the graph
/// is built, so node and edge counts match what can be resolved to usernames.
pub fn build_user_follow_graph(follows: &[Follow], users: &UserDirectory) -> FollowGraph {
    let (known, unknown): (Vec<&Follow>, Vec<&Follow>) = follows
        .iter()
        .partition(|f| users.contains(f.follower_id) && users.contains(f.followee_id));
    if !unknown.is_empty() {
        warn!(count = unknown.len(), "Ignored follow edges to unknown users");
    }
    let capacity = known.len();
    collect_follows(known.into_iter(), capacity)
}

fn collect_follows<'a>(follows: impl Iterator<Item = &'a Follow>, capacity: usize) -> FollowGraph {
    let mut graph = FollowGraph::with_capacity(capacity, capacity);
    let mut self_loops = 0usize;
    let mut duplicates = 0usize;

    for f in follows {
        if f.is_self_loop() {
            self_loops += 1;
            continue;
        }
        if !graph.add_follow(f.follower_id, f.followee_id, f.created_at) {
            duplicates += 1;
        }
    }

    if self_loops > 0 {
        warn!(count = self_loops, "Ignored self-follow edges");
    }
    if duplicates > 0 {
        debug!(count = duplicates, "Collapsed duplicate follow edges");
    }
    graph
}

// ============================================================================
// Comments
// ============================================================================

/// Comment reply forest for any set of comments.
///
/// Top-level comments (no parent) are roots. Depths are assigned by a
/// breadth-first walk with an explicit queue and a depth table keyed by
/// comment ID, so the cost is linear in the number of comments and deep
/// threads never grow the call stack.
pub struct CommentForest<'a> {
    by_id: HashMap<CommentId, &'a Comment>,
    children: HashMap<CommentId, Vec<CommentId>>,
    roots: Vec<CommentId>,
}

impl<'a> CommentForest<'a> {
    pub fn new(comments: &'a [Comment]) -> Self {
        let mut by_id: HashMap<CommentId, &'a Comment> = HashMap::with_capacity(comments.len());
        for c in comments {
            by_id.entry(c.id).or_insert(c);
        }

        let mut children: HashMap<CommentId, Vec<CommentId>> = HashMap::new();
        let mut roots = Vec::new();
        for c in by_id.values() {
            match c.parent_id {
                None => roots.push(c.id),
                Some(parent) => children.entry(parent).or_default().push(c.id),
            }
        }
        roots.sort_unstable();
        for list in children.values_mut() {
            list.sort_unstable();
        }

        Self {
            by_id,
            children,
            roots,
        }
    }

    pub fn get(&self, id: CommentId) -> Option<&'a Comment> {
        self.by_id.get(&id).copied()
    }

    /// Distinct comments in the forest
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Depth of every comment reachable from a top-level comment.
    ///
    /// Top-level comments have depth 1; a reply is one deeper than its parent.
    /// Comments whose parent chain never reaches a root (dangling parent or a
    /// cycle) are left out.
    pub fn depths(&self) -> HashMap<CommentId, usize> {
        let mut depth: HashMap<CommentId, usize> = HashMap::with_capacity(self.by_id.len());
        let mut queue: VecDeque<CommentId> = VecDeque::with_capacity(self.roots.len());

        for &root in &self.roots {
            depth.insert(root, 1);
            queue.push_back(root);
        }

        while let Some(id) = queue.pop_front() {
            let d = depth[&id];
            if let Some(kids) = self.children.get(&id) {
                for &child in kids {
                    if depth.contains_key(&child) {
                        continue;
                    }
                    depth.insert(child, d + 1);
                    queue.push_back(child);
                }
            }
        }

        let unreachable = self.by_id.len() - depth.len();
        if unreachable > 0 {
            warn!(
                count = unreachable,
                "Comments not reachable from a top-level comment were skipped"
            );
        }
        depth
    }
}

// ============================================================================
// Store-backed extraction
// ============================================================================

/// Fetches users and follow edges through the `GraphStore` trait and turns
/// them into lookup structures.
pub struct GraphExtractor {
    store: Arc<dyn GraphStore>,
}

impl GraphExtractor {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn user_directory(&self) -> Result<UserDirectory> {
        let users = self.store.query_users(&UserFilter::default()).await?;
        Ok(UserDirectory::from_users(&users))
    }

    pub async fn follow_graph(&self, filter: &FollowFilter) -> Result<FollowGraph> {
        let follows = self.store.query_follows(filter).await?;
        Ok(build_follow_graph(&follows))
    }

    /// Follow graph restricted to edges between users in `users`
    pub async fn user_follow_graph(&self, users: &UserDirectory) -> Result<FollowGraph> {
        let follows = self.store.query_follows(&FollowFilter::default()).await?;
        Ok(build_user_follow_graph(&follows, users))
    }
}

// ============================================================================
// Tests
// ============================================================================
