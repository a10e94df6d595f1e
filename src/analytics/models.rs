//! Analytics data models.
//!
//! ## Input structure (extraction → analyzers)
//! - [`FollowGraph`]: petgraph wrapper over deduplicated follow edges with user ID ↔ NodeIndex mapping
//!
//! ## Output records
//! - [`ThreadDepthStats`], [`TimelineEvent`]: thread analysis
//! - [`ControversialPost`]: comment-length dispersion scoring
//! - [`PostEngagement`], [`UserEngagementSummary`]: engagement rates
//! - [`ContributorScore`]: windowed weighted activity
//! - [`FollowEdge`], [`GhostFollower`], [`NetworkDensity`]: follow network
//!
//! Every record serializes to a flat JSON object. Undefined ratios are
//! `Option::None` and serialize as `null`.
//!
//! ## Configuration
//! - [`AnalyticsConfig`]: default parameters for every analyzer

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::store::{PostId, UserId};

// ============================================================================
// FollowGraph: petgraph wrapper with ID mapping
// ============================================================================

/// Directed follow graph. Nodes are user IDs, edge weights are the follow time.
///
/// Parallel edges are never stored: re-adding an existing (follower, followee)
/// pair keeps a single edge carrying the earliest follow time.
#[derive(Debug, Clone)]
pub struct FollowGraph {
    /// The underlying directed graph
    pub graph: DiGraph<UserId, DateTime<Utc>>,
    /// Mapping from user ID to petgraph NodeIndex
    pub id_to_index: HashMap<UserId, NodeIndex>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_to_index: HashMap::new(),
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Add a user node, returning the existing index if already present.
    pub fn add_user(&mut self, user_id: UserId) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&user_id) {
            return idx;
        }
        let idx = self.graph.add_node(user_id);
        self.id_to_index.insert(user_id, idx);
        idx
    }

    /// Add a follow edge. Returns `false` for self-loops and duplicates.
    pub fn add_follow(
        &mut self,
        follower: UserId,
        followee: UserId,
        followed_at: DateTime<Utc>,
    ) -> bool {
        if follower == followee {
            return false;
        }
        let from = self.add_user(follower);
        let to = self.add_user(followee);
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                let existing = &mut self.graph[edge];
                if followed_at < *existing {
                    *existing = followed_at;
                }
                false
            }
            None => {
                self.graph.add_edge(from, to, followed_at);
                true
            }
        }
    }

    pub fn get_index(&self, user_id: UserId) -> Option<NodeIndex> {
        self.id_to_index.get(&user_id).copied()
    }

    pub fn follows(&self, follower: UserId, followee: UserId) -> bool {
        match (self.get_index(follower), self.get_index(followee)) {
            (Some(a), Some(b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Distinct followers of `user_id`
    pub fn follower_count(&self, user_id: UserId) -> usize {
        self.get_index(user_id).map_or(0, |idx| {
            self.graph
                .neighbors_directed(idx, Direction::Incoming)
                .count()
        })
    }

    /// Distinct accounts `user_id` follows
    pub fn following_count(&self, user_id: UserId) -> usize {
        self.get_index(user_id).map_or(0, |idx| {
            self.graph
                .neighbors_directed(idx, Direction::Outgoing)
                .count()
        })
    }

    /// Accounts `user_id` follows, in ascending ID order
    pub fn followees(&self, user_id: UserId) -> Vec<UserId> {
        let Some(idx) = self.get_index(user_id) else {
            return Vec::new();
        };
        let mut out: Vec<UserId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        out.sort_unstable();
        out
    }

    /// Every edge as `(follower, followee, followed_at)`
    pub fn edges(&self) -> impl Iterator<Item = (UserId, UserId, DateTime<Utc>)> + '_ {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()],
                self.graph[e.target()],
                *e.weight(),
            )
        })
    }

    /// Users that follow at least one account, in ascending ID order
    pub fn followers_with_edges(&self) -> Vec<UserId> {
        let mut out: Vec<UserId> = self
            .graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Outgoing)
                    .next()
                    .is_some()
            })
            .map(|n| self.graph[n])
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of distinct users that appear in at least one edge
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct follow edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for FollowGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Thread analysis
// ============================================================================

/// Comment-thread depth statistics for one post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDepthStats {
    pub post_id: PostId,
    /// First characters of the post text
    pub post_preview: String,
    pub total_comments: usize,
    pub max_thread_depth: usize,
    /// Mean depth over every comment of the post (not only leaves)
    pub avg_thread_depth: f64,
    pub unique_participants: usize,
    /// Sorted, deduplicated usernames of commenters
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Comment,
    Like,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comment => write!(f, "comment"),
            Self::Like => write!(f, "like"),
        }
    }
}

/// One entry of a post's activity timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub activity_type: ActivityKind,
    pub timestamp: DateTime<Utc>,
    pub username: String,
    /// Comment text (comments only)
    pub content: Option<String>,
    /// Likes on this post during the same UTC calendar day (likes only)
    pub like_count: Option<usize>,
}

// ============================================================================
// Controversy
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControversialPost {
    pub post_id: PostId,
    pub post_text: String,
    pub post_time: DateTime<Utc>,
    pub author: String,
    pub total_comments: usize,
    pub unique_commenters: usize,
    pub avg_comment_length: f64,
    /// Sample standard deviation (N − 1), 0 for a single comment
    pub stddev_comment_length: f64,
    pub reply_count: usize,
    pub avg_reply_length: f64,
    /// `stddev_comment_length × total_comments`
    pub controversy_score: f64,
}

// ============================================================================
// Engagement
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEngagement {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub post_text: String,
    pub post_time: DateTime<Utc>,
    /// Distinct users who liked the post
    pub like_count: usize,
    /// Distinct users who commented on the post
    pub comment_count: usize,
    /// Author's current follower count
    pub follower_count: usize,
    /// `(likes + comments) × 100 / followers`, `None` without followers
    pub engagement_rate: Option<f64>,
    /// Dense rank of `likes + comments`, 1 = most engaged
    pub engagement_rank: usize,
}

impl PostEngagement {
    pub fn interactions(&self) -> usize {
        self.like_count + self.comment_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEngagementSummary {
    pub user_id: UserId,
    pub username: String,
    pub post_count: usize,
    pub likes_received: usize,
    pub comments_received: usize,
    pub follower_count: usize,
    pub following_count: usize,
    pub avg_like_rate: Option<f64>,
    pub avg_comment_rate: Option<f64>,
}

// ============================================================================
// Contributors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorScore {
    pub user_id: UserId,
    pub username: String,
    pub post_count: usize,
    pub comment_count: usize,
    pub like_count: usize,
    pub new_following: usize,
    pub new_followers: usize,
    pub activity_score: usize,
}

// ============================================================================
// Network
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_username: String,
    pub followee_username: String,
    pub follow_time: DateTime<Utc>,
}

/// A user following at least one account they never interacted with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostFollower {
    pub user_id: UserId,
    pub username: String,
    /// Total accounts this user follows
    pub following_count: usize,
    /// How many of those were never liked or commented on
    pub ghosted_count: usize,
    pub ghosted_followees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDensity {
    pub node_count: usize,
    pub edge_count: usize,
    /// `edges / (n × (n − 1))`, `None` with fewer than two nodes
    pub density: Option<f64>,
}

// ============================================================================
// Helpers
// ============================================================================

/// `numerator × 100 / denominator`, `None` when the denominator is zero.
pub fn percent_of(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 * 100.0 / denominator as f64)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Default analyzer parameters, overridable per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Window for post engagement and contributor ranking (default: 30)
    pub lookback_days: u32,
    /// Minimum max-depth for `analyze_thread_depth` (default: 2)
    pub min_thread_depth: usize,
    /// Minimum comment count for controversy (default: 10)
    pub min_comments: usize,
    /// Minimum comment-length stddev for controversy (default: 2.0)
    pub min_stddev: f64,
    /// Number of top contributors (default: 5)
    pub top_contributors: usize,
    /// Size of top/bottom lists in reports (default: 5)
    pub report_top_n: usize,
    /// Characters kept in `post_preview` (default: 50)
    pub post_preview_chars: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            min_thread_depth: 2,
            min_comments: 10,
            min_stddev: 2.0,
            top_contributors: 5,
            report_top_n: 5,
            post_preview_chars: 50,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ts;

    #[test]
    fn test_analytics_config_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.min_thread_depth, 2);
        assert_eq!(config.min_comments, 10);
        assert!((config.min_stddev - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.top_contributors, 5);
        assert_eq!(config.post_preview_chars, 50);
    }

    #[test]
    fn test_analytics_config_partial_yaml() {
        let config: AnalyticsConfig = serde_yaml::from_str("lookback_days: 7").unwrap();
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.min_comments, 10);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(5, 10), Some(50.0));
        assert_eq!(percent_of(0, 4), Some(0.0));
        assert_eq!(percent_of(3, 0), None);
    }

    #[test]
    fn test_undefined_rate_serializes_as_null() {
        let row = UserEngagementSummary {
            user_id: 1,
            username: "alice".into(),
            post_count: 0,
            likes_received: 0,
            comments_received: 0,
            follower_count: 0,
            following_count: 0,
            avg_like_rate: None,
            avg_comment_rate: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json["avg_like_rate"].is_null());
    }

    #[test]
    fn test_activity_kind_display() {
        assert_eq!(ActivityKind::Comment.to_string(), "comment");
        assert_eq!(ActivityKind::Like.to_string(), "like");
    }

    // --- FollowGraph ---

    #[test]
    fn test_follow_graph_dedups_edges() {
        let mut g = FollowGraph::new();
        assert!(g.add_follow(1, 2, ts(5, 0)));
        assert!(!g.add_follow(1, 2, ts(3, 0)));
        assert!(g.add_follow(2, 1, ts(4, 0)));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);

        // Earliest time kept for the duplicate
        let edge = g
            .graph
            .find_edge(g.get_index(1).unwrap(), g.get_index(2).unwrap())
            .unwrap();
        assert_eq!(g.graph[edge], ts(3, 0));
    }

    #[test]
    fn test_follow_graph_rejects_self_loop() {
        let mut g = FollowGraph::new();
        assert!(!g.add_follow(7, 7, ts(1, 0)));
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_follow_graph_follows() {
        let mut g = FollowGraph::new();
        g.add_follow(1, 2, ts(1, 0));
        assert!(g.follows(1, 2));
        assert!(!g.follows(2, 1));
        assert!(!g.follows(1, 99));
    }

    #[test]
    fn test_follow_graph_degree_queries() {
        let mut g = FollowGraph::new();
        g.add_follow(1, 3, ts(1, 0));
        g.add_follow(1, 2, ts(1, 0));
        g.add_follow(2, 3, ts(1, 0));
        g.add_follow(2, 3, ts(2, 0));

        assert_eq!(g.follower_count(3), 2);
        assert_eq!(g.following_count(1), 2);
        assert_eq!(g.following_count(3), 0);
        assert_eq!(g.follower_count(42), 0);
        assert_eq!(g.followees(1), vec![2, 3]);
        assert_eq!(g.followers_with_edges(), vec![1, 2]);
        assert_eq!(g.edges().count(), 3);
    }
}
