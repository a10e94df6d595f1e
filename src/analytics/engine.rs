//! Analytics engine: validate → fetch → compute.
//!
//! The `AnalyticsEngine` trait is the single entry point for analytics
//! consumers (CLI, report). Every operation:
//!
//! 1. **Validation**: rejects nonsensical parameters before touching the store
//! 2. **Fetch**: reads the rows it needs through `GraphStore`
//! 3. **Computation**: runs the pure analyzer over the fetched rows
//!
//! The trait also enables mocking in downstream consumer tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::store::{
    CommentFilter, FollowFilter, GraphStore, LikeFilter, PostFilter, PostId, UserFilter,
};

use super::extraction::GraphExtractor;
use super::models::{
    AnalyticsConfig, ContributorScore, ControversialPost, FollowEdge, GhostFollower,
    NetworkDensity, PostEngagement, ThreadDepthStats, TimelineEvent, UserEngagementSummary,
};
use super::{contributors, controversy, engagement, network, threads};

// ============================================================================
// Trait
// ============================================================================

/// Analytics engine trait, the single entry point for social-graph analytics.
///
/// Consumers use `Arc<dyn AnalyticsEngine>` for dependency injection.
/// Each call reads a fresh view of the store and returns owned records.
#[async_trait]
pub trait AnalyticsEngine: Send + Sync {
    /// Thread depth statistics for posts whose deepest comment reaches `min_depth`.
    async fn analyze_thread_depth(&self, min_depth: usize) -> AnalyticsResult<Vec<ThreadDepthStats>>;

    /// Comment and like activity on one post, oldest first.
    async fn get_post_activity_timeline(&self, post_id: PostId) -> AnalyticsResult<Vec<TimelineEvent>>;

    async fn identify_controversial_posts(
        &self,
        min_comments: usize,
        min_stddev: f64,
    ) -> AnalyticsResult<Vec<ControversialPost>>;

    /// Engagement for posts created in the last `lookback_days` days.
    async fn get_post_engagement(&self, lookback_days: u32) -> AnalyticsResult<Vec<PostEngagement>>;

    async fn get_user_engagement_summary(&self) -> AnalyticsResult<Vec<UserEngagementSummary>>;

    async fn get_top_contributors(
        &self,
        lookback_days: u32,
        limit: usize,
    ) -> AnalyticsResult<Vec<ContributorScore>>;

    async fn get_follower_network(&self) -> AnalyticsResult<Vec<FollowEdge>>;

    async fn identify_ghost_followers(&self) -> AnalyticsResult<Vec<GhostFollower>>;

    async fn network_density(&self) -> AnalyticsResult<NetworkDensity>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Real analytics engine backed by a `GraphStore`.
pub struct SocialAnalyticsEngine {
    store: Arc<dyn GraphStore>,
    extractor: GraphExtractor,
    config: AnalyticsConfig,
    /// Fixed "now" for windowed operations; wall clock when unset
    reference_time: Option<DateTime<Utc>>,
}

impl SocialAnalyticsEngine {
    /// Create a new engine backed by the given GraphStore.
    pub fn new(store: Arc<dyn GraphStore>, config: AnalyticsConfig) -> Self {
        Self {
            extractor: GraphExtractor::new(store.clone()),
            store,
            config,
            reference_time: None,
        }
    }

    /// Pin the clock used to compute lookback windows.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    fn window_start(&self, lookback_days: u32) -> AnalyticsResult<DateTime<Utc>> {
        if lookback_days == 0 {
            return Err(AnalyticsError::invalid("lookback_days must be at least 1"));
        }
        Duration::try_days(i64::from(lookback_days))
            .and_then(|window| self.now().checked_sub_signed(window))
            .ok_or_else(|| {
                AnalyticsError::invalid(format!("lookback_days {lookback_days} is out of range"))
            })
    }
}

#[async_trait]
impl AnalyticsEngine for SocialAnalyticsEngine {
    async fn analyze_thread_depth(&self, min_depth: usize) -> AnalyticsResult<Vec<ThreadDepthStats>> {
        if min_depth < 1 {
            return Err(AnalyticsError::invalid("min_depth must be at least 1"));
        }
        info!(min_depth, "Analyzing thread depth");

        let users = self.extractor.user_directory().await?;
        let posts = self.store.query_posts(&PostFilter::default()).await?;
        let comments = self.store.query_comments(&CommentFilter::default()).await?;
        debug!(posts = posts.len(), comments = comments.len(), "Fetched thread data");

        Ok(threads::analyze_thread_depth(
            &posts,
            &comments,
            &users,
            min_depth,
            self.config.post_preview_chars,
        ))
    }

    async fn get_post_activity_timeline(&self, post_id: PostId) -> AnalyticsResult<Vec<TimelineEvent>> {
        info!(post_id, "Building post activity timeline");

        let post = self
            .store
            .query_posts(&PostFilter {
                ids: Some(BTreeSet::from([post_id])),
                ..Default::default()
            })
            .await?;
        if post.is_empty() {
            debug!(post_id, "Post not found, empty timeline");
            return Ok(Vec::new());
        }

        let users = self.extractor.user_directory().await?;
        let comments = self.store.query_comments(&CommentFilter::for_post(post_id)).await?;
        let likes = self.store.query_likes(&LikeFilter::for_post(post_id)).await?;

        Ok(threads::post_activity_timeline(post_id, &comments, &likes, &users))
    }

    async fn identify_controversial_posts(
        &self,
        min_comments: usize,
        min_stddev: f64,
    ) -> AnalyticsResult<Vec<ControversialPost>> {
        if !min_stddev.is_finite() || min_stddev < 0.0 {
            return Err(AnalyticsError::invalid(format!(
                "min_stddev must be a non-negative number, got {min_stddev}"
            )));
        }
        info!(min_comments, min_stddev, "Identifying controversial posts");

        let users = self.extractor.user_directory().await?;
        let posts = self.store.query_posts(&PostFilter::default()).await?;
        let comments = self.store.query_comments(&CommentFilter::default()).await?;

        Ok(controversy::identify_controversial_posts(
            &posts,
            &comments,
            &users,
            min_comments,
            min_stddev,
        ))
    }

    async fn get_post_engagement(&self, lookback_days: u32) -> AnalyticsResult<Vec<PostEngagement>> {
        let since = self.window_start(lookback_days)?;
        info!(lookback_days, %since, "Computing post engagement");

        let posts = self.store.query_posts(&PostFilter::since(since)).await?;
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let post_ids: BTreeSet<PostId> = posts.iter().map(|p| p.id).collect();

        let users = self.extractor.user_directory().await?;
        let likes = self
            .store
            .query_likes(&LikeFilter {
                post_ids: Some(post_ids.clone()),
                ..Default::default()
            })
            .await?;
        let comments = self
            .store
            .query_comments(&CommentFilter {
                post_ids: Some(post_ids),
                ..Default::default()
            })
            .await?;
        let follows = self.extractor.follow_graph(&FollowFilter::default()).await?;
        debug!(
            posts = posts.len(),
            likes = likes.len(),
            comments = comments.len(),
            "Fetched engagement data"
        );

        Ok(engagement::post_engagement(
            &posts, &likes, &comments, &follows, &users,
        ))
    }

    async fn get_user_engagement_summary(&self) -> AnalyticsResult<Vec<UserEngagementSummary>> {
        info!("Computing user engagement summary");

        let users = self.store.query_users(&UserFilter::default()).await?;
        let posts = self.store.query_posts(&PostFilter::default()).await?;
        let likes = self.store.query_likes(&LikeFilter::default()).await?;
        let comments = self.store.query_comments(&CommentFilter::default()).await?;
        let follows = self.extractor.follow_graph(&FollowFilter::default()).await?;

        Ok(engagement::user_engagement_summary(
            &users, &posts, &likes, &comments, &follows,
        ))
    }

    async fn get_top_contributors(
        &self,
        lookback_days: u32,
        limit: usize,
    ) -> AnalyticsResult<Vec<ContributorScore>> {
        if limit == 0 {
            return Err(AnalyticsError::invalid("limit must be at least 1"));
        }
        let since = self.window_start(lookback_days)?;
        info!(lookback_days, limit, %since, "Ranking top contributors");

        let users = self.store.query_users(&UserFilter::default()).await?;
        let posts = self.store.query_posts(&PostFilter::since(since)).await?;
        let comments = self.store.query_comments(&CommentFilter::since(since)).await?;
        let likes = self.store.query_likes(&LikeFilter::since(since)).await?;
        let follows = self.store.query_follows(&FollowFilter::since(since)).await?;

        Ok(contributors::top_contributors(
            &users, &posts, &comments, &likes, &follows, since, limit,
        ))
    }

    async fn get_follower_network(&self) -> AnalyticsResult<Vec<FollowEdge>> {
        info!("Building follower network");

        let users = self.extractor.user_directory().await?;
        let follows = self.extractor.user_follow_graph(&users).await?;
        Ok(network::follower_network(&follows, &users))
    }

    async fn identify_ghost_followers(&self) -> AnalyticsResult<Vec<GhostFollower>> {
        info!("Identifying ghost followers");

        let users = self.extractor.user_directory().await?;
        let follows = self.extractor.user_follow_graph(&users).await?;
        let posts = self.store.query_posts(&PostFilter::default()).await?;
        let likes = self.store.query_likes(&LikeFilter::default()).await?;
        let comments = self.store.query_comments(&CommentFilter::default()).await?;

        Ok(network::ghost_followers(
            &follows, &users, &posts, &likes, &comments,
        ))
    }

    async fn network_density(&self) -> AnalyticsResult<NetworkDensity> {
        let users = self.extractor.user_directory().await?;
        let follows = self.extractor.user_follow_graph(&users).await?;
        let density = network::network_density(&follows);
        info!(
            nodes = density.node_count,
            edges = density.edge_count,
            density = ?density.density,
            "Computed network density"
        );
        Ok(density)
    }
}

// ============================================================================
// Tests
// ============================================================================
