//! Mock analytics engine for testing consumers.
//!
//! Returns pre-configured results without performing any computation or
//! store access.

use anyhow::anyhow;
use async_trait::async_trait;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::store::PostId;

use super::engine::AnalyticsEngine;
use super::models::{
    ContributorScore, ControversialPost, FollowEdge, GhostFollower, NetworkDensity,
    PostEngagement, ThreadDepthStats, TimelineEvent, UserEngagementSummary,
};

/// Mock implementation of `AnalyticsEngine` for testing.
///
/// Returns empty results unless configured otherwise.
#[derive(Default)]
pub struct MockAnalyticsEngine {
    engagement: Vec<PostEngagement>,
    threads: Vec<ThreadDepthStats>,
    fail: bool,
}

impl MockAnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engagement(mut self, rows: Vec<PostEngagement>) -> Self {
        self.engagement = rows;
        self
    }

    pub fn with_threads(mut self, rows: Vec<ThreadDepthStats>) -> Self {
        self.threads = rows;
        self
    }

    /// Every call returns a store error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check(&self) -> AnalyticsResult<()> {
        if self.fail {
            Err(AnalyticsError::Store(anyhow!("mock store failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AnalyticsEngine for MockAnalyticsEngine {
    async fn analyze_thread_depth(&self, _min_depth: usize) -> AnalyticsResult<Vec<ThreadDepthStats>> {
        self.check()?;
        Ok(self.threads.clone())
    }

    async fn get_post_activity_timeline(&self, _post_id: PostId) -> AnalyticsResult<Vec<TimelineEvent>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn identify_controversial_posts(
        &self,
        _min_comments: usize,
        _min_stddev: f64,
    ) -> AnalyticsResult<Vec<ControversialPost>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_post_engagement(&self, _lookback_days: u32) -> AnalyticsResult<Vec<PostEngagement>> {
        self.check()?;
        Ok(self.engagement.clone())
    }

    async fn get_user_engagement_summary(&self) -> AnalyticsResult<Vec<UserEngagementSummary>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_top_contributors(
        &self,
        _lookback_days: u32,
        _limit: usize,
    ) -> AnalyticsResult<Vec<ContributorScore>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_follower_network(&self) -> AnalyticsResult<Vec<FollowEdge>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn identify_ghost_followers(&self) -> AnalyticsResult<Vec<GhostFollower>> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn network_density(&self) -> AnalyticsResult<NetworkDensity> {
        self.check()?;
        Ok(NetworkDensity {
            node_count: 0,
            edge_count: 0,
            density: None,
        })
    }
}
