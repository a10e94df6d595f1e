//! Summary report combining every analyzer.
//!
//! Independent analyses run concurrently. The only sequential step is the
//! sample timeline, which needs the deepest thread first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AnalyticsResult;
use crate::store::PostId;

use super::engine::AnalyticsEngine;
use super::models::{
    AnalyticsConfig, ContributorScore, ControversialPost, GhostFollower, NetworkDensity,
    PostEngagement, ThreadDepthStats, TimelineEvent,
};

/// Controversial posts listed in the report
pub const REPORT_CONTROVERSIAL: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSection {
    pub lookback_days: u32,
    pub posts_in_window: usize,
    /// Highest engagement rate first; posts without a rate are left out
    pub top_posts: Vec<PostEngagement>,
    /// Lowest engagement rate first; posts without a rate are left out
    pub bottom_posts: Vec<PostEngagement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub deepest_threads: Vec<ThreadDepthStats>,
    pub most_controversial: Vec<ControversialPost>,
    /// Mean of `avg_thread_depth` over the analyzed posts
    pub avg_thread_depth: Option<f64>,
    pub sample_post_id: Option<PostId>,
    pub sample_timeline: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSection {
    pub density: NetworkDensity,
    pub ghost_followers: Vec<GhostFollower>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub engagement: EngagementSection,
    pub content: ContentSection,
    pub network: NetworkSection,
    pub top_contributors: Vec<ContributorScore>,
}

/// Run every analysis with the parameters from `config` and assemble the report.
pub async fn build_report(
    engine: &dyn AnalyticsEngine,
    config: &AnalyticsConfig,
    generated_at: DateTime<Utc>,
) -> AnalyticsResult<AnalyticsReport> {
    info!(lookback_days = config.lookback_days, "Building analytics report");

    let (engagement, threads, controversial, density, ghosts, contributors) = tokio::try_join!(
        engine.get_post_engagement(config.lookback_days),
        engine.analyze_thread_depth(config.min_thread_depth),
        engine.identify_controversial_posts(config.min_comments, config.min_stddev),
        engine.network_density(),
        engine.identify_ghost_followers(),
        engine.get_top_contributors(config.lookback_days, config.top_contributors),
    )?;

    let sample_post_id = threads.first().map(|t| t.post_id);
    let sample_timeline = match sample_post_id {
        Some(post_id) => engine.get_post_activity_timeline(post_id).await?,
        None => Vec::new(),
    };

    let n = config.report_top_n;
    Ok(AnalyticsReport {
        generated_at,
        engagement: EngagementSection {
            lookback_days: config.lookback_days,
            posts_in_window: engagement.len(),
            top_posts: top_by_rate(&engagement, n),
            bottom_posts: bottom_by_rate(&engagement, n),
        },
        content: ContentSection {
            avg_thread_depth: mean_thread_depth(&threads),
            deepest_threads: threads.into_iter().take(n).collect(),
            most_controversial: controversial.into_iter().take(REPORT_CONTROVERSIAL).collect(),
            sample_post_id,
            sample_timeline,
        },
        network: NetworkSection {
            density,
            ghost_followers: ghosts,
        },
        top_contributors: contributors,
    })
}

/// Up to `n` posts with the highest defined rate.
pub fn top_by_rate(rows: &[PostEngagement], n: usize) -> Vec<PostEngagement> {
    let mut rated = rated_rows(rows);
    rated.sort_by(|(ra, a), (rb, b)| rb.total_cmp(ra).then(a.post_id.cmp(&b.post_id)));
    rated.into_iter().take(n).map(|(_, row)| row.clone()).collect()
}

/// Up to `n` posts with the lowest defined rate.
pub fn bottom_by_rate(rows: &[PostEngagement], n: usize) -> Vec<PostEngagement> {
    let mut rated = rated_rows(rows);
    rated.sort_by(|(ra, a), (rb, b)| ra.total_cmp(rb).then(a.post_id.cmp(&b.post_id)));
    rated.into_iter().take(n).map(|(_, row)| row.clone()).collect()
}

/// Rows with a defined rate, paired with that rate
fn rated_rows(rows: &[PostEngagement]) -> Vec<(f64, &PostEngagement)> {
    rows.iter()
        .filter_map(|r| r.engagement_rate.map(|rate| (rate, r)))
        .collect()
}

pub fn mean_thread_depth(threads: &[ThreadDepthStats]) -> Option<f64> {
    if threads.is_empty() {
        return None;
    }
    let sum: f64 = threads.iter().map(|t| t.avg_thread_depth).sum();
    Some(sum / threads.len() as f64)
}
