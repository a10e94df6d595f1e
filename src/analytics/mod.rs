//! Social-graph analytics.
//!
//! Derives thread, controversy, engagement, contributor and follow-network
//! metrics from a snapshot read through the [`GraphStore`](crate::store::GraphStore)
//! trait.
//!
//! ## Architecture
//!
//! ```text
//! GraphStore ──► extraction ──► UserDirectory / FollowGraph / CommentForest
//!                                        │
//!                      threads · controversy · engagement
//!                         contributors · network
//!                                        │
//!                                  result records
//!                                        │
//!                      AnalyticsEngine (validate → fetch → compute)
//!                                        │
//!                                      report
//! ```
//!
//! ## Modules
//!
//! - [`models`]: Output records, `FollowGraph`, `AnalyticsConfig`
//! - [`extraction`]: Store → lookup structures
//! - [`threads`]: Thread depth and post activity timelines
//! - [`controversy`]: Comment-length dispersion scoring
//! - [`engagement`]: Per-post and per-user engagement rates
//! - [`contributors`]: Windowed weighted activity ranking
//! - [`network`]: Follow edges, ghost followers, density
//! - [`engine`]: `AnalyticsEngine` trait and `SocialAnalyticsEngine`
//! - [`report`]: Combined summary
//! - [`mock`]: `MockAnalyticsEngine` for testing (cfg(test) only)

pub mod contributors;
pub mod controversy;
pub mod engagement;
pub mod engine;
pub mod extraction;
pub mod models;
pub mod network;
pub mod report;
pub mod threads;

#[cfg(test)]
pub mod mock;

// Re-export primary types for convenience
pub use engine::{AnalyticsEngine, SocialAnalyticsEngine};
pub use extraction::{CommentForest, GraphExtractor, UserDirectory};
pub use models::{
    percent_of, ActivityKind, AnalyticsConfig, ContributorScore, ControversialPost, FollowEdge,
    FollowGraph, GhostFollower, NetworkDensity, PostEngagement, ThreadDepthStats, TimelineEvent,
    UserEngagementSummary,
};
pub use report::{build_report, AnalyticsReport};
