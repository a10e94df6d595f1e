//! Social Analytics - command-line front end
//!
//! Runs one analysis against the configured store and prints the result as JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use social_analytics::analytics::{build_report, AnalyticsEngine, SocialAnalyticsEngine};
use social_analytics::{Config, StoreBackend};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "social-analytics")]
#[command(about = "Derived analytics over a social graph")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read from this JSON snapshot instead of the configured store
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Thread depth statistics per post
    Threads {
        /// Minimum depth of the deepest comment
        #[arg(long)]
        min_depth: Option<usize>,
    },

    /// Comment and like activity on one post
    Timeline {
        /// Post ID
        post_id: i64,
    },

    /// Posts with high comment-length variability
    Controversial {
        #[arg(long)]
        min_comments: Option<usize>,
        #[arg(long)]
        min_stddev: Option<f64>,
    },

    /// Engagement rate of recent posts
    Engagement {
        /// Lookback window in days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Lifetime engagement summary per user
    Users,

    /// Most active users over the lookback window
    Contributors {
        #[arg(short, long)]
        days: Option<u32>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Follow edges with usernames
    Network,

    /// Users following accounts they never interacted with
    Ghosts,

    /// Follow-network density
    Density,

    /// Combined summary of every analysis
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so stdout stays valid JSON)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,social_analytics=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(path) = cli.snapshot {
        config.backend = StoreBackend::Snapshot;
        config.snapshot_path = path;
    }

    let store = config
        .open_store()
        .await
        .with_context(|| format!("Failed to open {:?} store", config.backend))?;
    tracing::info!(backend = ?config.backend, "Store ready");

    let defaults = config.analytics.clone();
    let engine = SocialAnalyticsEngine::new(store, config.analytics.clone());

    match cli.command {
        Commands::Threads { min_depth } => {
            let rows = engine
                .analyze_thread_depth(min_depth.unwrap_or(defaults.min_thread_depth))
                .await?;
            print_json(&rows, cli.pretty)
        }
        Commands::Timeline { post_id } => {
            print_json(&engine.get_post_activity_timeline(post_id).await?, cli.pretty)
        }
        Commands::Controversial {
            min_comments,
            min_stddev,
        } => {
            let rows = engine
                .identify_controversial_posts(
                    min_comments.unwrap_or(defaults.min_comments),
                    min_stddev.unwrap_or(defaults.min_stddev),
                )
                .await?;
            print_json(&rows, cli.pretty)
        }
        Commands::Engagement { days } => {
            let rows = engine
                .get_post_engagement(days.unwrap_or(defaults.lookback_days))
                .await?;
            print_json(&rows, cli.pretty)
        }
        Commands::Users => print_json(&engine.get_user_engagement_summary().await?, cli.pretty),
        Commands::Contributors { days, limit } => {
            let rows = engine
                .get_top_contributors(
                    days.unwrap_or(defaults.lookback_days),
                    limit.unwrap_or(defaults.top_contributors),
                )
                .await?;
            print_json(&rows, cli.pretty)
        }
        Commands::Network => print_json(&engine.get_follower_network().await?, cli.pretty),
        Commands::Ghosts => print_json(&engine.identify_ghost_followers().await?, cli.pretty),
        Commands::Density => print_json(&engine.network_density().await?, cli.pretty),
        Commands::Report => {
            let report = build_report(&engine, &defaults, Utc::now()).await?;
            print_json(&report, cli.pretty)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
