//! Social Analytics
//!
//! Derived metrics over a social graph of users, posts, threaded comments,
//! likes and follows:
//! - Comment-thread depth and per-post activity timelines
//! - Controversy scoring from comment-length dispersion
//! - Engagement rates with dense ranking
//! - Windowed contributor ranking
//! - Follow-network density and ghost followers
//!
//! Data is read through the [`store::GraphStore`] trait, backed by a JSON
//! snapshot or Neo4j.
//!
//! ```
//! use std::sync::Arc;
//! use social_analytics::analytics::{AnalyticsConfig, AnalyticsEngine, SocialAnalyticsEngine};
//! use social_analytics::store::{InMemoryGraphStore, Snapshot};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryGraphStore::new(Snapshot::new()));
//! let engine = SocialAnalyticsEngine::new(store, AnalyticsConfig::default());
//! let density = engine.network_density().await.unwrap();
//! assert_eq!(density.density, None);
//! # });
//! ```

pub mod analytics;
pub mod error;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use analytics::AnalyticsConfig;
use store::{GraphStore, InMemoryGraphStore, Neo4jGraphStore};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub store: StoreYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub analytics: AnalyticsConfig,
}

/// Store configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreYamlConfig {
    pub backend: StoreBackend,
    pub snapshot_path: String,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Snapshot,
            snapshot_path: "snapshot.json".into(),
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "neo4j".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Snapshot,
    Neo4j,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "neo4j" => Ok(Self::Neo4j),
            other => bail!("Unknown store backend '{}' (expected snapshot or neo4j)", other),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub snapshot_path: PathBuf,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);

        // 2. Build Config with env var overrides
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse().context("Invalid STORE_BACKEND")?,
            Err(_) => yaml.store.backend,
        };
        let mut analytics = yaml.analytics;
        if let Ok(days) = std::env::var("ANALYTICS_LOOKBACK_DAYS") {
            analytics.lookback_days = days
                .parse()
                .with_context(|| format!("Invalid ANALYTICS_LOOKBACK_DAYS '{}'", days))?;
        }

        Ok(Self {
            backend,
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or(yaml.store.snapshot_path)
                .into(),
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            analytics,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    /// Open the configured store.
    pub async fn open_store(&self) -> Result<Arc<dyn GraphStore>> {
        match self.backend {
            StoreBackend::Snapshot => {
                let store = InMemoryGraphStore::from_json_file(&self.snapshot_path)?;
                Ok(Arc::new(store))
            }
            StoreBackend::Neo4j => {
                let store =
                    Neo4jGraphStore::new(&self.neo4j_uri, &self.neo4j_user, &self.neo4j_password)
                        .await?;
                Ok(Arc::new(store))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
store:
  backend: neo4j
  snapshot_path: /data/social.json

neo4j:
  uri: bolt://db:7687
  user: admin
  password: secret

analytics:
  lookback_days: 14
  min_comments: 3
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Neo4j);
        assert_eq!(config.store.snapshot_path, "/data/social.json");
        assert_eq!(config.neo4j.uri, "bolt://db:7687");
        assert_eq!(config.analytics.lookback_days, 14);
        assert_eq!(config.analytics.min_comments, 3);
        // Unset analytics fields keep their defaults
        assert_eq!(config.analytics.min_thread_depth, 2);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Snapshot);
        assert_eq!(config.store.snapshot_path, "snapshot.json");
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.analytics, AnalyticsConfig::default());
    }

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("Neo4j".parse::<StoreBackend>().unwrap(), StoreBackend::Neo4j);
        assert_eq!("snapshot".parse::<StoreBackend>().unwrap(), StoreBackend::Snapshot);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    /// Combined test for YAML file loading and env var overrides.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "STORE_BACKEND",
                "SNAPSHOT_PATH",
                "NEO4J_URI",
                "NEO4J_USER",
                "NEO4J_PASSWORD",
                "ANALYTICS_LOOKBACK_DAYS",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
store:
  snapshot_path: /yaml/snapshot.json
neo4j:
  uri: bolt://yaml-host:7687
  user: yaml-user
analytics:
  lookback_days: 7
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.backend, StoreBackend::Snapshot);
        assert_eq!(config.snapshot_path, PathBuf::from("/yaml/snapshot.json"));
        assert_eq!(config.neo4j_uri, "bolt://yaml-host:7687");
        assert_eq!(config.analytics.lookback_days, 7);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("STORE_BACKEND", "neo4j");
        std::env::set_var("NEO4J_URI", "bolt://env-host:7687");
        std::env::set_var("ANALYTICS_LOOKBACK_DAYS", "90");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.backend, StoreBackend::Neo4j);
        assert_eq!(config.neo4j_uri, "bolt://env-host:7687");
        assert_eq!(config.analytics.lookback_days, 90);
        // YAML value still used where no env override
        assert_eq!(config.neo4j_user, "yaml-user");

        // --- Phase 3: Malformed env override is an error ---
        std::env::set_var("ANALYTICS_LOOKBACK_DAYS", "a month");
        assert!(Config::from_yaml_and_env(Some(&file_path)).is_err());

        clear_env();

        // --- Phase 4: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-social-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.backend, StoreBackend::Snapshot);
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.analytics.lookback_days, 30);
    }

    #[tokio::test]
    async fn test_open_snapshot_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"users": [], "posts": []}"#).unwrap();

        let config = Config {
            backend: StoreBackend::Snapshot,
            snapshot_path: path,
            neo4j_uri: String::new(),
            neo4j_user: String::new(),
            neo4j_password: String::new(),
            analytics: AnalyticsConfig::default(),
        };
        let store = config.open_store().await.unwrap();
        store.health_check().await.unwrap();
        assert!(store
            .query_users(&crate::store::UserFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
