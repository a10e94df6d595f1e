//! Integration tests for the Neo4j store
//!
//! These tests require Neo4j to be running and skip otherwise.
//! Run with: cargo test --test integration_tests

use chrono::{Duration, Utc};
use social_analytics::analytics::{
    ActivityKind, AnalyticsConfig, AnalyticsEngine, SocialAnalyticsEngine,
};
use social_analytics::store::{
    CommentFilter, GraphStore, LikeFilter, Neo4jGraphStore, PostFilter, UserFilter,
};
use std::collections::BTreeSet;
use std::sync::Arc;

struct Neo4jSettings {
    uri: String,
    user: String,
    password: String,
}

/// Get test configuration from environment or use defaults
fn test_settings() -> Neo4jSettings {
    Neo4jSettings {
        uri: std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".into()),
        user: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".into()),
        password: std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "neo4j".into()),
    }
}

/// Connect, or return None when Neo4j is not reachable
async fn connect() -> Option<(Neo4jGraphStore, neo4rs::Graph)> {
    let s = test_settings();
    let store = match Neo4jGraphStore::new(&s.uri, &s.user, &s.password).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Neo4j not available at {}: {}", s.uri, e);
            return None;
        }
    };
    if let Err(e) = store.health_check().await {
        eprintln!("Neo4j not healthy at {}: {}", s.uri, e);
        return None;
    }
    let raw = neo4rs::Graph::new(&s.uri, &s.user, &s.password).await.ok()?;
    Some((store, raw))
}

/// IDs unlikely to collide with existing data or concurrent runs
fn id_base() -> i64 {
    (Utc::now().timestamp_micros() % 1_000_000_000) * 1_000 + 9_000_000_000_000
}

async fn seed(graph: &neo4rs::Graph, base: i64) {
    let now = Utc::now();
    let t = |hours_ago: i64| (now - Duration::hours(hours_ago)).to_rfc3339();

    let q = neo4rs::query(
        r#"
        CREATE (a:User {id: $a, username: $a_name, display_name: 'A', joined_at: $t0, is_active: true})
        CREATE (b:User {id: $b, username: $b_name, display_name: 'B', joined_at: $t0, is_active: true})
        CREATE (p:Post {id: $p, author_id: $a, text: 'integration post', created_at: $t3})
        CREATE (:Comment {id: $c1, post_id: $p, author_id: $b, text: 'first', created_at: $t2})
        CREATE (:Comment {id: $c2, post_id: $p, author_id: $a, parent_id: $c1, text: 'reply', created_at: $t1})
        CREATE (:Like {id: $l1, author_id: $b, post_id: $p, created_at: $t1})
        CREATE (:Like {id: $l2, author_id: $a, comment_id: $c1, created_at: $t1})
        CREATE (b)-[:FOLLOWS {created_at: $t0}]->(a)
        "#,
    )
    .param("a", base + 1)
    .param("b", base + 2)
    .param("a_name", format!("it_alice_{base}"))
    .param("b_name", format!("it_bob_{base}"))
    .param("p", base + 10)
    .param("c1", base + 20)
    .param("c2", base + 21)
    .param("l1", base + 30)
    .param("l2", base + 31)
    .param("t0", t(48))
    .param("t1", t(1))
    .param("t2", t(2))
    .param("t3", t(3));
    graph.run(q).await.unwrap();
}

async fn cleanup(graph: &neo4rs::Graph, base: i64) {
    let q = neo4rs::query(
        "MATCH (n) WHERE (n:User OR n:Post OR n:Comment OR n:Like) AND n.id >= $lo AND n.id < $hi DETACH DELETE n",
    )
    .param("lo", base)
    .param("hi", base + 50);
    graph.run(q).await.unwrap();
}

#[tokio::test]
async fn test_neo4j_store_queries() {
    let Some((store, graph)) = connect().await else {
        eprintln!("Skipping test: Neo4j not available");
        return;
    };
    let base = id_base();
    seed(&graph, base).await;

    let users = store
        .query_users(&UserFilter {
            ids: Some(BTreeSet::from([base + 1, base + 2])),
        })
        .await
        .unwrap();
    assert_eq!(users.len(), 2);

    let posts = store
        .query_posts(&PostFilter {
            ids: Some(BTreeSet::from([base + 10])),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author_id, base + 1);

    let comments = store
        .query_comments(&CommentFilter::for_post(base + 10))
        .await
        .unwrap();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().any(|c| c.parent_id == Some(base + 20)));

    // Comment likes are excluded when filtering by post
    let likes = store.query_likes(&LikeFilter::for_post(base + 10)).await.unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].post_id(), Some(base + 10));

    cleanup(&graph, base).await;
}

#[tokio::test]
async fn test_neo4j_engine_timeline() {
    let Some((store, graph)) = connect().await else {
        eprintln!("Skipping test: Neo4j not available");
        return;
    };
    let base = id_base() + 50;
    seed(&graph, base).await;

    let engine = SocialAnalyticsEngine::new(Arc::new(store), AnalyticsConfig::default());
    let events = engine.get_post_activity_timeline(base + 10).await.unwrap();
    let kinds: Vec<ActivityKind> = events.iter().map(|e| e.activity_type).collect();
    assert_eq!(
        kinds,
        vec![ActivityKind::Comment, ActivityKind::Comment, ActivityKind::Like]
    );

    let threads = engine.analyze_thread_depth(2).await.unwrap();
    let ours = threads.iter().find(|t| t.post_id == base + 10).unwrap();
    assert_eq!(ours.max_thread_depth, 2);

    cleanup(&graph, base).await;
}

#[tokio::test]
async fn test_neo4j_mistyped_parent_id_is_an_error() {
    let Some((store, graph)) = connect().await else {
        eprintln!("Skipping test: Neo4j not available");
        return;
    };
    let base = id_base() + 100;
    let q = neo4rs::query(
        r#"
        CREATE (:Comment {id: $c1, post_id: $p, author_id: $a, text: 'root', created_at: $t})
        CREATE (:Comment {id: $c2, post_id: $p, author_id: $a, parent_id: 'not-an-id', text: 'reply', created_at: $t})
        "#,
    )
    .param("c1", base + 20)
    .param("c2", base + 21)
    .param("p", base + 10)
    .param("a", base + 1)
    .param("t", Utc::now().to_rfc3339());
    graph.run(q).await.unwrap();

    // A reply must never silently become a top-level comment
    let res = store.query_comments(&CommentFilter::for_post(base + 10)).await;
    assert!(res.is_err());

    cleanup(&graph, base).await;
}
