//! Neo4j-backed GraphStore
//!
//! Expected graph layout (populated by an external ingestion layer):
//!
//! ```text
//! (:User    {id, username, display_name, email, joined_at, is_active})
//! (:Post    {id, author_id, text, media_url, created_at})
//! (:Comment {id, post_id, author_id, parent_id, text, created_at})
//! (:Like    {id, author_id, post_id, comment_id, created_at})
//! (:User)-[:FOLLOWS {created_at}]->(:User)
//! ```
//!
//! Timestamps are stored as RFC 3339 strings.

use super::models::*;
use super::traits::GraphStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::{query, Graph, Query};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builder for dynamic WHERE clauses in Cypher queries.
///
/// Conditions are collected as text with named parameters; the values are
/// bound afterwards by [`WhereBuilder::bind`].
#[derive(Default)]
struct WhereBuilder {
    conditions: Vec<String>,
    id_lists: Vec<(String, Vec<i64>)>,
    since: Option<(String, String)>,
}

impl WhereBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// `alias.field IN $param`
    fn add_id_filter(&mut self, alias: &str, field: &str, ids: Option<&BTreeSet<i64>>) -> &mut Self {
        if let Some(ids) = ids {
            let param = format!("{}_{}", alias, field);
            self.conditions
                .push(format!("{}.{} IN ${}", alias, field, param));
            self.id_lists.push((param, ids.iter().copied().collect()));
        }
        self
    }

    /// `datetime(alias.created_at) >= datetime($since)`
    fn add_since_filter(&mut self, alias: &str, since: Option<DateTime<Utc>>) -> &mut Self {
        if let Some(since) = since {
            self.conditions.push(format!(
                "datetime({}.created_at) >= datetime($since)",
                alias
            ));
            self.since = Some(("since".to_string(), since.to_rfc3339()));
        }
        self
    }

    /// Raw condition without parameters
    fn add_condition(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Build the WHERE clause (returns empty string if no conditions)
    fn build(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn bind(&self, mut q: Query) -> Query {
        for (name, ids) in &self.id_lists {
            q = q.param(name, ids.clone());
        }
        if let Some((name, value)) = &self.since {
            q = q.param(name, value.clone());
        }
        q
    }
}

fn parse_time(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .with_context(|| format!("Invalid timestamp in {}: {}", field, raw))
}

/// Client for reading the social graph out of Neo4j
pub struct Neo4jGraphStore {
    graph: Arc<Graph>,
}

impl Neo4jGraphStore {
    /// Connect to Neo4j
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    async fn rows(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn query_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut wb = WhereBuilder::new();
        wb.add_id_filter("u", "id", filter.ids.as_ref());
        let cypher = format!(
            r#"
            MATCH (u:User)
            {}
            RETURN u.id AS id, u.username AS username, u.display_name AS display_name,
                   u.email AS email, u.joined_at AS joined_at, u.is_active AS is_active
            ORDER BY u.id
            "#,
            wb.build()
        );

        let mut users = Vec::new();
        for row in self.rows(wb.bind(query(&cypher))).await? {
            users.push(User {
                id: row.get("id")?,
                username: row.get("username")?,
                display_name: row.get("display_name").unwrap_or_default(),
                email: row.get("email").ok(),
                joined_at: parse_time(&row.get::<String>("joined_at")?, "User.joined_at")?,
                is_active: row.get("is_active").unwrap_or(true),
            });
        }
        debug!(count = users.len(), "Fetched users from Neo4j");
        Ok(users)
    }

    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let mut wb = WhereBuilder::new();
        wb.add_id_filter("p", "id", filter.ids.as_ref())
            .add_id_filter("p", "author_id", filter.author_ids.as_ref())
            .add_since_filter("p", filter.created_since);
        let cypher = format!(
            r#"
            MATCH (p:Post)
            {}
            RETURN p.id AS id, p.author_id AS author_id, p.text AS text,
                   p.media_url AS media_url, p.created_at AS created_at
            ORDER BY p.id
            "#,
            wb.build()
        );

        let mut posts = Vec::new();
        for row in self.rows(wb.bind(query(&cypher))).await? {
            posts.push(Post {
                id: row.get("id")?,
                author_id: row.get("author_id")?,
                text: row.get("text").unwrap_or_default(),
                media_url: row.get("media_url").ok(),
                created_at: parse_time(&row.get::<String>("created_at")?, "Post.created_at")?,
            });
        }
        debug!(count = posts.len(), "Fetched posts from Neo4j");
        Ok(posts)
    }

    async fn query_comments(&self, filter: &CommentFilter) -> Result<Vec<Comment>> {
        let mut wb = WhereBuilder::new();
        wb.add_id_filter("c", "post_id", filter.post_ids.as_ref())
            .add_since_filter("c", filter.created_since);
        let cypher = format!(
            r#"
            MATCH (c:Comment)
            {}
            RETURN c.id AS id, c.post_id AS post_id, c.author_id AS author_id,
                   c.parent_id AS parent_id, c.text AS text, c.created_at AS created_at
            ORDER BY c.id
            "#,
            wb.build()
        );

        let mut comments = Vec::new();
        for row in self.rows(wb.bind(query(&cypher))).await? {
            comments.push(Comment {
                id: row.get("id")?,
                post_id: row.get("post_id")?,
                author_id: row.get("author_id")?,
                parent_id: row
                    .get::<Option<i64>>("parent_id")
                    .context("Comment.parent_id")?,
                text: row.get("text")?,
                created_at: parse_time(
                    &row.get::<String>("created_at")?,
                    "Comment.created_at",
                )?,
            });
        }
        debug!(count = comments.len(), "Fetched comments from Neo4j");
        Ok(comments)
    }

    async fn query_likes(&self, filter: &LikeFilter) -> Result<Vec<Like>> {
        let mut wb = WhereBuilder::new();
        if filter.post_ids.is_some() {
            wb.add_condition("l.comment_id IS NULL");
        }
        wb.add_id_filter("l", "post_id", filter.post_ids.as_ref())
            .add_since_filter("l", filter.created_since);
        let cypher = format!(
            r#"
            MATCH (l:Like)
            {}
            RETURN l.id AS id, l.author_id AS author_id, l.post_id AS post_id,
                   l.comment_id AS comment_id, l.created_at AS created_at
            ORDER BY l.id
            "#,
            wb.build()
        );

        let mut likes = Vec::new();
        for row in self.rows(wb.bind(query(&cypher))).await? {
            let id: i64 = row.get("id")?;
            let target = match (
                row.get::<i64>("post_id").ok(),
                row.get::<i64>("comment_id").ok(),
            ) {
                (Some(post_id), None) => LikeTarget::Post(post_id),
                (None, Some(comment_id)) => LikeTarget::Comment(comment_id),
                _ => {
                    warn!(like_id = id, "Like without exactly one target, skipping");
                    continue;
                }
            };
            likes.push(Like {
                id,
                author_id: row.get("author_id")?,
                target,
                created_at: parse_time(&row.get::<String>("created_at")?, "Like.created_at")?,
            });
        }
        debug!(count = likes.len(), "Fetched likes from Neo4j");
        Ok(likes)
    }

    async fn query_follows(&self, filter: &FollowFilter) -> Result<Vec<Follow>> {
        let mut wb = WhereBuilder::new();
        wb.add_since_filter("f", filter.created_since);
        let cypher = format!(
            r#"
            MATCH (a:User)-[f:FOLLOWS]->(b:User)
            {}
            RETURN a.id AS follower_id, b.id AS followee_id, f.created_at AS created_at
            "#,
            wb.build()
        );

        let mut follows = Vec::new();
        for row in self.rows(wb.bind(query(&cypher))).await? {
            follows.push(Follow {
                follower_id: row.get("follower_id")?,
                followee_id: row.get("followee_id")?,
                created_at: parse_time(
                    &row.get::<String>("created_at")?,
                    "FOLLOWS.created_at",
                )?,
            });
        }
        debug!(count = follows.len(), "Fetched follows from Neo4j");
        Ok(follows)
    }

    async fn health_check(&self) -> Result<()> {
        self.rows(query("RETURN 1 AS ok"))
            .await
            .context("Neo4j health check failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_where_builder_empty() {
        let wb = WhereBuilder::new();
        assert_eq!(wb.build(), "");
    }

    #[test]
    fn test_where_builder_combines_conditions() {
        let mut wb = WhereBuilder::new();
        let ids = BTreeSet::from([2, 1]);
        wb.add_id_filter("p", "author_id", Some(&ids))
            .add_since_filter("p", Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(
            wb.build(),
            "WHERE p.author_id IN $p_author_id AND datetime(p.created_at) >= datetime($since)"
        );
        assert_eq!(wb.id_lists[0], ("p_author_id".to_string(), vec![1, 2]));
        assert_eq!(wb.since.as_ref().unwrap().1, "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_where_builder_skips_absent_filters() {
        let mut wb = WhereBuilder::new();
        wb.add_id_filter("u", "id", None).add_since_filter("u", None);
        assert_eq!(wb.build(), "");
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("yesterday", "Post.created_at").is_err());
        assert!(parse_time("2024-01-01T00:00:00Z", "Post.created_at").is_ok());
    }
}
