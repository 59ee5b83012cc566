//! Neo4j client for the social graph

use super::models::*;
use crate::vk::models::{Identity, Sex};
use anyhow::{Context, Result};
use neo4rs::{query, BoltType, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations.
///
/// Owns the bolt connection pool; connections are returned to the pool after
/// every query and the pool is closed when the client is dropped.
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Collects `SET` assignments and `REMOVE` targets for a MERGE statement,
/// so absent optional fields are removed instead of stored as empty strings.
#[derive(Default)]
struct PropertyWriter {
    sets: Vec<String>,
    removes: Vec<String>,
    params: Vec<(&'static str, BoltType)>,
}

impl PropertyWriter {
    fn set(&mut self, alias: &str, key: &'static str, value: impl Into<BoltType>) -> &mut Self {
        self.sets.push(format!("{alias}.{key} = ${key}"));
        self.params.push((key, value.into()));
        self
    }

    fn set_opt<T: Into<BoltType>>(
        &mut self,
        alias: &str,
        key: &'static str,
        value: Option<T>,
    ) -> &mut Self {
        match value {
            Some(v) => self.set(alias, key, v),
            None => {
                self.removes.push(format!("{alias}.{key}"));
                self
            }
        }
    }

    /// Render the trailing `SET ... REMOVE ...` clauses
    fn clauses(&self) -> String {
        let mut out = String::new();
        if !self.sets.is_empty() {
            out.push_str(&format!("SET {}", self.sets.join(", ")));
        }
        if !self.removes.is_empty() {
            out.push_str(&format!(" REMOVE {}", self.removes.join(", ")));
        }
        out
    }

    fn bind(self, mut q: Query) -> Query {
        for (key, value) in self.params {
            q = q.param(key, value);
        }
        q
    }
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        graph
            .run(query("RETURN 1"))
            .await
            .with_context(|| format!("Neo4j is not reachable at {}", uri))?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize uniqueness constraints on node identities
    async fn init_schema(&self) -> Result<()> {
        let constraints = [
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT group_id IF NOT EXISTS FOR (g:Group) REQUIRE g.id IS UNIQUE",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query and collect its rows
    async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a query returning a single integer column
    async fn scalar(&self, q: Query, column: &str) -> Result<i64> {
        let rows = self.execute_with_params(q).await?;
        match rows.first() {
            Some(row) => Ok(row.get::<i64>(column)?),
            None => Ok(0),
        }
    }

    // ========================================================================
    // Node operations
    // ========================================================================

    /// Create or overwrite a user node (MERGE on id, last write wins)
    pub async fn upsert_user(&self, user: &UserNode) -> Result<()> {
        let mut props = PropertyWriter::default();
        props
            .set("u", "name", user.name.clone())
            .set("u", "sex", user.sex.as_str().to_string())
            .set_opt("u", "screen_name", user.screen_name.clone())
            .set_opt("u", "home_town", user.home_town.clone())
            .set_opt("u", "about", user.about.clone())
            .set_opt("u", "photo_max", user.photo_max.clone())
            .set_opt("u", "followers_count", user.followers_count);

        let cypher = format!("MERGE (u:User {{id: $id}}) {}", props.clauses());
        let q = props.bind(query(&cypher).param("id", user.id.as_i64()));

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to upsert user {}", user.id))?;
        Ok(())
    }

    /// Create or overwrite a group node (MERGE on id, last write wins)
    pub async fn upsert_group(&self, group: &GroupNode) -> Result<()> {
        let mut props = PropertyWriter::default();
        props
            .set("g", "name", group.name.clone())
            .set_opt("g", "screen_name", group.screen_name.clone());

        let cypher = format!("MERGE (g:Group {{id: $id}}) {}", props.clauses());
        let q = props.bind(query(&cypher).param("id", group.id.as_i64()));

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to upsert group {}", group.id))?;
        Ok(())
    }

    /// Get a user node by identity
    pub async fn get_user(&self, id: Identity) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {id: $id}) RETURN u").param("id", id.as_i64());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("u")?;
            Ok(Some(self.node_to_user(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Get a group node by identity
    pub async fn get_group(&self, id: Identity) -> Result<Option<GroupNode>> {
        let q = query("MATCH (g:Group {id: $id}) RETURN g").param("id", id.as_i64());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("g")?;
            Ok(Some(GroupNode {
                id: Identity(node.get::<i64>("id")?),
                name: node.get("name")?,
                screen_name: node.get("screen_name").ok(),
            }))
        } else {
            Ok(None)
        }
    }

    /// Helper to convert Neo4j node to UserNode
    fn node_to_user(&self, node: &neo4rs::Node) -> Result<UserNode> {
        Ok(UserNode {
            id: Identity(node.get::<i64>("id")?),
            screen_name: node.get("screen_name").ok(),
            name: node.get("name")?,
            sex: node
                .get::<String>("sex")
                .ok()
                .and_then(|s| s.parse::<Sex>().ok())
                .unwrap_or_default(),
            home_town: node.get("home_town").ok(),
            about: node.get("about").ok(),
            photo_max: node.get("photo_max").ok(),
            followers_count: node.get("followers_count").ok(),
        })
    }

    // ========================================================================
    // Relationship operations
    // ========================================================================

    /// MERGE a relationship between two existing nodes.
    ///
    /// Returns `false` when either endpoint is missing (MATCH yields no row, so
    /// nothing is merged) or for a FOLLOW from a user to itself. Users and
    /// groups are separate id spaces, so SUBSCRIBE with equal ids is valid.
    pub async fn upsert_edge(&self, kind: EdgeKind, from: Identity, to: Identity) -> Result<bool> {
        if kind == EdgeKind::Follow && from == to {
            return Ok(false);
        }

        let cypher = format!(
            r#"
            MATCH (a:User {{id: $from}}), (b:{target} {{id: $to}})
            MERGE (a)-[:{label}]->(b)
            RETURN count(*) AS linked
            "#,
            target = kind.target_label(),
            label = kind.label(),
        );
        let q = query(&cypher)
            .param("from", from.as_i64())
            .param("to", to.as_i64());

        let linked = self
            .scalar(q, "linked")
            .await
            .with_context(|| format!("Failed to upsert {} {} -> {}", kind.label(), from, to))?;
        Ok(linked > 0)
    }

    // ========================================================================
    // Aggregate queries
    // ========================================================================

    /// Count nodes with the given label
    async fn count_label(&self, label: &str) -> Result<i64> {
        let cypher = format!("MATCH (n:{label}) RETURN count(n) AS total");
        self.scalar(query(&cypher), "total").await
    }

    /// Number of user nodes
    pub async fn count_users(&self) -> Result<i64> {
        self.count_label("User").await
    }

    /// Number of group nodes
    pub async fn count_groups(&self) -> Result<i64> {
        self.count_label("Group").await
    }

    /// Number of relationships of one kind
    pub async fn count_edges(&self, kind: EdgeKind) -> Result<i64> {
        let cypher = format!(
            "MATCH (:User)-[r:{}]->(:{}) RETURN count(r) AS total",
            kind.label(),
            kind.target_label()
        );
        self.scalar(query(&cypher), "total").await
    }

    /// Rank target nodes of `kind` by in-degree
    async fn top_by_in_degree(&self, kind: EdgeKind, limit: usize) -> Result<Vec<RankedEntry>> {
        let cypher = format!(
            r#"
            MATCH (src:User)-[:{label}]->(n:{target})
            RETURN n.id AS id, count(src) AS degree
            ORDER BY degree DESC, id ASC
            LIMIT $limit
            "#,
            label = kind.label(),
            target = kind.target_label(),
        );
        let q = query(&cypher).param("limit", limit as i64);

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| -> Result<RankedEntry> {
                Ok(RankedEntry {
                    id: Identity(row.get::<i64>("id")?),
                    count: row.get::<i64>("degree")?,
                })
            })
            .collect()
    }

    /// Users by descending FOLLOW in-degree
    pub async fn top_users_by_followers(&self, limit: usize) -> Result<Vec<RankedEntry>> {
        self.top_by_in_degree(EdgeKind::Follow, limit).await
    }

    /// Groups by descending SUBSCRIBE in-degree
    pub async fn top_groups_by_subscribers(&self, limit: usize) -> Result<Vec<RankedEntry>> {
        self.top_by_in_degree(EdgeKind::Subscribe, limit).await
    }

    /// Reciprocal FOLLOW pairs, each reported once with the smaller id first
    pub async fn mutual_followers(&self) -> Result<Vec<MutualPair>> {
        let q = query(
            r#"
            MATCH (u1:User)-[:FOLLOW]->(u2:User),
                  (u2)-[:FOLLOW]->(u1)
            WHERE u1.id < u2.id
            RETURN u1.id AS user1_id, u2.id AS user2_id
            ORDER BY user1_id, user2_id
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        rows.iter()
            .map(|row| -> Result<MutualPair> {
                Ok(MutualPair::new(
                    Identity(row.get::<i64>("user1_id")?),
                    Identity(row.get::<i64>("user2_id")?),
                ))
            })
            .collect()
    }
}
