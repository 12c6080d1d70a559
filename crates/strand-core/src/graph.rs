//! Graph store trait definition

use crate::error::{Error, Result};
use crate::node::{NewNode, Node, NodeId, NodeUpdate};
use crate::query::{NodeQuery, RelationshipQuery};
use crate::relationship::{
    Direction, NewRelationship, Relationship, RelationshipId, RelationshipUpdate,
};
use crate::vector::{ScoredNode, VectorQuery};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whole-graph snapshot: every node and relationship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_relationships(mut self, relationships: Vec<Relationship>) -> Self {
        self.relationships = relationships;
        self
    }
}

/// Aggregate counts over the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
    pub node_type_counts: BTreeMap<String, usize>,
    pub relationship_type_counts: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn compute<'a>(
        nodes: impl IntoIterator<Item = &'a Node>,
        relationships: impl IntoIterator<Item = &'a Relationship>,
    ) -> Self {
        let mut stats = Self::default();
        for node in nodes {
            stats.node_count += 1;
            *stats.node_type_counts.entry(node.node_type.clone()).or_default() += 1;
        }
        for relationship in relationships {
            stats.relationship_count += 1;
            *stats
                .relationship_type_counts
                .entry(relationship.relationship_type.clone())
                .or_default() += 1;
        }
        stats
    }
}

/// An input rejected from a batch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRejection {
    /// Position of the input in the submitted batch
    pub index: usize,
    pub reason: String,
}

/// Result of a best-effort batch: what was stored and what was not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub created: Vec<T>,
    pub rejected: Vec<BatchRejection>,
}

impl<T> BatchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Started/stopped flag shared by store implementations
#[derive(Debug, Default)]
pub struct Lifecycle {
    ready: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Fail with `NotInitialized` unless started
    pub fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

/// Main trait for graph store operations
///
/// All storage backends implement this trait. Traversal, path finding
/// and snapshot I/O are built on top of it.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Start the store. Every other operation fails before this.
    async fn initialize(&self) -> Result<()>;

    /// Stop the store, flushing anything pending
    async fn shutdown(&self) -> Result<()>;

    fn is_initialized(&self) -> bool;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new node
    async fn create_node(&self, input: NewNode) -> Result<Node>;

    /// Create several nodes; nothing is stored if any input is invalid
    async fn create_nodes(&self, inputs: Vec<NewNode>) -> Result<Vec<Node>>;

    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>>;

    /// Apply a partial update; `None` when the node does not exist
    async fn update_node(&self, id: &NodeId, update: NodeUpdate) -> Result<Option<Node>>;

    /// Delete a node and every relationship touching it
    async fn delete_node(&self, id: &NodeId) -> Result<bool>;

    async fn query_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>>;

    /// All nodes in store order
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.query_nodes(&NodeQuery::default()).await
    }

    /// Insert complete records, keeping their ids and timestamps.
    /// Existing records with the same id are overwritten.
    async fn restore_nodes(&self, nodes: Vec<Node>) -> Result<usize>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a relationship; both endpoints must exist
    async fn create_relationship(&self, input: NewRelationship) -> Result<Relationship>;

    /// Create the valid relationships of a batch and report the rest
    async fn create_relationships(
        &self,
        inputs: Vec<NewRelationship>,
    ) -> Result<BatchOutcome<Relationship>>;

    async fn get_relationship(&self, id: &RelationshipId) -> Result<Option<Relationship>>;

    async fn update_relationship(
        &self,
        id: &RelationshipId,
        update: RelationshipUpdate,
    ) -> Result<Option<Relationship>>;

    async fn delete_relationship(&self, id: &RelationshipId) -> Result<bool>;

    async fn query_relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>>;

    /// All relationships in store order
    async fn list_relationships(&self) -> Result<Vec<Relationship>> {
        self.query_relationships(&RelationshipQuery::default()).await
    }

    /// Insert complete records whose endpoints exist; report the others
    async fn restore_relationships(
        &self,
        relationships: Vec<Relationship>,
    ) -> Result<BatchOutcome<Relationship>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Neighborhood
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_outgoing_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        let query = RelationshipQuery::new().from_node(*node_id).with_types(types);
        self.query_relationships(&query).await
    }

    async fn get_incoming_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        let query = RelationshipQuery::new().to_node(*node_id).with_types(types);
        self.query_relationships(&query).await
    }

    /// Outgoing followed by incoming. Self-loops appear once.
    async fn get_all_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        let mut relationships = self.get_outgoing_relationships(node_id, types).await?;
        let incoming = self.get_incoming_relationships(node_id, types).await?;
        relationships.extend(
            incoming
                .into_iter()
                .filter(|r| r.source_node_id != *node_id),
        );
        Ok(relationships)
    }

    /// Relationships touching `node_id` in the given direction
    async fn get_relationships(
        &self,
        node_id: &NodeId,
        direction: Direction,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        match direction {
            Direction::Outgoing => self.get_outgoing_relationships(node_id, types).await,
            Direction::Incoming => self.get_incoming_relationships(node_id, types).await,
            Direction::Both => self.get_all_relationships(node_id, types).await,
        }
    }

    /// Distinct neighbors of a node, in first-seen order
    async fn get_related_nodes(
        &self,
        node_id: &NodeId,
        relationship_types: &[String],
        node_types: &[String],
        direction: Direction,
    ) -> Result<Vec<Node>> {
        let relationships = self
            .get_relationships(node_id, direction, relationship_types)
            .await?;

        let mut seen = HashSet::new();
        let neighbor_ids: Vec<NodeId> = relationships
            .iter()
            .map(|r| match direction {
                Direction::Outgoing => r.target_node_id,
                Direction::Incoming => r.source_node_id,
                Direction::Both => r.other_end(node_id),
            })
            .filter(|id| seen.insert(*id))
            .collect();

        let mut nodes = Vec::with_capacity(neighbor_ids.len());
        for id in &neighbor_ids {
            if let Some(node) = self.get_node(id).await? {
                if node_types.is_empty() || node_types.contains(&node.node_type) {
                    nodes.push(node);
                }
            }
        }
        Ok(nodes)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn get_graph_stats(&self) -> Result<GraphStats> {
        let nodes = self.list_nodes().await?;
        let relationships = self.list_relationships().await?;
        Ok(GraphStats::compute(&nodes, &relationships))
    }

    /// Remove every node and relationship. Requires `confirm`.
    async fn clear_graph(&self, confirm: bool) -> Result<bool>;

    /// Read the entire graph
    async fn read_graph(&self) -> Result<Graph> {
        let nodes = self.list_nodes().await?;
        let relationships = self.list_relationships().await?;
        Ok(Graph {
            nodes,
            relationships,
        })
    }

    /// Rank nodes carrying an embedding by cosine similarity
    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ScoredNode>>;
}

/// Reject `clear_graph` calls without explicit confirmation
pub fn require_clear_confirmation(confirm: bool) -> Result<()> {
    if confirm {
        Ok(())
    } else {
        Err(Error::Precondition(
            "clear_graph requires explicit confirmation".to_string(),
        ))
    }
}
