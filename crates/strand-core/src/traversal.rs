//! Graph traversal types and algorithms

use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::limits::{validate_traversal_depth, validate_traversal_limit};
use crate::node::{Node, NodeId};
use crate::relationship::{Direction, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tokio_util::sync::CancellationToken;

/// Traversal options (follows the query builder pattern)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalOptions {
    /// Traversal direction
    #[serde(default)]
    pub direction: Direction,

    /// Filter by relationship types (empty = all types)
    #[serde(default)]
    pub relationship_types: Vec<String>,

    /// Filter by node types (empty = all types)
    #[serde(default)]
    pub node_types: Vec<String>,

    /// Maximum path length from the start node
    #[serde(default = "default_depth")]
    pub max_depth: u32,

    /// Maximum number of nodes in the result
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_depth() -> u32 {
    3
}

fn default_limit() -> usize {
    100
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Both,
            relationship_types: Vec::new(),
            node_types: Vec::new(),
            max_depth: default_depth(),
            limit: default_limit(),
        }
    }
}

impl TraversalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter_relationship_types(mut self, types: Vec<String>) -> Self {
        self.relationship_types = types;
        self
    }

    pub fn filter_node_types(mut self, types: Vec<String>) -> Self {
        self.node_types = types;
        self
    }
}

/// A single path through the graph: nodes joined by relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Ordered nodes, start first
    pub nodes: Vec<Node>,

    /// `relationships[i]` joins `nodes[i]` and `nodes[i + 1]`
    pub relationships: Vec<Relationship>,

    /// Number of hops
    pub length: usize,
}

impl GraphPath {
    /// Zero-length path holding one node
    pub fn single(node: Node) -> Self {
        Self {
            nodes: vec![node],
            relationships: Vec::new(),
            length: 0,
        }
    }

    /// Copy of this path extended by one hop
    pub fn extended(&self, relationship: Relationship, node: Node) -> Self {
        let mut path = self.clone();
        path.relationships.push(relationship);
        path.nodes.push(node);
        path.length = path.relationships.len();
        path
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }
}

/// Result of a traversal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Visited nodes in BFS order, start node first
    pub nodes: Vec<Node>,

    /// Relationships used to reach each visited node
    pub relationships: Vec<Relationship>,

    /// One path per visited node, the trivial start path first
    pub paths: Vec<GraphPath>,

    pub stats: TraversalStats,
}

/// Traversal statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub edges_examined: usize,
    pub max_depth_reached: u32,
    pub limit_reached: bool,
}

/// Breadth-first neighborhood expansion over a graph store
pub struct TraversalEngine<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    cancel: Option<CancellationToken>,
}

impl<'a, S: GraphStore + ?Sized> TraversalEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cancel: None,
        }
    }

    /// Abort the traversal with `Error::Cancelled` once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Expand the neighborhood of `start`
    pub async fn traverse(&self, start: &NodeId, options: &TraversalOptions) -> Result<TraversalResult> {
        validate_traversal_depth(options.max_depth)?;
        validate_traversal_limit(options.limit)?;

        tracing::debug!(
            "Executing traversal: start={}, depth={}, limit={}, direction={:?}",
            start,
            options.max_depth,
            options.limit,
            options.direction
        );

        let start_node = self
            .store
            .get_node(start)
            .await?
            .ok_or_else(|| Error::NodeNotFound(start.to_string()))?;

        let mut result = TraversalResult::default();
        if options.limit == 0 {
            result.stats.limit_reached = true;
            return Ok(result);
        }

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, u32, GraphPath)> = VecDeque::new();

        visited.insert(start_node.id);
        let start_path = GraphPath::single(start_node.clone());
        result.nodes.push(start_node);
        result.paths.push(start_path.clone());
        queue.push_back((*start, 0, start_path));

        'bfs: while let Some((current, depth, path)) = queue.pop_front() {
            self.check_cancelled()?;
            result.stats.nodes_visited += 1;
            result.stats.max_depth_reached = result.stats.max_depth_reached.max(depth);

            if depth >= options.max_depth {
                continue;
            }

            let relationships = self
                .store
                .get_relationships(&current, options.direction, &options.relationship_types)
                .await?;

            for relationship in relationships {
                result.stats.edges_examined += 1;

                let next = relationship.other_end(&current);
                if visited.contains(&next) {
                    continue;
                }

                let Some(neighbor) = self.store.get_node(&next).await? else {
                    continue;
                };

                // Apply node type filter
                if !options.node_types.is_empty() && !options.node_types.contains(&neighbor.node_type) {
                    continue;
                }

                if result.nodes.len() >= options.limit {
                    result.stats.limit_reached = true;
                    break 'bfs;
                }

                visited.insert(next);
                let next_path = path.extended(relationship.clone(), neighbor.clone());
                result.nodes.push(neighbor);
                result.relationships.push(relationship);
                result.paths.push(next_path.clone());
                queue.push_back((next, depth + 1, next_path));
            }
        }

        tracing::debug!(
            "Traversal visited {} nodes, examined {} edges",
            result.stats.nodes_visited,
            result.stats.edges_examined
        );

        Ok(result)
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}
