//! Path finding between two nodes
//!
//! Both searches treat relationships as undirected: a relationship
//! connects its endpoints regardless of its direction.

use crate::error::{Error, Result};
use crate::graph::GraphStore;
use crate::limits::validate_traversal_depth;
use crate::node::{Node, NodeId};
use crate::relationship::Relationship;
use crate::traversal::GraphPath;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio_util::sync::CancellationToken;

/// Default hop bound for shortest path search
pub const DEFAULT_SHORTEST_PATH_DEPTH: u32 = 5;

/// Default hop bound for all-paths search
pub const DEFAULT_ALL_PATHS_DEPTH: u32 = 3;

/// Shortest-path and all-paths search over a graph store
pub struct PathFinder<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    cancel: Option<CancellationToken>,
}

impl<'a, S: GraphStore + ?Sized> PathFinder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cancel: None,
        }
    }

    /// Abort the search with `Error::Cancelled` once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// BFS for the path with the fewest hops, at most `max_depth`
    pub async fn shortest_path(
        &self,
        start: &NodeId,
        end: &NodeId,
        relationship_types: &[String],
        max_depth: u32,
    ) -> Result<Option<GraphPath>> {
        validate_traversal_depth(max_depth)?;
        let (start_node, _) = self.resolve_endpoints(start, end).await?;

        if start == end {
            return Ok(Some(GraphPath::single(start_node)));
        }

        let mut nodes: HashMap<NodeId, Node> = HashMap::new();
        let mut parent: HashMap<NodeId, (NodeId, Relationship)> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();

        nodes.insert(*start, start_node);
        visited.insert(*start);
        queue.push_back((*start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            self.check_cancelled()?;

            if depth >= max_depth {
                continue;
            }

            for relationship in self.store.get_all_relationships(&current, relationship_types).await? {
                let next = relationship.other_end(&current);
                if visited.contains(&next) {
                    continue;
                }
                let Some(neighbor) = self.store.get_node(&next).await? else {
                    continue;
                };

                visited.insert(next);
                nodes.insert(next, neighbor);
                parent.insert(next, (current, relationship));

                if next == *end {
                    tracing::debug!("BFS found path at depth {}", depth + 1);
                    return Ok(Some(Self::reconstruct_path(start, end, &parent, &nodes)));
                }
                queue.push_back((next, depth + 1));
            }
        }

        tracing::debug!("No path from {} to {} within {} hops", start, end, max_depth);
        Ok(None)
    }

    /// Every simple path of at most `max_depth` hops, shortest first
    pub async fn all_paths(
        &self,
        start: &NodeId,
        end: &NodeId,
        relationship_types: &[String],
        max_depth: u32,
    ) -> Result<Vec<GraphPath>> {
        validate_traversal_depth(max_depth)?;
        let (start_node, _) = self.resolve_endpoints(start, end).await?;

        if start == end {
            return Ok(vec![GraphPath::single(start_node)]);
        }

        let mut adjacency: HashMap<NodeId, Vec<Relationship>> = HashMap::new();
        let mut nodes: HashMap<NodeId, Node> = HashMap::new();
        let mut paths = Vec::new();
        let mut stack = vec![GraphPath::single(start_node)];

        while let Some(path) = stack.pop() {
            self.check_cancelled()?;

            if path.length >= max_depth as usize {
                continue;
            }
            let Some(current) = path.end().map(|n| n.id) else {
                continue;
            };

            if !adjacency.contains_key(&current) {
                let relationships = self.store.get_all_relationships(&current, relationship_types).await?;
                adjacency.insert(current, relationships);
            }
            let relationships = adjacency.get(&current).cloned().unwrap_or_default();

            // Branches are pushed in reverse so they pop in store order
            let mut branches = Vec::new();
            for relationship in relationships {
                let next = relationship.other_end(&current);
                if path.nodes.iter().any(|n| n.id == next) {
                    continue;
                }

                let neighbor = match nodes.get(&next) {
                    Some(node) => node.clone(),
                    None => match self.store.get_node(&next).await? {
                        Some(node) => {
                            nodes.insert(next, node.clone());
                            node
                        }
                        None => continue,
                    },
                };

                let extended = path.extended(relationship, neighbor);
                if next == *end {
                    paths.push(extended);
                } else {
                    branches.push(extended);
                }
            }
            stack.extend(branches.into_iter().rev());
        }

        paths.sort_by_key(|p| p.length);
        tracing::debug!("Found {} paths from {} to {}", paths.len(), start, end);
        Ok(paths)
    }

    async fn resolve_endpoints(&self, start: &NodeId, end: &NodeId) -> Result<(Node, Node)> {
        let start_node = self
            .store
            .get_node(start)
            .await?
            .ok_or_else(|| Error::NodeNotFound(start.to_string()))?;
        let end_node = self
            .store
            .get_node(end)
            .await?
            .ok_or_else(|| Error::NodeNotFound(end.to_string()))?;
        Ok((start_node, end_node))
    }

    /// Reconstruct path from parent map
    fn reconstruct_path(
        start: &NodeId,
        end: &NodeId,
        parent: &HashMap<NodeId, (NodeId, Relationship)>,
        nodes: &HashMap<NodeId, Node>,
    ) -> GraphPath {
        let mut node_ids = vec![*end];
        let mut relationships = Vec::new();
        let mut current = *end;

        while current != *start {
            if let Some((prev, relationship)) = parent.get(&current) {
                relationships.push(relationship.clone());
                node_ids.push(*prev);
                current = *prev;
            } else {
                break;
            }
        }

        node_ids.reverse();
        relationships.reverse();

        GraphPath {
            length: relationships.len(),
            nodes: node_ids.iter().filter_map(|id| nodes.get(id).cloned()).collect(),
            relationships,
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}
