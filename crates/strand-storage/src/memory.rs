//! In-memory graph store with optional JSON snapshot persistence

use crate::error::StorageResult;
use crate::snapshot::json;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use strand_core::graph::require_clear_confirmation;
use strand_core::limits::validate_type_name;
use strand_core::{
    rank_nodes, BatchOutcome, BatchRejection, Error, Graph, GraphConfig, GraphStats, GraphStore,
    Lifecycle, NewNode, NewRelationship, Node, NodeId, NodeQuery, NodeUpdate, Relationship,
    RelationshipId, RelationshipQuery, RelationshipUpdate, Result, ScoredNode, VectorQuery,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Node and relationship collections plus adjacency indexes.
///
/// Order vectors keep insertion order for unsorted queries.
#[derive(Debug, Default)]
struct GraphData {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    relationships: HashMap<RelationshipId, Relationship>,
    relationship_order: Vec<RelationshipId>,
    outgoing: HashMap<NodeId, Vec<RelationshipId>>,
    incoming: HashMap<NodeId, Vec<RelationshipId>>,
}

impl GraphData {
    fn from_graph(graph: Graph) -> Self {
        let mut data = Self::default();
        for node in graph.nodes {
            data.insert_node(node);
        }
        let mut dropped = 0;
        for relationship in graph.relationships {
            if data.has_endpoints(&relationship.source_node_id, &relationship.target_node_id) {
                data.insert_relationship(relationship);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::warn!("Dropped {} snapshot relationships with missing endpoints", dropped);
        }
        data
    }

    fn to_graph(&self) -> Graph {
        Graph {
            nodes: self.nodes_in_order().cloned().collect(),
            relationships: self.relationships_in_order().cloned().collect(),
        }
    }

    fn nodes_in_order(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    fn relationships_in_order(&self) -> impl Iterator<Item = &Relationship> {
        self.relationship_order
            .iter()
            .filter_map(|id| self.relationships.get(id))
    }

    fn has_endpoints(&self, source: &NodeId, target: &NodeId) -> bool {
        self.nodes.contains_key(source) && self.nodes.contains_key(target)
    }

    fn insert_node(&mut self, node: Node) {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.node_order.push(id);
        }
    }

    fn insert_relationship(&mut self, relationship: Relationship) {
        let id = relationship.id;
        let (source, target) = (relationship.source_node_id, relationship.target_node_id);
        if let Some(previous) = self.relationships.insert(id, relationship) {
            self.unindex(&previous);
        } else {
            self.relationship_order.push(id);
        }
        self.outgoing.entry(source).or_default().push(id);
        self.incoming.entry(target).or_default().push(id);
    }

    fn remove_relationship(&mut self, id: &RelationshipId) -> Option<Relationship> {
        let relationship = self.relationships.remove(id)?;
        self.relationship_order.retain(|r| r != id);
        self.unindex(&relationship);
        Some(relationship)
    }

    fn unindex(&mut self, relationship: &Relationship) {
        if let Some(ids) = self.outgoing.get_mut(&relationship.source_node_id) {
            ids.retain(|r| *r != relationship.id);
        }
        if let Some(ids) = self.incoming.get_mut(&relationship.target_node_id) {
            ids.retain(|r| *r != relationship.id);
        }
    }

    /// Remove a node and every relationship touching it
    fn remove_node(&mut self, id: &NodeId) -> Option<(Node, usize)> {
        let node = self.nodes.remove(id)?;
        self.node_order.retain(|n| n != id);

        let mut touching: Vec<RelationshipId> = Vec::new();
        touching.extend(self.outgoing.remove(id).unwrap_or_default());
        touching.extend(self.incoming.remove(id).unwrap_or_default());
        touching.sort();
        touching.dedup();

        let mut removed = 0;
        for relationship_id in &touching {
            if self.remove_relationship(relationship_id).is_some() {
                removed += 1;
            }
        }
        Some((node, removed))
    }

    fn adjacent(&self, index: &HashMap<NodeId, Vec<RelationshipId>>, node_id: &NodeId, types: &[String]) -> Vec<Relationship> {
        index
            .get(node_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.relationships.get(id))
                    .filter(|r| types.is_empty() || types.contains(&r.relationship_type))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

struct Autosave {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// In-memory graph store
///
/// The whole collection sits behind one `RwLock`, so cascading deletes
/// and batch creates are atomic for concurrent callers. With a
/// `snapshot_path` configured the graph is loaded on `initialize`,
/// saved periodically when `autosave_interval_secs` is set, and saved
/// again on `shutdown`.
pub struct MemoryGraph {
    config: GraphConfig,
    data: Arc<RwLock<GraphData>>,
    dirty: Arc<AtomicBool>,
    lifecycle: Lifecycle,
    autosave: Mutex<Option<Autosave>>,
}

impl MemoryGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            data: Arc::new(RwLock::new(GraphData::default())),
            dirty: Arc::new(AtomicBool::new(false)),
            lifecycle: Lifecycle::new(),
            autosave: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphData>> {
        self.lifecycle.ensure_ready()?;
        self.data
            .read()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphData>> {
        self.lifecycle.ensure_ready()?;
        self.data
            .write()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))
    }

    /// Flag the graph as changed since the last save. Callers hold the
    /// write guard so a concurrent save cannot miss the change.
    fn mark_changed(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Whether the graph has unsaved changes
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Write the current graph to the configured snapshot file
    pub async fn save_snapshot(&self) -> Result<bool> {
        let Some(path) = self.config.snapshot_path.clone() else {
            return Ok(false);
        };
        save_to(&self.data, &self.dirty, &path).await?;
        Ok(true)
    }

    async fn load_snapshot(&self, path: &Path) -> Result<()> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No snapshot at {:?}, starting empty", path);
            return Ok(());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read snapshot {:?}: {}", path, e)))?;
        let graph = json::from_json(&content)?;
        let data = GraphData::from_graph(graph);

        tracing::info!(
            "Loaded snapshot {:?}: {} nodes, {} relationships",
            path,
            data.nodes.len(),
            data.relationships.len()
        );

        let mut guard = self
            .data
            .write()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))?;
        *guard = data;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn start_autosave(&self, path: PathBuf, interval_secs: u64) -> Result<()> {
        let token = CancellationToken::new();
        let data = Arc::clone(&self.data);
        let dirty = Arc::clone(&self.dirty);
        let child = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            // The first tick completes immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        if dirty.load(Ordering::SeqCst) {
                            if let Err(e) = save_to(&data, &dirty, &path).await {
                                tracing::error!("Autosave to {:?} failed: {}", path, e);
                            }
                        }
                    }
                }
            }
        });

        let mut slot = self
            .autosave
            .lock()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))?;
        *slot = Some(Autosave { token, handle });
        tracing::info!("Autosave enabled every {}s", interval_secs);
        Ok(())
    }

    async fn stop_autosave(&self) -> Result<()> {
        let autosave = self
            .autosave
            .lock()
            .map_err(|e| Error::Storage(format!("Lock error: {}", e)))?
            .take();

        if let Some(Autosave { token, handle }) = autosave {
            token.cancel();
            if let Err(e) = handle.await {
                tracing::warn!("Autosave task ended abnormally: {}", e);
            }
        }
        Ok(())
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

/// Snapshot the graph under the read lock, then write it without holding it
async fn save_to(data: &RwLock<GraphData>, dirty: &AtomicBool, path: &Path) -> StorageResult<()> {
    let graph = {
        let guard = data
            .read()
            .map_err(|e| crate::StorageError::LockPoisoned(e.to_string()))?;
        dirty.store(false, Ordering::SeqCst);
        guard.to_graph()
    };
    if let Err(e) = json::write_json_file(path, &graph).await {
        // Keep the changes pending so the next save retries them
        dirty.store(true, Ordering::SeqCst);
        return Err(e);
    }
    tracing::debug!(
        "Saved snapshot {:?}: {} nodes, {} relationships",
        path,
        graph.nodes.len(),
        graph.relationships.len()
    );
    Ok(())
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn initialize(&self) -> Result<()> {
        if self.lifecycle.is_ready() {
            return Ok(());
        }

        if let Some(path) = self.config.snapshot_path.clone() {
            self.load_snapshot(&path).await?;
            if let Some(interval) = self.config.autosave_interval_secs {
                self.start_autosave(path, interval)?;
            }
        }

        self.lifecycle.start();
        tracing::info!("Memory graph initialized");
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if !self.lifecycle.is_ready() {
            return Ok(());
        }

        self.stop_autosave().await?;
        self.save_snapshot().await?;
        self.lifecycle.stop();
        tracing::info!("Memory graph shut down");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_ready()
    }

    // Node operations

    async fn create_node(&self, input: NewNode) -> Result<Node> {
        validate_type_name(&input.node_type)?;
        let node = Node::from_input(input);
        let mut data = self.write()?;
        data.insert_node(node.clone());
        self.mark_changed();
        drop(data);
        tracing::debug!("Created node {} ({})", node.id, node.node_type);
        Ok(node)
    }

    async fn create_nodes(&self, inputs: Vec<NewNode>) -> Result<Vec<Node>> {
        for input in &inputs {
            validate_type_name(&input.node_type)?;
        }

        let nodes: Vec<Node> = inputs.into_iter().map(Node::from_input).collect();
        let mut data = self.write()?;
        for node in &nodes {
            data.insert_node(node.clone());
        }
        if !nodes.is_empty() {
            self.mark_changed();
        }
        tracing::debug!("Created {} nodes", nodes.len());
        Ok(nodes)
    }

    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        Ok(self.read()?.nodes.get(id).cloned())
    }

    async fn update_node(&self, id: &NodeId, update: NodeUpdate) -> Result<Option<Node>> {
        let mut data = self.write()?;
        let updated = data.nodes.get_mut(id).map(|node| {
            node.apply(update);
            node.clone()
        });
        if updated.is_some() {
            self.mark_changed();
        }
        Ok(updated)
    }

    async fn delete_node(&self, id: &NodeId) -> Result<bool> {
        let mut data = self.write()?;
        match data.remove_node(id) {
            Some((_, cascaded)) => {
                self.mark_changed();
                tracing::debug!("Deleted node {} and {} relationships", id, cascaded);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>> {
        let data = self.read()?;
        Ok(query.apply(data.nodes_in_order()))
    }

    async fn restore_nodes(&self, nodes: Vec<Node>) -> Result<usize> {
        let count = nodes.len();
        let mut data = self.write()?;
        for node in nodes {
            data.insert_node(node);
        }
        if count > 0 {
            self.mark_changed();
        }
        Ok(count)
    }

    // Relationship operations

    async fn create_relationship(&self, input: NewRelationship) -> Result<Relationship> {
        validate_type_name(&input.relationship_type)?;

        let mut data = self.write()?;
        if !data.has_endpoints(&input.source_node_id, &input.target_node_id) {
            return Err(Error::MissingEndpoint {
                source_id: input.source_node_id.to_string(),
                target_id: input.target_node_id.to_string(),
            });
        }

        let relationship = Relationship::from_input(input);
        data.insert_relationship(relationship.clone());
        self.mark_changed();
        Ok(relationship)
    }

    async fn create_relationships(
        &self,
        inputs: Vec<NewRelationship>,
    ) -> Result<BatchOutcome<Relationship>> {
        let mut outcome = BatchOutcome::default();
        let mut data = self.write()?;

        for (index, input) in inputs.into_iter().enumerate() {
            if let Err(e) = validate_type_name(&input.relationship_type) {
                outcome.rejected.push(BatchRejection {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
            if !data.has_endpoints(&input.source_node_id, &input.target_node_id) {
                outcome.rejected.push(BatchRejection {
                    index,
                    reason: format!(
                        "source or target node does not exist: {} -> {}",
                        input.source_node_id, input.target_node_id
                    ),
                });
                continue;
            }

            let relationship = Relationship::from_input(input);
            data.insert_relationship(relationship.clone());
            outcome.created.push(relationship);
        }
        if !outcome.created.is_empty() {
            self.mark_changed();
        }

        if !outcome.rejected.is_empty() {
            tracing::warn!(
                "Rejected {} of {} relationships in batch",
                outcome.rejected.len(),
                outcome.rejected.len() + outcome.created.len()
            );
        }
        Ok(outcome)
    }

    async fn get_relationship(&self, id: &RelationshipId) -> Result<Option<Relationship>> {
        Ok(self.read()?.relationships.get(id).cloned())
    }

    async fn update_relationship(
        &self,
        id: &RelationshipId,
        update: RelationshipUpdate,
    ) -> Result<Option<Relationship>> {
        let mut data = self.write()?;
        let updated = data.relationships.get_mut(id).map(|relationship| {
            relationship.apply(update);
            relationship.clone()
        });
        if updated.is_some() {
            self.mark_changed();
        }
        Ok(updated)
    }

    async fn delete_relationship(&self, id: &RelationshipId) -> Result<bool> {
        let mut data = self.write()?;
        let removed = data.remove_relationship(id).is_some();
        if removed {
            self.mark_changed();
        }
        Ok(removed)
    }

    async fn query_relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>> {
        let data = self.read()?;
        Ok(query.apply(data.relationships_in_order()))
    }

    async fn restore_relationships(
        &self,
        relationships: Vec<Relationship>,
    ) -> Result<BatchOutcome<Relationship>> {
        let mut outcome = BatchOutcome::default();
        let mut data = self.write()?;

        for (index, relationship) in relationships.into_iter().enumerate() {
            if data.has_endpoints(&relationship.source_node_id, &relationship.target_node_id) {
                data.insert_relationship(relationship.clone());
                outcome.created.push(relationship);
            } else {
                outcome.rejected.push(BatchRejection {
                    index,
                    reason: format!("relationship {} has a missing endpoint", relationship.id),
                });
            }
        }
        if !outcome.created.is_empty() {
            self.mark_changed();
        }
        Ok(outcome)
    }

    // Neighborhood lookups use the adjacency indexes

    async fn get_outgoing_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        let data = self.read()?;
        Ok(data.adjacent(&data.outgoing, node_id, types))
    }

    async fn get_incoming_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        let data = self.read()?;
        Ok(data.adjacent(&data.incoming, node_id, types))
    }

    // Graph operations

    async fn get_graph_stats(&self) -> Result<GraphStats> {
        let data = self.read()?;
        Ok(GraphStats::compute(
            data.nodes_in_order(),
            data.relationships_in_order(),
        ))
    }

    async fn clear_graph(&self, confirm: bool) -> Result<bool> {
        self.lifecycle.ensure_ready()?;
        require_clear_confirmation(confirm)?;
        let mut data = self.write()?;
        data.clear();
        self.mark_changed();
        drop(data);
        tracing::info!("Cleared graph");
        Ok(true)
    }

    async fn read_graph(&self) -> Result<Graph> {
        Ok(self.read()?.to_graph())
    }

    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ScoredNode>> {
        self.lifecycle.ensure_ready()?;
        if !self.config.enable_vector_search {
            return Err(Error::FeatureDisabled("vector search".to_string()));
        }
        let data = self.read()?;
        rank_nodes(data.nodes_in_order(), query)
    }
}
