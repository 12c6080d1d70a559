//! ReDB-backed graph store
//!
//! Nodes and relationships live in two tables keyed by id, with JSON
//! values. Two multimap tables index relationship ids by source and by
//! target node so neighborhood lookups avoid scanning every edge. Each
//! operation runs in its own transaction; read-then-write sequences
//! share one write transaction.

use crate::error::StorageResult;
use async_trait::async_trait;
use redb::{
    Database, MultimapTableDefinition, ReadableMultimapTable, ReadableTable, TableDefinition,
    WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use strand_core::graph::require_clear_confirmation;
use strand_core::limits::validate_type_name;
use strand_core::{
    rank_nodes, BatchOutcome, BatchRejection, Error, GraphConfig, GraphStore, Lifecycle, NewNode,
    NewRelationship, Node, NodeId, NodeQuery, NodeUpdate, Relationship, RelationshipId,
    RelationshipQuery, RelationshipUpdate, Result, ScoredNode, VectorQuery,
};

type RecordTable = TableDefinition<'static, &'static str, &'static [u8]>;
type AdjacencyTable = MultimapTableDefinition<'static, &'static str, &'static str>;

// Table definitions
const NODES: RecordTable = TableDefinition::new("nodes");
const RELATIONSHIPS: RecordTable = TableDefinition::new("relationships");
// node id -> relationship ids
const OUTGOING: AdjacencyTable = MultimapTableDefinition::new("outgoing");
const INCOMING: AdjacencyTable = MultimapTableDefinition::new("incoming");

fn create_tables(txn: &WriteTransaction) -> StorageResult<()> {
    txn.open_table(NODES)?;
    txn.open_table(RELATIONSHIPS)?;
    txn.open_multimap_table(OUTGOING)?;
    txn.open_multimap_table(INCOMING)?;
    Ok(())
}

/// A value stored as JSON under its id
trait Record: Serialize + DeserializeOwned {
    const TABLE: RecordTable;

    fn key(&self) -> String;
}

impl Record for Node {
    const TABLE: RecordTable = NODES;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Record for Relationship {
    const TABLE: RecordTable = RELATIONSHIPS;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Graph store persisted in a ReDB file
pub struct RedbGraph {
    db: Database,
    config: GraphConfig,
    lifecycle: Lifecycle,
}

impl RedbGraph {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>, config: GraphConfig) -> StorageResult<Self> {
        let db = Database::create(path.as_ref())?;

        // Create tables so read transactions can always open them
        let write_txn = db.begin_write()?;
        create_tables(&write_txn)?;
        write_txn.commit()?;

        tracing::debug!("Opened redb graph at {:?}", path.as_ref());
        Ok(Self {
            db,
            config,
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn load_all<T: Record>(&self) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    fn get_record<T: Record>(&self, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(T::TABLE)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_records<T: Record>(&self, records: &[T]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(T::TABLE)?;
            for record in records {
                let value = serde_json::to_vec(record)?;
                table.insert(record.key().as_str(), value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn update_record<T: Record>(
        &self,
        key: &str,
        apply: impl FnOnce(&mut T),
    ) -> StorageResult<Option<T>> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(T::TABLE)?;
            let existing: Option<T> = match table.get(key)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match existing {
                Some(mut record) => {
                    apply(&mut record);
                    let value = serde_json::to_vec(&record)?;
                    table.insert(key, value.as_slice())?;
                    Some(record)
                }
                None => None,
            }
        };

        if updated.is_some() {
            write_txn.commit()?;
        }
        Ok(updated)
    }

    /// Relationships indexed under `node_id` in one adjacency table,
    /// in id order
    fn adjacent(
        &self,
        index: AdjacencyTable,
        node_id: &NodeId,
        types: &[String],
    ) -> StorageResult<Vec<Relationship>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(index)?;
        let table = read_txn.open_table(RELATIONSHIPS)?;

        let mut relationships = Vec::new();
        for entry in index.get(node_id.to_string().as_str())? {
            let entry = entry?;
            let Some(value) = table.get(entry.value())? else {
                continue;
            };
            let relationship: Relationship = serde_json::from_slice(value.value())?;
            if types.is_empty() || types.contains(&relationship.relationship_type) {
                relationships.push(relationship);
            }
        }
        Ok(relationships)
    }

    /// Remove a relationship record and its index entries
    fn remove_relationship(&self, id: &RelationshipId) -> StorageResult<bool> {
        let key = id.to_string();
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(RELATIONSHIPS)?;
            let removed: Option<Relationship> = match table.remove(key.as_str())? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match removed {
                Some(relationship) => {
                    unindex_relationship(&write_txn, &relationship)?;
                    true
                }
                None => false,
            }
        };
        if removed {
            write_txn.commit()?;
        }
        Ok(removed)
    }

    /// Delete a node and every relationship touching it in one transaction.
    /// Returns the number of cascaded relationships.
    fn remove_node_cascade(&self, id: &NodeId) -> StorageResult<Option<usize>> {
        let key = id.to_string();
        let write_txn = self.db.begin_write()?;
        let cascaded = {
            let mut nodes = write_txn.open_table(NODES)?;
            let existed = nodes.remove(key.as_str())?.is_some();
            if !existed {
                return Ok(None);
            }

            let mut touching = Vec::new();
            for index in [OUTGOING, INCOMING] {
                let mut adjacency = write_txn.open_multimap_table(index)?;
                for entry in adjacency.remove_all(key.as_str())? {
                    touching.push(entry?.value().to_string());
                }
            }
            touching.sort();
            touching.dedup();

            let mut relationships = write_txn.open_table(RELATIONSHIPS)?;
            let mut cascaded = 0;
            for rel_key in &touching {
                let removed: Option<Relationship> = match relationships.remove(rel_key.as_str())? {
                    Some(value) => Some(serde_json::from_slice(value.value())?),
                    None => None,
                };
                // Drop the entries kept under the other endpoint
                if let Some(relationship) = removed {
                    unindex_relationship(&write_txn, &relationship)?;
                    cascaded += 1;
                }
            }
            cascaded
        };
        write_txn.commit()?;
        Ok(Some(cascaded))
    }

    /// Insert relationships whose endpoints both exist. The returned flags
    /// line up with the input.
    fn insert_connected(&self, relationships: &[Relationship]) -> StorageResult<Vec<bool>> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let nodes = write_txn.open_table(NODES)?;
            let mut table = write_txn.open_table(RELATIONSHIPS)?;

            let mut inserted = Vec::with_capacity(relationships.len());
            for relationship in relationships {
                let connected = nodes
                    .get(relationship.source_node_id.to_string().as_str())?
                    .is_some()
                    && nodes
                        .get(relationship.target_node_id.to_string().as_str())?
                        .is_some();
                if connected {
                    let value = serde_json::to_vec(relationship)?;
                    let previous: Option<Relationship> =
                        match table.insert(relationship.key().as_str(), value.as_slice())? {
                            Some(old) => Some(serde_json::from_slice(old.value())?),
                            None => None,
                        };
                    // A restored id may come back with other endpoints
                    if let Some(previous) = previous {
                        unindex_relationship(&write_txn, &previous)?;
                    }
                    index_relationship(&write_txn, relationship)?;
                }
                inserted.push(connected);
            }
            inserted
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    fn clear(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(NODES)?;
        write_txn.delete_table(RELATIONSHIPS)?;
        write_txn.delete_multimap_table(OUTGOING)?;
        write_txn.delete_multimap_table(INCOMING)?;
        create_tables(&write_txn)?;
        write_txn.commit()?;
        Ok(())
    }

    fn restore_checked(
        &self,
        relationships: Vec<(usize, Relationship)>,
        outcome: &mut BatchOutcome<Relationship>,
    ) -> StorageResult<()> {
        let records: Vec<Relationship> = relationships.iter().map(|(_, r)| r.clone()).collect();
        let inserted = self.insert_connected(&records)?;

        for ((index, relationship), ok) in relationships.into_iter().zip(inserted) {
            if ok {
                outcome.created.push(relationship);
            } else {
                outcome.rejected.push(BatchRejection {
                    index,
                    reason: format!(
                        "source or target node does not exist: {} -> {}",
                        relationship.source_node_id, relationship.target_node_id
                    ),
                });
            }
        }
        Ok(())
    }
}

fn index_relationship(txn: &WriteTransaction, relationship: &Relationship) -> StorageResult<()> {
    let key = relationship.key();
    txn.open_multimap_table(OUTGOING)?
        .insert(relationship.source_node_id.to_string().as_str(), key.as_str())?;
    txn.open_multimap_table(INCOMING)?
        .insert(relationship.target_node_id.to_string().as_str(), key.as_str())?;
    Ok(())
}

fn unindex_relationship(txn: &WriteTransaction, relationship: &Relationship) -> StorageResult<()> {
    let key = relationship.key();
    txn.open_multimap_table(OUTGOING)?
        .remove(relationship.source_node_id.to_string().as_str(), key.as_str())?;
    txn.open_multimap_table(INCOMING)?
        .remove(relationship.target_node_id.to_string().as_str(), key.as_str())?;
    Ok(())
}

#[async_trait]
impl GraphStore for RedbGraph {
    async fn initialize(&self) -> Result<()> {
        if !self.lifecycle.is_ready() {
            self.lifecycle.start();
            tracing::info!("Redb graph initialized");
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        if self.lifecycle.is_ready() {
            self.lifecycle.stop();
            tracing::info!("Redb graph shut down");
        }
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_ready()
    }

    async fn create_node(&self, input: NewNode) -> Result<Node> {
        self.lifecycle.ensure_ready()?;
        validate_type_name(&input.node_type)?;

        let node = Node::from_input(input);
        self.put_records(std::slice::from_ref(&node))?;
        tracing::debug!("Created node {} ({})", node.id, node.node_type);
        Ok(node)
    }

    async fn create_nodes(&self, inputs: Vec<NewNode>) -> Result<Vec<Node>> {
        self.lifecycle.ensure_ready()?;
        for input in &inputs {
            validate_type_name(&input.node_type)?;
        }

        let nodes: Vec<Node> = inputs.into_iter().map(Node::from_input).collect();
        self.put_records(&nodes)?;
        tracing::debug!("Created {} nodes", nodes.len());
        Ok(nodes)
    }

    async fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        self.lifecycle.ensure_ready()?;
        Ok(self.get_record(&id.to_string())?)
    }

    async fn update_node(&self, id: &NodeId, update: NodeUpdate) -> Result<Option<Node>> {
        self.lifecycle.ensure_ready()?;
        Ok(self.update_record(&id.to_string(), |node: &mut Node| node.apply(update))?)
    }

    async fn delete_node(&self, id: &NodeId) -> Result<bool> {
        self.lifecycle.ensure_ready()?;
        match self.remove_node_cascade(id)? {
            Some(cascaded) => {
                tracing::debug!("Deleted node {} and {} relationships", id, cascaded);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_nodes(&self, query: &NodeQuery) -> Result<Vec<Node>> {
        self.lifecycle.ensure_ready()?;
        let nodes: Vec<Node> = self.load_all()?;
        Ok(query.apply(&nodes))
    }

    async fn restore_nodes(&self, nodes: Vec<Node>) -> Result<usize> {
        self.lifecycle.ensure_ready()?;
        self.put_records(&nodes)?;
        Ok(nodes.len())
    }

    async fn create_relationship(&self, input: NewRelationship) -> Result<Relationship> {
        self.lifecycle.ensure_ready()?;
        validate_type_name(&input.relationship_type)?;

        let relationship = Relationship::from_input(input);
        let inserted = self.insert_connected(std::slice::from_ref(&relationship))?;
        if inserted.first().copied().unwrap_or(false) {
            Ok(relationship)
        } else {
            Err(Error::MissingEndpoint {
                source_id: relationship.source_node_id.to_string(),
                target_id: relationship.target_node_id.to_string(),
            })
        }
    }

    async fn create_relationships(
        &self,
        inputs: Vec<NewRelationship>,
    ) -> Result<BatchOutcome<Relationship>> {
        self.lifecycle.ensure_ready()?;
        let mut outcome = BatchOutcome::default();
        let mut candidates = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.into_iter().enumerate() {
            match validate_type_name(&input.relationship_type) {
                Ok(()) => candidates.push((index, Relationship::from_input(input))),
                Err(e) => outcome.rejected.push(BatchRejection {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        self.restore_checked(candidates, &mut outcome)?;
        outcome.rejected.sort_by_key(|r| r.index);

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
        self.lifecycle.ensure_ready()?;
        Ok(self.get_record(&id.to_string())?)
    }

    async fn update_relationship(
        &self,
        id: &RelationshipId,
        update: RelationshipUpdate,
    ) -> Result<Option<Relationship>> {
        self.lifecycle.ensure_ready()?;
        Ok(self.update_record(&id.to_string(), |relationship: &mut Relationship| {
            relationship.apply(update)
        })?)
    }

    async fn delete_relationship(&self, id: &RelationshipId) -> Result<bool> {
        self.lifecycle.ensure_ready()?;
        Ok(self.remove_relationship(id)?)
    }

    async fn query_relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>> {
        self.lifecycle.ensure_ready()?;
        let relationships: Vec<Relationship> = self.load_all()?;
        Ok(query.apply(&relationships))
    }

    async fn restore_relationships(
        &self,
        relationships: Vec<Relationship>,
    ) -> Result<BatchOutcome<Relationship>> {
        self.lifecycle.ensure_ready()?;
        let mut outcome = BatchOutcome::default();
        self.restore_checked(relationships.into_iter().enumerate().collect(), &mut outcome)?;
        Ok(outcome)
    }

    async fn get_outgoing_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        self.lifecycle.ensure_ready()?;
        Ok(self.adjacent(OUTGOING, node_id, types)?)
    }

    async fn get_incoming_relationships(
        &self,
        node_id: &NodeId,
        types: &[String],
    ) -> Result<Vec<Relationship>> {
        self.lifecycle.ensure_ready()?;
        Ok(self.adjacent(INCOMING, node_id, types)?)
    }

    async fn clear_graph(&self, confirm: bool) -> Result<bool> {
        self.lifecycle.ensure_ready()?;
        require_clear_confirmation(confirm)?;
        self.clear()?;
        tracing::info!("Cleared graph");
        Ok(true)
    }

    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ScoredNode>> {
        self.lifecycle.ensure_ready()?;
        if !self.config.enable_vector_search {
            return Err(Error::FeatureDisabled("vector search".to_string()));
        }
        let nodes: Vec<Node> = self.load_all()?;
        rank_nodes(&nodes, query)
    }
}
