//! Node (vertex) types and operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use ulid::{Generator, Ulid};

/// Open property map carried by nodes and relationships
pub type Properties = HashMap<String, serde_json::Value>;

/// Next id from a process-wide monotonic generator.
///
/// Ids minted in the same millisecond still sort in creation order, so
/// stores keyed by id list records the way they were created.
pub(crate) fn next_ulid() -> Ulid {
    static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();

    let mut generator = GENERATOR
        .get_or_init(|| Mutex::new(Generator::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    // Overflow needs 2^80 ids within one millisecond
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(next_ulid())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// A node in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// Node type (NOTE, CONCEPT, DOCUMENT, ...)
    #[serde(rename = "type")]
    pub node_type: String,

    /// Human-readable display label
    pub label: String,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,

    /// Optional embedding for similarity search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node with a fresh id and timestamps
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            node_type: node_type.into(),
            label: label.into(),
            properties: Properties::new(),
            vector: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a stored node from creation input
    pub fn from_input(input: NewNode) -> Self {
        let mut node = Self::new(input.node_type, input.label);
        node.properties = input.properties;
        node.vector = input.vector;
        node
    }

    /// Apply a partial update. Only supplied fields change.
    pub fn apply(&mut self, update: NodeUpdate) {
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(properties) = update.properties {
            merge_properties(&mut self.properties, properties);
        }
        if let Some(vector) = update.vector {
            self.vector = vector;
        }
        self.touch();
    }

    /// Refresh `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Check whether every listed property is present with an equal value
    pub fn matches_properties(&self, expected: &Properties) -> bool {
        expected
            .iter()
            .all(|(key, value)| self.properties.get(key) == Some(value))
    }
}

/// Shallow merge: keys in `incoming` overwrite keys in `target`
pub fn merge_properties(target: &mut Properties, incoming: Properties) {
    target.extend(incoming);
}

/// Data for creating a new node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
}

impl NewNode {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            properties: Properties::new(),
            vector: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// Partial update for a node
///
/// `vector` is doubly optional: `None` leaves the embedding alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Option<Vec<f32>>>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn vector(mut self, vector: Option<Vec<f32>>) -> Self {
        self.vector = Some(vector);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_increase_within_a_millisecond() {
        let ids: Vec<NodeId> = (0..1000).map(|_| NodeId::new()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

        let keys: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_node_creation() {
        let node = Node::from_input(NewNode::new("CONCEPT", "Alpha").with_property("x", 1));

        assert_eq!(node.node_type, "CONCEPT");
        assert_eq!(node.label, "Alpha");
        assert_eq!(node.properties.get("x"), Some(&json!(1)));
        assert!(node.vector.is_none());
        assert_eq!(node.created_at, node.updated_at);
    }

    #[test]
    fn test_update_merges_properties() {
        let mut node = Node::from_input(NewNode::new("NOTE", "n").with_property("b", 2));
        node.apply(NodeUpdate::new().property("a", 1));

        assert_eq!(node.properties.len(), 2);
        assert_eq!(node.properties["a"], json!(1));
        assert_eq!(node.properties["b"], json!(2));
        assert_eq!(node.label, "n");
        assert!(node.updated_at >= node.created_at);
    }

    #[test]
    fn test_update_vector_only_when_supplied() {
        let mut node = Node::from_input(NewNode::new("NOTE", "n").with_vector(vec![1.0, 0.0]));

        node.apply(NodeUpdate::new().label("renamed"));
        assert_eq!(node.vector, Some(vec![1.0, 0.0]));

        node.apply(NodeUpdate::new().vector(None));
        assert!(node.vector.is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let node = Node::new("NOTE", "hello");
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["type"], json!("NOTE"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("vector").is_none());
        assert_eq!(value["id"], json!(node.id.to_string()));
    }
}
