//! Relationship (edge) types and operations

use crate::node::{merge_properties, next_ulid, NodeId, Properties};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub Ulid);

impl RelationshipId {
    pub fn new() -> Self {
        Self(next_ulid())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RelationshipId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Direction for graph traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outgoing" | "out" => Ok(Self::Outgoing),
            "incoming" | "in" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// A directed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Unique identifier
    pub id: RelationshipId,

    /// Relationship type (REFERENCES, CONTAINS, DEPENDS_ON, ...)
    #[serde(rename = "type")]
    pub relationship_type: String,

    /// Display label
    pub label: String,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,

    /// Source node
    pub source_node_id: NodeId,

    /// Target node
    pub target_node_id: NodeId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship between two node ids
    pub fn new(
        source_node_id: NodeId,
        target_node_id: NodeId,
        relationship_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RelationshipId::new(),
            relationship_type: relationship_type.into(),
            label: String::new(),
            properties: Properties::new(),
            source_node_id,
            target_node_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a stored relationship from creation input
    pub fn from_input(input: NewRelationship) -> Self {
        let mut relationship = Self::new(
            input.source_node_id,
            input.target_node_id,
            input.relationship_type,
        );
        relationship.label = input.label;
        relationship.properties = input.properties;
        relationship
    }

    /// Apply a partial update. Only supplied fields change.
    pub fn apply(&mut self, update: RelationshipUpdate) {
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(properties) = update.properties {
            merge_properties(&mut self.properties, properties);
        }
        self.touch();
    }

    /// Refresh `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// The endpoint on the other side of `node`
    ///
    /// For a self-loop this is `node` itself.
    pub fn other_end(&self, node: &NodeId) -> NodeId {
        if self.source_node_id == *node {
            self.target_node_id
        } else {
            self.source_node_id
        }
    }

    /// Whether `node` is the source or the target
    pub fn touches(&self, node: &NodeId) -> bool {
        self.source_node_id == *node || self.target_node_id == *node
    }

    pub fn matches_properties(&self, expected: &Properties) -> bool {
        expected
            .iter()
            .all(|(key, value)| self.properties.get(key) == Some(value))
    }
}

/// Data for creating a new relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelationship {
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub properties: Properties,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
}

impl NewRelationship {
    pub fn new(
        source_node_id: NodeId,
        target_node_id: NodeId,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            label: String::new(),
            properties: Properties::new(),
            source_node_id,
            target_node_id,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Partial update for a relationship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl RelationshipUpdate {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relationship_creation() {
        let source = NodeId::new();
        let target = NodeId::new();
        let relationship = Relationship::from_input(
            NewRelationship::new(source, target, "RELATED_TO").with_label("see also"),
        );

        assert_eq!(relationship.source_node_id, source);
        assert_eq!(relationship.target_node_id, target);
        assert_eq!(relationship.relationship_type, "RELATED_TO");
        assert_eq!(relationship.label, "see also");
    }

    #[test]
    fn test_other_end() {
        let a = NodeId::new();
        let b = NodeId::new();
        let relationship = Relationship::new(a, b, "CONTAINS");

        assert_eq!(relationship.other_end(&a), b);
        assert_eq!(relationship.other_end(&b), a);

        let self_loop = Relationship::new(a, a, "CONTAINS");
        assert_eq!(self_loop.other_end(&a), a);
    }

    #[test]
    fn test_update_merges_properties() {
        let mut relationship = Relationship::from_input(
            NewRelationship::new(NodeId::new(), NodeId::new(), "DEPENDS_ON").with_property("w", 1),
        );
        relationship.apply(RelationshipUpdate::new().property("note", "x"));

        assert_eq!(relationship.properties["w"], json!(1));
        assert_eq!(relationship.properties["note"], json!("x"));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Outgoing);
        assert_eq!("INCOMING".parse::<Direction>().unwrap(), Direction::Incoming);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
