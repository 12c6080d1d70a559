//! Query types for filtering, ordering and paginating the graph
//!
//! The filter/sort/paginate logic lives here so every store
//! implementation produces identical result orders.

use crate::node::{Node, NodeId, Properties};
use crate::relationship::Relationship;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// Field to order results by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderBy {
    Id,
    Type,
    Label,
    CreatedAt,
    UpdatedAt,
    /// Any property key
    Property(String),
}

impl From<String> for OrderBy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "id" => Self::Id,
            "type" => Self::Type,
            "label" => Self::Label,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            _ => Self::Property(s),
        }
    }
}

impl From<&str> for OrderBy {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<OrderBy> for String {
    fn from(order: OrderBy) -> Self {
        match order {
            OrderBy::Id => "id".to_string(),
            OrderBy::Type => "type".to_string(),
            OrderBy::Label => "label".to_string(),
            OrderBy::CreatedAt => "createdAt".to_string(),
            OrderBy::UpdatedAt => "updatedAt".to_string(),
            OrderBy::Property(key) => key,
        }
    }
}

/// Node query builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeQuery {
    /// Filter by node types (empty = all types)
    #[serde(default)]
    pub types: Vec<String>,

    /// Filter by labels (empty = all labels)
    #[serde(default)]
    pub labels: Vec<String>,

    /// Exact-match property filters, all must match
    #[serde(default)]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    #[serde(default)]
    pub order_direction: OrderDirection,

    #[serde(default)]
    pub offset: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl NodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.types.push(node_type.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<OrderBy>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.order_direction = direction;
        self
    }

    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Check the filter part of the query against a node
    pub fn matches(&self, node: &Node) -> bool {
        (self.types.is_empty() || self.types.contains(&node.node_type))
            && (self.labels.is_empty() || self.labels.contains(&node.label))
            && node.matches_properties(&self.properties)
    }

    /// Filter, sort and paginate a node collection
    pub fn apply<'a>(&self, nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Node> {
        let mut matched: Vec<Node> = nodes
            .into_iter()
            .filter(|n| self.matches(n))
            .cloned()
            .collect();
        sort_records(&mut matched, self.order_by.as_ref(), self.order_direction);
        paginate(matched, self.offset, self.limit)
    }
}

/// Relationship query builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipQuery {
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub properties: Properties,

    /// Filter by source node ids (empty = any source)
    #[serde(default)]
    pub source_node_ids: Vec<NodeId>,

    /// Filter by target node ids (empty = any target)
    #[serde(default)]
    pub target_node_ids: Vec<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    #[serde(default)]
    pub order_direction: OrderDirection,

    #[serde(default)]
    pub offset: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl RelationshipQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.types.push(relationship_type.into());
        self
    }

    pub fn with_types(mut self, types: &[String]) -> Self {
        self.types.extend(types.iter().cloned());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn from_node(mut self, id: NodeId) -> Self {
        self.source_node_ids.push(id);
        self
    }

    pub fn to_node(mut self, id: NodeId) -> Self {
        self.target_node_ids.push(id);
        self
    }

    pub fn order_by(mut self, field: impl Into<OrderBy>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.order_direction = direction;
        self
    }

    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, relationship: &Relationship) -> bool {
        (self.types.is_empty() || self.types.contains(&relationship.relationship_type))
            && (self.labels.is_empty() || self.labels.contains(&relationship.label))
            && (self.source_node_ids.is_empty()
                || self.source_node_ids.contains(&relationship.source_node_id))
            && (self.target_node_ids.is_empty()
                || self.target_node_ids.contains(&relationship.target_node_id))
            && relationship.matches_properties(&self.properties)
    }

    /// Filter, sort and paginate a relationship collection
    pub fn apply<'a>(
        &self,
        relationships: impl IntoIterator<Item = &'a Relationship>,
    ) -> Vec<Relationship> {
        let mut matched: Vec<Relationship> = relationships
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        sort_records(&mut matched, self.order_by.as_ref(), self.order_direction);
        paginate(matched, self.offset, self.limit)
    }
}

/// Fields shared by nodes and relationships for ordering
trait Sortable {
    fn id_string(&self) -> String;
    fn type_name(&self) -> &str;
    fn label(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn property(&self, key: &str) -> Option<&serde_json::Value>;
}

impl Sortable for Node {
    fn id_string(&self) -> String {
        self.id.to_string()
    }
    fn type_name(&self) -> &str {
        &self.node_type
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

impl Sortable for Relationship {
    fn id_string(&self) -> String {
        self.id.to_string()
    }
    fn type_name(&self) -> &str {
        &self.relationship_type
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// Stable sort; without an order field the input order is kept
fn sort_records<T: Sortable>(records: &mut [T], order_by: Option<&OrderBy>, direction: OrderDirection) {
    let Some(field) = order_by else {
        return;
    };

    records.sort_by(|a, b| {
        let ordering = match field {
            OrderBy::Id => a.id_string().cmp(&b.id_string()),
            OrderBy::Type => a.type_name().cmp(b.type_name()),
            OrderBy::Label => a.label().cmp(b.label()),
            OrderBy::CreatedAt => a.created_at().cmp(&b.created_at()),
            OrderBy::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            OrderBy::Property(key) => match (a.property(key), b.property(key)) {
                // Missing values stay last whatever the direction
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                (a, b) => compare_values(a, b),
            },
        };
        match direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    });
}

/// Compare two property values for ordering.
///
/// Numbers, strings and booleans compare natively when both sides share
/// the kind; everything else, and native ties, fall back to comparing
/// string forms. Missing values sort after present ones.
pub fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    use serde_json::Value;

    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let native = match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    };

    native.then_with(|| value_to_string(a).cmp(&value_to_string(b)))
}

/// String form of a value; strings are taken without quotes
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn paginate<T>(records: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
    let iter = records.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NewNode;
    use serde_json::json;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::from_input(NewNode::new("NOTE", "gamma").with_property("x", 1).with_property("rank", 3)),
            Node::from_input(NewNode::new("CONCEPT", "alpha").with_property("x", 1).with_property("rank", 1)),
            Node::from_input(NewNode::new("NOTE", "beta").with_property("x", 2).with_property("rank", "2")),
            Node::from_input(NewNode::new("NOTE", "delta")),
        ]
    }

    #[test]
    fn test_filter_conjunction() {
        let nodes = sample_nodes();
        let query = NodeQuery::new().with_type("NOTE").with_property("x", 1);
        let results = query.apply(&nodes);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "gamma");
    }

    #[test]
    fn test_label_filter() {
        let nodes = sample_nodes();
        let results = NodeQuery::new().with_label("alpha").with_label("beta").apply(&nodes);

        let labels: Vec<_> = results.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_order_by_label_desc() {
        let nodes = sample_nodes();
        let results = NodeQuery::new()
            .order_by("label", OrderDirection::Desc)
            .apply(&nodes);

        let labels: Vec<_> = results.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["gamma", "delta", "beta", "alpha"]);
    }

    #[test]
    fn test_order_by_heterogeneous_property() {
        let nodes = sample_nodes();
        let results = NodeQuery::new()
            .order_by("rank", OrderDirection::Asc)
            .apply(&nodes);

        // 1 and 3 are numbers, "2" is a string and compares by string form
        let labels: Vec<_> = results.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "beta", "gamma", "delta"]);

        let results = NodeQuery::new()
            .order_by("rank", OrderDirection::Desc)
            .apply(&nodes);
        let labels: Vec<_> = results.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["gamma", "beta", "alpha", "delta"]);
    }

    #[test]
    fn test_pagination_partitions_results() {
        let nodes = sample_nodes();
        let base = NodeQuery::new().order_by("label", OrderDirection::Asc);
        let all = base.clone().apply(&nodes);
        let first = base.clone().paginate(0, 2).apply(&nodes);
        let second = base.clone().paginate(2, 2).apply(&nodes);

        let mut combined = first.clone();
        combined.extend(second);
        assert_eq!(combined, all);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_order_by_parse() {
        assert_eq!(OrderBy::from("createdAt"), OrderBy::CreatedAt);
        assert_eq!(OrderBy::from("priority"), OrderBy::Property("priority".into()));
        assert_eq!(String::from(OrderBy::UpdatedAt), "updatedAt");
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(true)), None), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(1)), Some(&json!(1))), Ordering::Equal);
    }

    #[test]
    fn test_relationship_endpoint_filters() {
        let a = NodeId::new();
        let b = NodeId::new();
        let c = NodeId::new();
        let relationships = vec![
            Relationship::new(a, b, "REFERENCES"),
            Relationship::new(b, c, "REFERENCES"),
            Relationship::new(a, c, "CONTAINS"),
        ];

        let from_a = RelationshipQuery::new().from_node(a).apply(&relationships);
        assert_eq!(from_a.len(), 2);

        let to_c_refs = RelationshipQuery::new()
            .to_node(c)
            .with_type("REFERENCES")
            .apply(&relationships);
        assert_eq!(to_c_refs.len(), 1);
        assert_eq!(to_c_refs[0].source_node_id, b);
    }
}
