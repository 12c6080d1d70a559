//! CSV snapshot codec: `nodes.csv` and `relationships.csv`
//!
//! Fields are quoted per RFC 4180 when they contain a delimiter, a quote,
//! a line break or surrounding whitespace. `properties` and `vector` are
//! stored as JSON strings.

use super::SnapshotError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use strand_core::{Node, NodeId, Properties, Relationship, RelationshipId};

pub const NODES_FILE: &str = "nodes.csv";
pub const RELATIONSHIPS_FILE: &str = "relationships.csv";

const NODE_HEADER: [&str; 7] = [
    "id",
    "type",
    "label",
    "properties",
    "vector",
    "createdAt",
    "updatedAt",
];

const RELATIONSHIP_HEADER: [&str; 8] = [
    "id",
    "type",
    "label",
    "sourceNodeId",
    "targetNodeId",
    "properties",
    "createdAt",
    "updatedAt",
];

pub fn nodes_to_csv(nodes: &[Node]) -> Result<String, SnapshotError> {
    let mut output = String::new();
    push_row(&mut output, NODE_HEADER.iter().map(|h| h.to_string()));

    for node in nodes {
        let vector = match &node.vector {
            Some(v) => serde_json::to_string(v)?,
            None => String::new(),
        };
        push_row(
            &mut output,
            [
                node.id.to_string(),
                node.node_type.clone(),
                node.label.clone(),
                serde_json::to_string(&node.properties)?,
                vector,
                format_time(&node.created_at),
                format_time(&node.updated_at),
            ],
        );
    }
    Ok(output)
}

pub fn relationships_to_csv(relationships: &[Relationship]) -> Result<String, SnapshotError> {
    let mut output = String::new();
    push_row(&mut output, RELATIONSHIP_HEADER.iter().map(|h| h.to_string()));

    for relationship in relationships {
        push_row(
            &mut output,
            [
                relationship.id.to_string(),
                relationship.relationship_type.clone(),
                relationship.label.clone(),
                relationship.source_node_id.to_string(),
                relationship.target_node_id.to_string(),
                serde_json::to_string(&relationship.properties)?,
                format_time(&relationship.created_at),
                format_time(&relationship.updated_at),
            ],
        );
    }
    Ok(output)
}

pub fn nodes_from_csv(content: &str) -> Result<Vec<Node>, SnapshotError> {
    let mut rows = parse_csv(content)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = Columns::new(&header, &NODE_HEADER)?;

    rows.filter(|row| !is_blank(row))
        .map(|row| -> Result<Node, SnapshotError> {
            let vector = columns.get(&row, "vector");
            Ok(Node {
                id: NodeId::from_string(columns.get(&row, "id"))
                    .map_err(|e| SnapshotError::InvalidRecord(format!("bad node id: {}", e)))?,
                node_type: columns.get(&row, "type").to_string(),
                label: columns.get(&row, "label").to_string(),
                properties: parse_properties(columns.get(&row, "properties"))?,
                vector: if vector.is_empty() {
                    None
                } else {
                    Some(serde_json::from_str(vector)?)
                },
                created_at: parse_time(columns.get(&row, "createdAt"))?,
                updated_at: parse_time(columns.get(&row, "updatedAt"))?,
            })
        })
        .collect()
}

pub fn relationships_from_csv(content: &str) -> Result<Vec<Relationship>, SnapshotError> {
    let mut rows = parse_csv(content)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = Columns::new(&header, &RELATIONSHIP_HEADER)?;

    rows.filter(|row| !is_blank(row))
        .map(|row| -> Result<Relationship, SnapshotError> {
            let node_id = |name: &str| {
                NodeId::from_string(columns.get(&row, name))
                    .map_err(|e| SnapshotError::InvalidRecord(format!("bad {}: {}", name, e)))
            };
            Ok(Relationship {
                id: RelationshipId::from_string(columns.get(&row, "id")).map_err(|e| {
                    SnapshotError::InvalidRecord(format!("bad relationship id: {}", e))
                })?,
                relationship_type: columns.get(&row, "type").to_string(),
                label: columns.get(&row, "label").to_string(),
                properties: parse_properties(columns.get(&row, "properties"))?,
                source_node_id: node_id("sourceNodeId")?,
                target_node_id: node_id("targetNodeId")?,
                created_at: parse_time(columns.get(&row, "createdAt"))?,
                updated_at: parse_time(columns.get(&row, "updatedAt"))?,
            })
        })
        .collect()
}

/// Header name → column position
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(header: &[String], required: &[&str]) -> Result<Self, SnapshotError> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        if let Some(missing) = required.iter().find(|name| !index.contains_key(**name)) {
            return Err(SnapshotError::InvalidRecord(format!(
                "CSV header is missing column '{}'",
                missing
            )));
        }
        Ok(Self { index })
    }

    fn get<'r>(&self, row: &'r [String], name: &str) -> &'r str {
        self.index
            .get(name)
            .and_then(|i| row.get(*i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|field| field.is_empty())
}

fn parse_properties(field: &str) -> Result<Properties, SnapshotError> {
    if field.trim().is_empty() {
        return Ok(Properties::new());
    }
    Ok(serde_json::from_str(field)?)
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn parse_time(field: &str) -> Result<DateTime<Utc>, SnapshotError> {
    DateTime::parse_from_rfc3339(field.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SnapshotError::InvalidRecord(format!("bad timestamp '{}': {}", field, e)))
}

fn push_row(output: &mut String, fields: impl IntoIterator<Item = String>) {
    let line: Vec<String> = fields.into_iter().map(|f| csv_escape(&f)).collect();
    output.push_str(&line.join(","));
    output.push_str("\r\n");
}

/// Quote a field when it needs it, doubling inner quotes
fn csv_escape(s: &str) -> String {
    let needs_quotes = s.contains(',')
        || s.contains('"')
        || s.contains('\n')
        || s.contains('\r')
        || s.starts_with(' ')
        || s.ends_with(' ');

    if needs_quotes {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Split RFC 4180 content into rows of fields
fn parse_csv(content: &str) -> Result<Vec<Vec<String>>, SnapshotError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(SnapshotError::InvalidRecord(
            "unterminated quoted CSV field".to_string(),
        ));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strand_core::NewNode;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse_csv("a,\"b,c\",\"d\"\"e\"\r\n\"multi\nline\",x,\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b,c", "d\"e"]);
        assert_eq!(rows[1], vec!["multi\nline", "x", ""]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(parse_csv("\"open,field\n").is_err());
    }

    #[test]
    fn test_nodes_round_trip() {
        let nodes = vec![
            Node::from_input(
                NewNode::new("NOTE", "Hello, \"world\"")
                    .with_property("tags", json!(["a", "b"]))
                    .with_vector(vec![0.1, -0.2]),
            ),
            Node::from_input(NewNode::new("CONCEPT", "line\nbreak")),
        ];

        let content = nodes_to_csv(&nodes).unwrap();
        assert!(content.starts_with("id,type,label,properties,vector,createdAt,updatedAt\r\n"));

        let parsed = nodes_from_csv(&content).unwrap();
        assert_eq!(parsed, nodes);
    }

    #[test]
    fn test_relationships_round_trip() {
        let a = NodeId::new();
        let b = NodeId::new();
        let relationships = vec![Relationship::new(a, b, "DEPENDS_ON")];

        let content = relationships_to_csv(&relationships).unwrap();
        let parsed = relationships_from_csv(&content).unwrap();
        assert_eq!(parsed, relationships);
    }

    #[test]
    fn test_missing_column() {
        let err = nodes_from_csv("id,type\r\n").unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidRecord(_)));
    }
}
