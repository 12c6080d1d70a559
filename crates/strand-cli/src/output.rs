//! Output formatting utilities

use serde::Serialize;
use strand_core::{GraphPath, Node, Relationship};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

pub fn node_line(node: &Node) -> String {
    format!("{}  {} ({})", node.id, node.label, node.node_type)
}

pub fn relationship_line(relationship: &Relationship) -> String {
    let label = if relationship.label.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", relationship.label)
    };
    format!(
        "{}  {} -[{}]-> {}{}",
        relationship.id,
        relationship.source_node_id,
        relationship.relationship_type,
        relationship.target_node_id,
        label
    )
}

/// `A -[TYPE]- B -[TYPE]- C`
pub fn path_line(path: &GraphPath) -> String {
    let mut line = String::new();
    for (i, node) in path.nodes.iter().enumerate() {
        if i > 0 {
            if let Some(relationship) = path.relationships.get(i - 1) {
                line.push_str(&format!(" -[{}]- ", relationship.relationship_type));
            }
        }
        line.push_str(&node.label);
    }
    line
}

pub fn print_node_details(node: &Node) {
    println!("Node: {}", node.label);
    println!("  Id: {}", node.id);
    println!("  Type: {}", node.node_type);
    println!("  Created: {}", node.created_at);
    println!("  Updated: {}", node.updated_at);

    if !node.properties.is_empty() {
        println!("  Properties:");
        let mut keys: Vec<&String> = node.properties.keys().collect();
        keys.sort();
        for key in keys {
            println!("    {} = {}", key, node.properties[key]);
        }
    }
    if let Some(vector) = &node.vector {
        println!("  Vector: {} dimensions", vector.len());
    }
}
