//! JSON snapshot codec: `{ "nodes": [...], "relationships": [...] }`

use crate::error::StorageResult;
use std::path::Path;
use strand_core::Graph;

pub fn to_json(graph: &Graph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

pub fn from_json(content: &str) -> serde_json::Result<Graph> {
    serde_json::from_str(content)
}

/// Write a snapshot next to `path` and rename it into place
pub async fn write_json_file(path: &Path, graph: &Graph) -> StorageResult<()> {
    let content = to_json(graph)?;
    super::write_atomic(path, &content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::{NewNode, Node, Relationship};

    #[test]
    fn test_json_round_trip() {
        let a = Node::from_input(NewNode::new("CONCEPT", "Alpha").with_property("x", 1));
        let b = Node::from_input(NewNode::new("CONCEPT", "Beta").with_vector(vec![0.5, 0.25]));
        let relationship = Relationship::new(a.id, b.id, "RELATED_TO");
        let graph = Graph::new()
            .with_nodes(vec![a, b])
            .with_relationships(vec![relationship]);

        let content = to_json(&graph).unwrap();
        assert!(content.contains("\"sourceNodeId\""));

        let parsed = from_json(&content).unwrap();
        assert_eq!(parsed, graph);
    }

    #[tokio::test]
    async fn test_write_json_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("graph.json");

        write_json_file(&path, &Graph::new()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_json(&content).unwrap(), Graph::new());
    }
}
