//! Vector similarity search over node embeddings

use crate::error::Result;
use crate::node::Node;
use crate::similarity::cosine_similarity;
use serde::{Deserialize, Serialize};

/// Vector search query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    /// Query embedding
    pub vector: Vec<f32>,

    /// Filter by node types (empty = all types)
    #[serde(default)]
    pub node_types: Vec<String>,

    /// Drop results strictly below this similarity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f32>,

    /// Maximum results to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl VectorQuery {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            ..Default::default()
        }
    }

    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.push(node_type.into());
        self
    }

    pub fn with_min_similarity(mut self, min: f32) -> Self {
        self.min_similarity = Some(min);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A node with its similarity to the query vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredNode {
    pub node: Node,
    pub similarity: f32,
}

/// Score, rank and trim candidate nodes for a vector query.
///
/// `min_similarity` is applied before `limit` when both are present.
pub fn rank_nodes<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    query: &VectorQuery,
) -> Result<Vec<ScoredNode>> {
    let mut scored = Vec::new();

    for node in nodes {
        let Some(embedding) = node.vector.as_ref() else {
            continue;
        };
        if !query.node_types.is_empty() && !query.node_types.contains(&node.node_type) {
            continue;
        }

        let similarity = cosine_similarity(&query.vector, embedding)?;
        // NaN or infinite components leave nothing to rank by
        if !similarity.is_finite() {
            continue;
        }
        if query.min_similarity.is_some_and(|min| similarity < min) {
            continue;
        }
        scored.push(ScoredNode {
            node: node.clone(),
            similarity,
        });
    }

    // Sort by similarity descending
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    if let Some(limit) = query.limit {
        scored.truncate(limit);
    }

    tracing::debug!(
        "Vector search ranked {} nodes (min_similarity={:?}, limit={:?})",
        scored.len(),
        query.min_similarity,
        query.limit
    );

    Ok(scored)
}
