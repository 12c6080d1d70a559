//! Snapshot import and export
//!
//! A snapshot is the whole graph in one of three formats. Export reads the
//! graph through [`GraphStore::read_graph`]; import applies a snapshot
//! under a [`MergeStrategy`].

pub mod csv;
pub mod graphml;
pub mod json;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use strand_core::{Graph, GraphStore, Node, NodeUpdate, Relationship, RelationshipUpdate};
use thiserror::Error;

pub use self::csv::{
    nodes_from_csv, nodes_to_csv, relationships_from_csv, relationships_to_csv, NODES_FILE,
    RELATIONSHIPS_FILE,
};
pub use self::graphml::{from_graphml, to_graphml};
pub use self::json::{from_json, to_json};

/// Snapshot errors with their cause
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Graph error: {0}")]
    Graph(#[from] strand_core::Error),
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Json,
    /// A directory holding `nodes.csv` and `relationships.csv`
    Csv,
    #[serde(rename = "graphml")]
    GraphMl,
}

impl SnapshotFormat {
    /// Guess the format from a path: `.json`, `.graphml`/`.xml`, or a
    /// directory / `.csv` path for CSV
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.parse().ok(),
            None if path.is_dir() => Some(Self::Csv),
            None => None,
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::GraphMl => write!(f, "graphml"),
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "graphml" | "xml" => Ok(Self::GraphMl),
            other => Err(format!("unknown snapshot format: {}", other)),
        }
    }
}

/// How an imported snapshot combines with the existing graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Clear the graph, then load the snapshot
    #[default]
    Replace,
    /// Update records whose id exists, add the rest
    Merge,
    /// Add only records whose id does not exist
    SkipDuplicates,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Merge => write!(f, "merge"),
            Self::SkipDuplicates => write!(f, "skip-duplicates"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            "skip" | "skip-duplicates" => Ok(Self::SkipDuplicates),
            other => Err(format!("unknown merge strategy: {}", other)),
        }
    }
}

/// Counts from one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub nodes_skipped: usize,
    pub relationships_created: usize,
    pub relationships_updated: usize,
    pub relationships_skipped: usize,
    /// Relationships whose endpoints were missing after node import
    pub relationships_dropped: usize,
}

/// Write `content` to a sibling temporary file and rename it into place
pub(crate) async fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, content.as_bytes()).await?;
    tokio::fs::rename(&tmp, path).await
}

/// Serialize the whole graph to `destination`
pub async fn write_snapshot<S: GraphStore + ?Sized>(
    store: &S,
    format: SnapshotFormat,
    destination: &Path,
) -> Result<(), SnapshotError> {
    let graph = store.read_graph().await?;

    match format {
        SnapshotFormat::Json => write_atomic(destination, &to_json(&graph)?).await?,
        SnapshotFormat::GraphMl => write_atomic(destination, &to_graphml(&graph)?).await?,
        SnapshotFormat::Csv => {
            tokio::fs::create_dir_all(destination).await?;
            write_atomic(&destination.join(NODES_FILE), &nodes_to_csv(&graph.nodes)?).await?;
            write_atomic(
                &destination.join(RELATIONSHIPS_FILE),
                &relationships_to_csv(&graph.relationships)?,
            )
            .await?;
        }
    }

    tracing::info!(
        "Exported {} nodes and {} relationships as {} to {:?}",
        graph.nodes.len(),
        graph.relationships.len(),
        format,
        destination
    );
    Ok(())
}

/// Parse a snapshot from `source` without touching any store
pub async fn read_snapshot(format: SnapshotFormat, source: &Path) -> Result<Graph, SnapshotError> {
    match format {
        SnapshotFormat::Json => Ok(from_json(&tokio::fs::read_to_string(source).await?)?),
        SnapshotFormat::GraphMl => from_graphml(&tokio::fs::read_to_string(source).await?),
        SnapshotFormat::Csv => {
            let nodes = nodes_from_csv(&tokio::fs::read_to_string(source.join(NODES_FILE)).await?)?;
            let relationships_path = source.join(RELATIONSHIPS_FILE);
            let relationships = if tokio::fs::try_exists(&relationships_path).await? {
                relationships_from_csv(&tokio::fs::read_to_string(&relationships_path).await?)?
            } else {
                Vec::new()
            };
            Ok(Graph {
                nodes,
                relationships,
            })
        }
    }
}

/// Apply a parsed snapshot to `store`
pub async fn apply_snapshot<S: GraphStore + ?Sized>(
    store: &S,
    graph: Graph,
    strategy: MergeStrategy,
) -> Result<ImportStats, SnapshotError> {
    let mut stats = ImportStats::default();

    if strategy == MergeStrategy::Replace {
        store.clear_graph(true).await?;
    }

    let mut new_nodes: Vec<Node> = Vec::new();
    for node in graph.nodes {
        let exists = strategy != MergeStrategy::Replace && store.get_node(&node.id).await?.is_some();
        match (exists, strategy) {
            (false, _) => new_nodes.push(node),
            (true, MergeStrategy::Merge) => {
                let update = NodeUpdate {
                    label: Some(node.label),
                    properties: Some(node.properties),
                    vector: node.vector.map(Some),
                };
                store.update_node(&node.id, update).await?;
                stats.nodes_updated += 1;
            }
            (true, _) => stats.nodes_skipped += 1,
        }
    }
    stats.nodes_created = store.restore_nodes(new_nodes).await?;

    let mut new_relationships: Vec<Relationship> = Vec::new();
    for relationship in graph.relationships {
        let exists = strategy != MergeStrategy::Replace
            && store.get_relationship(&relationship.id).await?.is_some();
        match (exists, strategy) {
            (false, _) => new_relationships.push(relationship),
            (true, MergeStrategy::Merge) => {
                let update = RelationshipUpdate {
                    label: Some(relationship.label),
                    properties: Some(relationship.properties),
                };
                store.update_relationship(&relationship.id, update).await?;
                stats.relationships_updated += 1;
            }
            (true, _) => stats.relationships_skipped += 1,
        }
    }

    let outcome = store.restore_relationships(new_relationships).await?;
    stats.relationships_created = outcome.created.len();
    stats.relationships_dropped = outcome.rejected.len();
    if stats.relationships_dropped > 0 {
        tracing::warn!(
            "Dropped {} imported relationships with missing endpoints",
            stats.relationships_dropped
        );
    }

    Ok(stats)
}

/// Read a snapshot and apply it, reporting what changed
pub async fn import_graph_with_stats<S: GraphStore + ?Sized>(
    store: &S,
    format: SnapshotFormat,
    source: &Path,
    strategy: MergeStrategy,
) -> Result<ImportStats, SnapshotError> {
    let graph = read_snapshot(format, source).await?;
    let stats = apply_snapshot(store, graph, strategy).await?;

    tracing::info!(
        "Imported {} from {:?} ({}): {:?}",
        format,
        source,
        strategy,
        stats
    );
    Ok(stats)
}

/// Export the graph; failures are logged and reported as `false`
pub async fn export_graph<S: GraphStore + ?Sized>(
    store: &S,
    format: SnapshotFormat,
    destination: &Path,
) -> bool {
    match write_snapshot(store, format, destination).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Export to {:?} failed: {}", destination, e);
            false
        }
    }
}

/// Import a snapshot; failures are logged and reported as `false`
pub async fn import_graph<S: GraphStore + ?Sized>(
    store: &S,
    format: SnapshotFormat,
    source: &Path,
    strategy: MergeStrategy,
) -> bool {
    match import_graph_with_stats(store, format, source, strategy).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Import from {:?} failed: {}", source, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert_eq!("graphml".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::GraphMl);
        assert!("yaml".parse::<SnapshotFormat>().is_err());
        assert_eq!(
            SnapshotFormat::from_path(Path::new("out/graph.graphml")),
            Some(SnapshotFormat::GraphMl)
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "skip_duplicates".parse::<MergeStrategy>().unwrap(),
            MergeStrategy::SkipDuplicates
        );
        assert_eq!(MergeStrategy::default(), MergeStrategy::Replace);
        assert_eq!(MergeStrategy::Merge.to_string(), "merge");
    }
}
