//! Strand Core - Graph engine for typed knowledge graphs
//!
//! This crate provides the data model, the `GraphStore` trait that every
//! storage backend implements, and the algorithms built on top of it:
//! traversal, path finding and vector similarity ranking.

pub mod config;
pub mod error;
pub mod graph;
pub mod limits;
pub mod node;
pub mod path;
pub mod query;
pub mod relationship;
pub mod similarity;
pub mod traversal;
pub mod vector;

pub use config::GraphConfig;
pub use error::{Error, Result};
pub use graph::{BatchOutcome, BatchRejection, Graph, GraphStats, GraphStore, Lifecycle};
pub use node::{NewNode, Node, NodeId, NodeUpdate, Properties};
pub use path::{PathFinder, DEFAULT_ALL_PATHS_DEPTH, DEFAULT_SHORTEST_PATH_DEPTH};
pub use query::{NodeQuery, OrderBy, OrderDirection, RelationshipQuery};
pub use relationship::{
    Direction, NewRelationship, Relationship, RelationshipId, RelationshipUpdate,
};
pub use similarity::cosine_similarity;
pub use traversal::{GraphPath, TraversalEngine, TraversalOptions, TraversalResult, TraversalStats};
pub use vector::{rank_nodes, ScoredNode, VectorQuery};

/// Re-exported so callers can build cancellation tokens without a direct dependency
pub use tokio_util::sync::CancellationToken;
