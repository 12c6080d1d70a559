//! Strand Storage - Graph store backends and snapshot I/O
//!
//! This crate provides the in-memory and ReDB implementations of
//! `strand_core::GraphStore`, plus JSON, CSV and GraphML snapshots that
//! work with any store.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod memory;
pub mod snapshot;

#[cfg(feature = "redb")]
pub mod redb;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryGraph;
pub use snapshot::{
    apply_snapshot, export_graph, import_graph, import_graph_with_stats, read_snapshot,
    write_snapshot, ImportStats, MergeStrategy, SnapshotError, SnapshotFormat,
};

#[cfg(feature = "redb")]
pub use self::redb::RedbGraph;
