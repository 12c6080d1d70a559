//! Graph engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by all graph store implementations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GraphConfig {
    /// Whether vector similarity search is available
    #[serde(default = "default_true")]
    pub enable_vector_search: bool,

    /// Expected embedding length. Advisory, not enforced on write.
    #[serde(default = "default_vector_dimension")]
    pub vector_dimension: usize,

    /// JSON snapshot file for the in-memory store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// Autosave interval in seconds (requires `snapshot_path`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_interval_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_vector_dimension() -> usize {
    1536
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enable_vector_search: default_true(),
            vector_dimension: default_vector_dimension(),
            snapshot_path: None,
            autosave_interval_secs: None,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector_search(mut self, enabled: bool) -> Self {
        self.enable_vector_search = enabled;
        self
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_autosave(mut self, interval_secs: u64) -> Self {
        self.autosave_interval_secs = Some(interval_secs);
        self
    }
}
