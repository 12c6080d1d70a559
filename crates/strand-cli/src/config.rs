//! CLI configuration, stored as `config.toml` in the data directory

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strand_core::GraphConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strand")
}

pub fn config_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Which `GraphStore` implementation backs the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory graph with a JSON snapshot file
    #[default]
    Memory,
    /// ReDB database file
    Redb,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redb => write!(f, "redb"),
        }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    /// Load `config.toml` from `data_dir`, falling back to defaults when absent
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = config_file_path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_file_path(data_dir), content)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "backend",
            "graph.enable_vector_search",
            "graph.vector_dimension",
            "graph.snapshot_path",
            "graph.autosave_interval_secs",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "backend" => Some(self.backend.to_string()),
            "graph.enable_vector_search" => Some(self.graph.enable_vector_search.to_string()),
            "graph.vector_dimension" => Some(self.graph.vector_dimension.to_string()),
            "graph.snapshot_path" => self
                .graph
                .snapshot_path
                .as_ref()
                .map(|p| p.display().to_string()),
            "graph.autosave_interval_secs" => {
                self.graph.autosave_interval_secs.map(|s| s.to_string())
            }
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "backend" => {
                self.backend = Backend::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid backend '{}': {}", value, e))?;
            }
            "graph.enable_vector_search" => self.graph.enable_vector_search = value.parse()?,
            "graph.vector_dimension" => self.graph.vector_dimension = value.parse()?,
            "graph.snapshot_path" => {
                self.graph.snapshot_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "graph.autosave_interval_secs" => {
                self.graph.autosave_interval_secs = if value.is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
