//! Strand CLI - Command line interface for the knowledge graph

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{io, node, path, relationship, search, traverse};
use config::{Backend, Config};
use strand_core::GraphStore;
use strand_storage::MemoryGraph;

const SNAPSHOT_FILE: &str = "graph.json";
#[cfg(feature = "redb")]
const REDB_FILE: &str = "strand.redb";

#[derive(Parser)]
#[command(name = "strand")]
#[command(author, version, about = "Typed knowledge graph with traversal and vector search")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "STRAND_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend (overrides config.toml)
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the data directory path
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(config::default_data_dir)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage nodes
    Node(node::NodeArgs),
    /// Manage relationships
    #[command(alias = "rel")]
    Relationship(relationship::RelationshipArgs),
    /// Breadth-first neighborhood of a node
    Traverse(traverse::TraverseArgs),
    /// Shortest path or all paths between two nodes
    Path(path::PathArgs),
    /// Rank nodes by vector similarity
    Search(search::SearchArgs),
    /// Show node and relationship counts
    Stats,
    /// Export the graph as json, csv or graphml
    Export(io::ExportArgs),
    /// Import a json, csv or graphml snapshot
    Import(io::ImportArgs),
    /// Remove every node and relationship
    Clear(io::ClearArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

/// Application context with the opened graph store
pub struct AppContext {
    pub store: Arc<dyn GraphStore>,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let backend = cli.backend.unwrap_or(config.backend);
        let store: Arc<dyn GraphStore> = match backend {
            Backend::Memory => {
                let mut graph_config = config.graph.clone();
                let snapshot = match graph_config.snapshot_path.take() {
                    Some(path) if path.is_relative() => data_dir.join(path),
                    Some(path) => path,
                    None => data_dir.join(SNAPSHOT_FILE),
                };
                tracing::debug!("Using snapshot at: {:?}", snapshot);
                Arc::new(MemoryGraph::new(graph_config.with_snapshot(snapshot)))
            }
            Backend::Redb => open_redb(&data_dir, config)?,
        };

        store.initialize().await?;
        Ok(Self { store })
    }

    /// Flush and stop the store
    pub async fn close(&self) -> anyhow::Result<()> {
        self.store.shutdown().await?;
        Ok(())
    }
}

#[cfg(feature = "redb")]
fn open_redb(data_dir: &Path, config: &Config) -> anyhow::Result<Arc<dyn GraphStore>> {
    let db_path = data_dir.join(REDB_FILE);
    tracing::debug!("Using database at: {:?}", db_path);
    let store = strand_storage::RedbGraph::open(&db_path, config.graph.clone())?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redb"))]
fn open_redb(_data_dir: &Path, _config: &Config) -> anyhow::Result<Arc<dyn GraphStore>> {
    anyhow::bail!("redb backend not enabled. Rebuild with --features redb")
}

async fn dispatch(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Node(args) => node::run(args, cli, ctx).await,
        Commands::Relationship(args) => relationship::run(args, cli, ctx).await,
        Commands::Traverse(args) => traverse::run(args, cli, ctx).await,
        Commands::Path(args) => path::run(args, cli, ctx).await,
        Commands::Search(args) => search::run(args, cli, ctx).await,
        Commands::Stats => io::run_stats(cli, ctx).await,
        Commands::Export(args) => io::run_export(args, cli, ctx).await,
        Commands::Import(args) => io::run_import(args, cli, ctx).await,
        Commands::Clear(args) => io::run_clear(args, ctx).await,
        // Handled before the store is opened
        Commands::Config(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting strand CLI");

    let data_dir = cli.data_dir();
    if let Commands::Config(args) = &cli.command {
        return commands::config::run(args, &data_dir);
    }

    let config = Config::load(&data_dir)?;
    let ctx = AppContext::new(&cli, &config).await?;

    let result = dispatch(&cli, &ctx).await;
    ctx.close().await?;
    result
}
