//! Import/Export, stats and clear commands

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::output::{print_json, OutputFormat};
use crate::{AppContext, Cli};
use strand_storage::{import_graph_with_stats, write_snapshot, MergeStrategy, SnapshotFormat};

/// Snapshot format
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum FormatArg {
    #[default]
    Json,
    /// A directory holding nodes.csv and relationships.csv
    Csv,
    #[value(name = "graphml")]
    GraphMl,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
            FormatArg::GraphMl => Self::GraphMl,
        }
    }
}

/// How imported records combine with the existing graph
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum StrategyArg {
    /// Clear the graph first
    #[default]
    Replace,
    /// Update existing ids, add new ones
    Merge,
    /// Only add ids not already present
    Skip,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Replace => Self::Replace,
            StrategyArg::Merge => Self::Merge,
            StrategyArg::Skip => Self::SkipDuplicates,
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file, or directory for csv
    pub output: PathBuf,

    /// Snapshot format (guessed from the path when omitted)
    #[arg(long = "as", value_enum)]
    pub snapshot_format: Option<FormatArg>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Input file, or directory for csv
    pub input: PathBuf,

    /// Snapshot format (guessed from the path when omitted)
    #[arg(long = "as", value_enum)]
    pub snapshot_format: Option<FormatArg>,

    /// Merge strategy
    #[arg(short, long, value_enum, default_value = "replace")]
    pub strategy: StrategyArg,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm removal of every node and relationship
    #[arg(long)]
    pub force: bool,
}

fn resolve_format(explicit: Option<FormatArg>, path: &std::path::Path) -> SnapshotFormat {
    explicit
        .map(SnapshotFormat::from)
        .or_else(|| SnapshotFormat::from_path(path))
        .unwrap_or(SnapshotFormat::Json)
}

pub async fn run_export(args: &ExportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = resolve_format(args.snapshot_format, &args.output);
    tracing::info!("Exporting {} to {:?}", format, args.output);

    write_snapshot(ctx.store.as_ref(), format, &args.output).await?;
    println!("Exported graph to {}", args.output.display());
    Ok(())
}

pub async fn run_import(args: &ImportArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = resolve_format(args.snapshot_format, &args.input);
    let strategy = MergeStrategy::from(args.strategy);
    tracing::info!("Importing {} from {:?} ({})", format, args.input, strategy);

    let stats = import_graph_with_stats(ctx.store.as_ref(), format, &args.input, strategy).await?;

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            println!(
                "Imported nodes: {} created, {} updated, {} skipped",
                stats.nodes_created, stats.nodes_updated, stats.nodes_skipped
            );
            println!(
                "Imported relationships: {} created, {} updated, {} skipped, {} dropped",
                stats.relationships_created,
                stats.relationships_updated,
                stats.relationships_skipped,
                stats.relationships_dropped
            );
        }
    }
    Ok(())
}

pub async fn run_stats(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let stats = ctx.store.get_graph_stats().await?;

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            println!("Nodes: {}", stats.node_count);
            for (node_type, count) in &stats.node_type_counts {
                println!("  {}: {}", node_type, count);
            }
            println!("Relationships: {}", stats.relationship_count);
            for (relationship_type, count) in &stats.relationship_type_counts {
                println!("  {}: {}", relationship_type, count);
            }
        }
    }
    Ok(())
}

pub async fn run_clear(args: &ClearArgs, ctx: &AppContext) -> anyhow::Result<()> {
    if !args.force {
        let stats = ctx.store.get_graph_stats().await?;
        println!(
            "Use --force to delete {} nodes and {} relationships",
            stats.node_count, stats.relationship_count
        );
        return Ok(());
    }

    ctx.store.clear_graph(true).await?;
    println!("Cleared graph");
    Ok(())
}
