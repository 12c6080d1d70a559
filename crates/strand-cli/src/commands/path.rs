//! Path commands

use clap::Args;

use super::parse_node_id;
use crate::output::{path_line, print_json, OutputFormat};
use crate::{AppContext, Cli};
use strand_core::{PathFinder, DEFAULT_ALL_PATHS_DEPTH, DEFAULT_SHORTEST_PATH_DEPTH};

#[derive(Args)]
pub struct PathArgs {
    /// Start node id
    pub start: String,

    /// End node id
    pub end: String,

    /// List every simple path instead of the shortest one
    #[arg(long)]
    pub all: bool,

    /// Maximum hops (default 5 for shortest, 3 for all)
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Only follow these relationship types
    #[arg(long = "rel-type")]
    pub rel_type: Vec<String>,
}

pub async fn run(args: &PathArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let start = parse_node_id(&args.start)?;
    let end = parse_node_id(&args.end)?;
    let finder = PathFinder::new(ctx.store.as_ref());
    let format = OutputFormat::from(cli.format.as_str());

    if args.all {
        let depth = args.max_depth.unwrap_or(DEFAULT_ALL_PATHS_DEPTH);
        let paths = finder.all_paths(&start, &end, &args.rel_type, depth).await?;

        match format {
            OutputFormat::Json => print_json(&paths)?,
            OutputFormat::Table if paths.is_empty() => {
                println!("No paths within {} hops", depth)
            }
            OutputFormat::Table => {
                println!("Paths ({} found):", paths.len());
                for path in &paths {
                    println!("  [{}] {}", path.length, path_line(path));
                }
            }
        }
        return Ok(());
    }

    let depth = args.max_depth.unwrap_or(DEFAULT_SHORTEST_PATH_DEPTH);
    let path = finder
        .shortest_path(&start, &end, &args.rel_type, depth)
        .await?;

    match (format, path) {
        (OutputFormat::Json, path) => print_json(&path)?,
        (OutputFormat::Table, Some(path)) => {
            println!("Shortest path ({} hops):", path.length);
            println!("  {}", path_line(&path));
        }
        (OutputFormat::Table, None) => println!("No path within {} hops", depth),
    }

    Ok(())
}
