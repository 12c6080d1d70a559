//! Traverse command

use clap::Args;

use super::parse_node_id;
use crate::output::{node_line, path_line, print_json, OutputFormat};
use crate::{AppContext, Cli};
use strand_core::{Direction, TraversalEngine, TraversalOptions};

#[derive(Args)]
pub struct TraverseArgs {
    /// Start node id
    pub start: String,

    /// Maximum hops from the start node
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Maximum number of nodes returned
    #[arg(short, long, default_value = "100")]
    pub limit: usize,

    /// Direction: outgoing, incoming or both
    #[arg(long, default_value = "both")]
    pub direction: Direction,

    /// Only follow these relationship types
    #[arg(long = "rel-type")]
    pub rel_type: Vec<String>,

    /// Only visit these node types
    #[arg(short = 't', long = "type")]
    pub node_type: Vec<String>,

    /// Print every path instead of the node list
    #[arg(long)]
    pub paths: bool,
}

pub async fn run(args: &TraverseArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let start = parse_node_id(&args.start)?;
    let options = TraversalOptions::new()
        .with_direction(args.direction)
        .with_depth(args.depth)
        .with_limit(args.limit)
        .filter_relationship_types(args.rel_type.clone())
        .filter_node_types(args.node_type.clone());

    let result = TraversalEngine::new(ctx.store.as_ref())
        .traverse(&start, &options)
        .await?;

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!(
                "Reached {} nodes via {} relationships (depth {}{})",
                result.nodes.len(),
                result.relationships.len(),
                result.stats.max_depth_reached,
                if result.stats.limit_reached {
                    ", limit reached"
                } else {
                    ""
                }
            );
            if args.paths {
                for path in &result.paths {
                    println!("  {}", path_line(path));
                }
            } else {
                for node in &result.nodes {
                    println!("  {}", node_line(node));
                }
            }
        }
    }

    Ok(())
}
