//! Vector similarity search

use clap::Args;

use super::parse_vector;
use crate::output::{node_line, print_json, OutputFormat};
use crate::{AppContext, Cli};
use strand_core::VectorQuery;

#[derive(Args)]
pub struct SearchArgs {
    /// Query embedding as comma-separated floats
    pub vector: String,

    /// Only rank these node types
    #[arg(short = 't', long = "type")]
    pub node_type: Vec<String>,

    /// Drop results below this similarity
    #[arg(long)]
    pub min_similarity: Option<f32>,

    /// Maximum results
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

pub async fn run(args: &SearchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let mut query = VectorQuery::new(parse_vector(&args.vector)?).with_limit(args.limit);
    query.node_types = args.node_type.clone();
    if let Some(min) = args.min_similarity {
        query = query.with_min_similarity(min);
    }

    tracing::debug!("Vector search over {} dimensions", query.vector.len());
    let results = ctx.store.vector_search(&query).await?;

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table if results.is_empty() => println!("No matching nodes"),
        OutputFormat::Table => {
            for scored in &results {
                println!("  {:.4}  {}", scored.similarity, node_line(&scored.node));
            }
        }
    }

    Ok(())
}
