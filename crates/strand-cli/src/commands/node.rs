//! Node commands

use clap::{Args, Subcommand};

use super::{parse_node_id, parse_properties, parse_vector};
use crate::output::{node_line, print_json, print_node_details, OutputFormat};
use crate::{AppContext, Cli};
use strand_core::{Direction, NewNode, NodeQuery, NodeUpdate, OrderDirection};

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a new node
    Add {
        /// Node label
        label: String,
        /// Node type
        #[arg(short = 't', long)]
        r#type: String,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
        /// Embedding as comma-separated floats
        #[arg(long)]
        vector: Option<String>,
    },
    /// Get node details
    Get {
        /// Node id
        id: String,
    },
    /// List nodes
    List {
        /// Filter by type (repeatable)
        #[arg(short = 't', long)]
        r#type: Vec<String>,
        /// Filter by exact label
        #[arg(long)]
        label: Option<String>,
        /// Filter by property key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
        /// Order by id, type, label, createdAt, updatedAt or a property key
        #[arg(long)]
        order_by: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Skip this many results
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Update an existing node
    Update {
        /// Node id
        id: String,
        /// New label
        #[arg(long)]
        label: Option<String>,
        /// Property to merge as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
        /// Replace the embedding
        #[arg(long, conflicts_with = "clear_vector")]
        vector: Option<String>,
        /// Remove the embedding
        #[arg(long)]
        clear_vector: bool,
    },
    /// Delete a node and its relationships
    Delete {
        /// Node id
        id: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
    /// List neighbors of a node
    Related {
        /// Node id
        id: String,
        /// Direction: outgoing, incoming or both
        #[arg(long, default_value = "both")]
        direction: Direction,
        /// Only follow these relationship types
        #[arg(long = "rel-type")]
        rel_type: Vec<String>,
        /// Only return these node types
        #[arg(short = 't', long = "type")]
        node_type: Vec<String>,
    },
}

pub async fn run(args: &NodeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = OutputFormat::from(cli.format.as_str());
    let store = ctx.store.as_ref();

    match &args.command {
        NodeCommands::Add {
            label,
            r#type,
            prop,
            vector,
        } => {
            let mut input = NewNode::new(r#type.as_str(), label.as_str());
            input.properties = parse_properties(prop)?;
            if let Some(raw) = vector {
                input = input.with_vector(parse_vector(raw)?);
            }

            let node = store.create_node(input).await?;
            tracing::info!("Created node: {} ({})", node.id, node.node_type);

            match format {
                OutputFormat::Json => print_json(&node)?,
                OutputFormat::Table => println!("Created node: {}", node_line(&node)),
            }
        }
        NodeCommands::Get { id } => {
            let id = parse_node_id(id)?;
            match store.get_node(&id).await? {
                Some(node) => match format {
                    OutputFormat::Json => print_json(&node)?,
                    OutputFormat::Table => print_node_details(&node),
                },
                None => println!("Node '{}' not found", id),
            }
        }
        NodeCommands::List {
            r#type,
            label,
            prop,
            order_by,
            desc,
            offset,
            limit,
        } => {
            let mut query = NodeQuery::new().paginate(*offset, *limit);
            query.types = r#type.clone();
            query.labels = label.iter().cloned().collect();
            query.properties = parse_properties(prop)?;
            if let Some(field) = order_by {
                let direction = if *desc {
                    OrderDirection::Desc
                } else {
                    OrderDirection::Asc
                };
                query = query.order_by(field.as_str(), direction);
            }

            let nodes = store.query_nodes(&query).await?;
            tracing::info!("Found {} nodes", nodes.len());

            match format {
                OutputFormat::Json => print_json(&nodes)?,
                OutputFormat::Table if nodes.is_empty() => println!("No nodes found"),
                OutputFormat::Table => {
                    println!("Nodes ({} found):", nodes.len());
                    for node in &nodes {
                        println!("  {}", node_line(node));
                    }
                }
            }
        }
        NodeCommands::Update {
            id,
            label,
            prop,
            vector,
            clear_vector,
        } => {
            let id = parse_node_id(id)?;
            let mut update = NodeUpdate::new();
            update.label = label.clone();
            if !prop.is_empty() {
                update.properties = Some(parse_properties(prop)?);
            }
            if let Some(raw) = vector {
                update = update.vector(Some(parse_vector(raw)?));
            } else if *clear_vector {
                update = update.vector(None);
            }

            match store.update_node(&id, update).await? {
                Some(node) => match format {
                    OutputFormat::Json => print_json(&node)?,
                    OutputFormat::Table => println!("Updated node: {}", node_line(&node)),
                },
                None => println!("Node '{}' not found", id),
            }
        }
        NodeCommands::Delete { id, force } => {
            let id = parse_node_id(id)?;

            if !force {
                match store.get_node(&id).await? {
                    None => println!("Node '{}' not found", id),
                    Some(node) => {
                        let relationships = store.get_all_relationships(&id, &[]).await?;
                        println!(
                            "Use --force to delete node '{}' and {} relationships",
                            node.label,
                            relationships.len()
                        );
                    }
                }
                return Ok(());
            }

            if store.delete_node(&id).await? {
                tracing::info!("Deleted node: {}", id);
                println!("Deleted node: {}", id);
            } else {
                println!("Node '{}' not found", id);
            }
        }
        NodeCommands::Related {
            id,
            direction,
            rel_type,
            node_type,
        } => {
            let id = parse_node_id(id)?;
            let nodes = store
                .get_related_nodes(&id, rel_type, node_type, *direction)
                .await?;

            match format {
                OutputFormat::Json => print_json(&nodes)?,
                OutputFormat::Table if nodes.is_empty() => println!("No related nodes"),
                OutputFormat::Table => {
                    for node in &nodes {
                        println!("  {}", node_line(node));
                    }
                }
            }
        }
    }

    Ok(())
}
