//! Relationship commands

use clap::{Args, Subcommand};

use super::{parse_node_id, parse_properties, parse_relationship_id};
use crate::output::{print_json, relationship_line, OutputFormat};
use crate::{AppContext, Cli};
use strand_core::{Error, NewRelationship, RelationshipQuery, RelationshipUpdate};

#[derive(Args)]
pub struct RelationshipArgs {
    #[command(subcommand)]
    pub command: RelationshipCommands,
}

#[derive(Subcommand)]
pub enum RelationshipCommands {
    /// Add a relationship between two existing nodes
    Add {
        /// Source node id
        source: String,
        /// Target node id
        target: String,
        /// Relationship type
        #[arg(short = 't', long)]
        r#type: String,
        /// Relationship label
        #[arg(long, default_value = "")]
        label: String,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
    },
    /// Get relationship details
    Get {
        /// Relationship id
        id: String,
    },
    /// List relationships
    List {
        /// Only relationships leaving this node
        #[arg(long)]
        from: Option<String>,
        /// Only relationships entering this node
        #[arg(long)]
        to: Option<String>,
        /// Filter by type (repeatable)
        #[arg(short = 't', long)]
        r#type: Vec<String>,
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Update a relationship's label or properties
    Update {
        /// Relationship id
        id: String,
        #[arg(long)]
        label: Option<String>,
        /// Property to merge as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
    },
    /// Delete a relationship
    Delete {
        /// Relationship id
        id: String,
    },
}

pub async fn run(args: &RelationshipArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = OutputFormat::from(cli.format.as_str());
    let store = ctx.store.as_ref();

    match &args.command {
        RelationshipCommands::Add {
            source,
            target,
            r#type,
            label,
            prop,
        } => {
            let mut input =
                NewRelationship::new(parse_node_id(source)?, parse_node_id(target)?, r#type.as_str())
                    .with_label(label.as_str());
            input.properties = parse_properties(prop)?;

            let relationship = store.create_relationship(input).await?;
            tracing::info!("Created relationship: {}", relationship.id);

            match format {
                OutputFormat::Json => print_json(&relationship)?,
                OutputFormat::Table => {
                    println!("Created relationship: {}", relationship_line(&relationship))
                }
            }
        }
        RelationshipCommands::Get { id } => {
            let id = parse_relationship_id(id)?;
            let relationship = store
                .get_relationship(&id)
                .await?
                .ok_or_else(|| Error::RelationshipNotFound(id.to_string()))?;

            match format {
                OutputFormat::Json => print_json(&relationship)?,
                OutputFormat::Table => {
                    println!("{}", relationship_line(&relationship));
                    let mut keys: Vec<&String> = relationship.properties.keys().collect();
                    keys.sort();
                    for key in keys {
                        println!("  {} = {}", key, relationship.properties[key]);
                    }
                }
            }
        }
        RelationshipCommands::List {
            from,
            to,
            r#type,
            limit,
        } => {
            let mut query = RelationshipQuery::new().with_types(r#type);
            if let Some(from) = from {
                query = query.from_node(parse_node_id(from)?);
            }
            if let Some(to) = to {
                query = query.to_node(parse_node_id(to)?);
            }
            query.limit = Some(*limit);

            let relationships = store.query_relationships(&query).await?;
            tracing::info!("Found {} relationships", relationships.len());

            match format {
                OutputFormat::Json => print_json(&relationships)?,
                OutputFormat::Table if relationships.is_empty() => {
                    println!("No relationships found")
                }
                OutputFormat::Table => {
                    println!("Relationships ({} found):", relationships.len());
                    for relationship in &relationships {
                        println!("  {}", relationship_line(relationship));
                    }
                }
            }
        }
        RelationshipCommands::Update { id, label, prop } => {
            let id = parse_relationship_id(id)?;
            let mut update = RelationshipUpdate::new();
            update.label = label.clone();
            if !prop.is_empty() {
                update.properties = Some(parse_properties(prop)?);
            }

            let relationship = store
                .update_relationship(&id, update)
                .await?
                .ok_or_else(|| Error::RelationshipNotFound(id.to_string()))?;
            match format {
                OutputFormat::Json => print_json(&relationship)?,
                OutputFormat::Table => {
                    println!("Updated relationship: {}", relationship_line(&relationship))
                }
            }
        }
        RelationshipCommands::Delete { id } => {
            let id = parse_relationship_id(id)?;
            if store.delete_relationship(&id).await? {
                tracing::info!("Deleted relationship: {}", id);
                println!("Deleted relationship: {}", id);
            } else {
                println!("Relationship '{}' not found", id);
            }
        }
    }

    Ok(())
}
