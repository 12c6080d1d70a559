//! CLI command implementations

pub mod config;
pub mod io;
pub mod node;
pub mod path;
pub mod relationship;
pub mod search;
pub mod traverse;

use anyhow::Context;
use strand_core::{NodeId, Properties, RelationshipId};

/// Parse `key=value` pairs. Values that parse as JSON keep their type,
/// anything else is stored as a string.
pub fn parse_properties(pairs: &[String]) -> anyhow::Result<Properties> {
    let mut properties = Properties::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Property '{}' must look like key=value", pair))?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        properties.insert(key.trim().to_string(), value);
    }
    Ok(properties)
}

/// Parse a comma-separated embedding such as `0.1,0.2,0.3`
pub fn parse_vector(raw: &str) -> anyhow::Result<Vec<f32>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid vector component '{}'", part))
        })
        .collect()
}

pub fn parse_node_id(raw: &str) -> anyhow::Result<NodeId> {
    NodeId::from_string(raw).with_context(|| format!("Invalid node id '{}'", raw))
}

pub fn parse_relationship_id(raw: &str) -> anyhow::Result<RelationshipId> {
    RelationshipId::from_string(raw).with_context(|| format!("Invalid relationship id '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_properties() {
        let properties = parse_properties(&[
            "count=3".to_string(),
            "name=Ada Lovelace".to_string(),
            "tags=[\"a\"]".to_string(),
        ])
        .unwrap();

        assert_eq!(properties["count"], json!(3));
        assert_eq!(properties["name"], json!("Ada Lovelace"));
        assert_eq!(properties["tags"], json!(["a"]));
        assert!(parse_properties(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1, 0.5,-2").unwrap(), vec![1.0, 0.5, -2.0]);
        assert!(parse_vector("1,x").is_err());
    }
}
