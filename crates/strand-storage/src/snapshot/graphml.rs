//! GraphML snapshot codec
//!
//! Nodes and edges carry `<data>` elements for every field. Properties and
//! vectors are embedded as JSON text.

use super::csv::parse_time;
use super::SnapshotError;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use strand_core::{Graph, Node, NodeId, Properties, Relationship, RelationshipId};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns
         http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
  <key id="d0" for="node" attr.name="type" attr.type="string"/>
  <key id="d1" for="node" attr.name="label" attr.type="string"/>
  <key id="d2" for="node" attr.name="properties" attr.type="string"/>
  <key id="d3" for="node" attr.name="vector" attr.type="string"/>
  <key id="d4" for="node" attr.name="createdAt" attr.type="string"/>
  <key id="d5" for="node" attr.name="updatedAt" attr.type="string"/>
  <key id="e0" for="edge" attr.name="type" attr.type="string"/>
  <key id="e1" for="edge" attr.name="label" attr.type="string"/>
  <key id="e2" for="edge" attr.name="properties" attr.type="string"/>
  <key id="e3" for="edge" attr.name="createdAt" attr.type="string"/>
  <key id="e4" for="edge" attr.name="updatedAt" attr.type="string"/>
"#;

pub fn to_graphml(graph: &Graph) -> Result<String, SnapshotError> {
    let mut xml = String::from(HEADER);
    xml.push_str("  <graph id=\"G\" edgedefault=\"directed\">\n");

    for node in &graph.nodes {
        xml.push_str(&format!("    <node id=\"{}\">\n", node.id));
        push_data(&mut xml, "d0", &node.node_type);
        push_data(&mut xml, "d1", &node.label);
        push_data(&mut xml, "d2", &serde_json::to_string(&node.properties)?);
        if let Some(vector) = &node.vector {
            push_data(&mut xml, "d3", &serde_json::to_string(vector)?);
        }
        push_data(&mut xml, "d4", &format_time(&node.created_at));
        push_data(&mut xml, "d5", &format_time(&node.updated_at));
        xml.push_str("    </node>\n");
    }

    for relationship in &graph.relationships {
        xml.push_str(&format!(
            "    <edge id=\"{}\" source=\"{}\" target=\"{}\">\n",
            relationship.id, relationship.source_node_id, relationship.target_node_id
        ));
        push_data(&mut xml, "e0", &relationship.relationship_type);
        push_data(&mut xml, "e1", &relationship.label);
        push_data(&mut xml, "e2", &serde_json::to_string(&relationship.properties)?);
        push_data(&mut xml, "e3", &format_time(&relationship.created_at));
        push_data(&mut xml, "e4", &format_time(&relationship.updated_at));
        xml.push_str("    </edge>\n");
    }

    xml.push_str("  </graph>\n</graphml>\n");
    Ok(xml)
}

fn push_data(xml: &mut String, key: &str, value: &str) {
    xml.push_str(&format!(
        "      <data key=\"{}\">{}</data>\n",
        key,
        xml_escape(value)
    ));
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('\r', "&#13;")
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// A `<node>` or `<edge>` being read
#[derive(Debug, Default)]
struct Element {
    is_edge: bool,
    attributes: HashMap<String, String>,
    data: HashMap<String, String>,
}

impl Element {
    fn attribute(&self, name: &str) -> Result<&str, SnapshotError> {
        self.attributes.get(name).map(String::as_str).ok_or_else(|| {
            SnapshotError::InvalidRecord(format!("GraphML element is missing '{}'", name))
        })
    }

    fn data(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    fn time(&self, name: &str) -> Result<DateTime<Utc>, SnapshotError> {
        match self.data(name) {
            Some(value) => parse_time(value),
            None => Ok(Utc::now()),
        }
    }

    fn properties(&self) -> Result<Properties, SnapshotError> {
        match self.data("properties").filter(|p| !p.trim().is_empty()) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Properties::new()),
        }
    }

    fn node_type(&self) -> Result<String, SnapshotError> {
        self.data("type").map(str::to_string).ok_or_else(|| {
            SnapshotError::InvalidRecord("GraphML element has no type".to_string())
        })
    }

    fn into_node(self) -> Result<Node, SnapshotError> {
        let id = self.attribute("id")?;
        let vector = match self.data("vector").filter(|v| !v.trim().is_empty()) {
            Some(json) => Some(serde_json::from_str(json)?),
            None => None,
        };
        Ok(Node {
            id: NodeId::from_string(id)
                .map_err(|e| SnapshotError::InvalidRecord(format!("bad node id '{}': {}", id, e)))?,
            node_type: self.node_type()?,
            label: self.data("label").unwrap_or_default().to_string(),
            properties: self.properties()?,
            vector,
            created_at: self.time("createdAt")?,
            updated_at: self.time("updatedAt")?,
        })
    }

    fn into_relationship(self) -> Result<Relationship, SnapshotError> {
        let parse_node = |name: &str| -> Result<NodeId, SnapshotError> {
            let value = self.attribute(name)?;
            NodeId::from_string(value).map_err(|e| {
                SnapshotError::InvalidRecord(format!("bad edge {} '{}': {}", name, value, e))
            })
        };
        let id = self.attribute("id")?;
        Ok(Relationship {
            id: RelationshipId::from_string(id)
                .map_err(|e| SnapshotError::InvalidRecord(format!("bad edge id '{}': {}", id, e)))?,
            relationship_type: self.node_type()?,
            label: self.data("label").unwrap_or_default().to_string(),
            properties: self.properties()?,
            source_node_id: parse_node("source")?,
            target_node_id: parse_node("target")?,
            created_at: self.time("createdAt")?,
            updated_at: self.time("updatedAt")?,
        })
    }
}

fn attributes(start: &BytesStart<'_>) -> Result<HashMap<String, String>, SnapshotError> {
    let mut map = HashMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        map.insert(key, attribute.unescape_value()?.into_owned());
    }
    Ok(map)
}

/// Parse a GraphML document. `<key>` declarations map data keys to field
/// names; undeclared keys are used as field names directly.
pub fn from_graphml(content: &str) -> Result<Graph, SnapshotError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut key_names: HashMap<String, String> = HashMap::new();
    let mut graph = Graph::new();
    let mut current: Option<Element> = None;
    let mut data_key: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => match start.local_name().as_ref() {
                b"node" | b"edge" => {
                    current = Some(Element {
                        is_edge: start.local_name().as_ref() == b"edge",
                        attributes: attributes(&start)?,
                        data: HashMap::new(),
                    });
                }
                b"data" if current.is_some() => {
                    let attrs = attributes(&start)?;
                    data_key = attrs.get("key").cloned();
                    text.clear();
                }
                b"key" => register_key(&mut key_names, &start)?,
                _ => {}
            },
            Event::Empty(start) => match start.local_name().as_ref() {
                b"key" => register_key(&mut key_names, &start)?,
                b"node" => {
                    let element = Element {
                        is_edge: false,
                        attributes: attributes(&start)?,
                        data: HashMap::new(),
                    };
                    graph.nodes.push(element.into_node()?);
                }
                b"edge" => {
                    let element = Element {
                        is_edge: true,
                        attributes: attributes(&start)?,
                        data: HashMap::new(),
                    };
                    graph.relationships.push(element.into_relationship()?);
                }
                _ => {}
            },
            Event::Text(content) if data_key.is_some() => {
                text.push_str(&content.unescape()?);
            }
            Event::CData(content) if data_key.is_some() => {
                let raw = content.into_inner();
                let decoded = std::str::from_utf8(&raw).map_err(|e| {
                    SnapshotError::InvalidRecord(format!("CDATA is not UTF-8: {}", e))
                })?;
                text.push_str(decoded);
            }
            Event::End(end) => match end.local_name().as_ref() {
                b"data" => {
                    if let (Some(key), Some(element)) = (data_key.take(), current.as_mut()) {
                        let name = key_names.get(&key).cloned().unwrap_or(key);
                        element.data.insert(name, std::mem::take(&mut text));
                    }
                }
                b"node" | b"edge" => {
                    if let Some(element) = current.take() {
                        if element.is_edge {
                            graph.relationships.push(element.into_relationship()?);
                        } else {
                            graph.nodes.push(element.into_node()?);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof if current.is_some() => {
                return Err(SnapshotError::InvalidRecord(
                    "GraphML document ends inside an element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(graph)
}

fn register_key(
    key_names: &mut HashMap<String, String>,
    start: &BytesStart<'_>,
) -> Result<(), SnapshotError> {
    let attrs = attributes(start)?;
    if let (Some(id), Some(name)) = (attrs.get("id"), attrs.get("attr.name")) {
        key_names.insert(id.clone(), name.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strand_core::NewNode;

    fn sample() -> Graph {
        let a = Node::from_input(
            NewNode::new("CONCEPT", "Fish & <Chips>")
                .with_property("quote", json!("it's \"quoted\""))
                .with_vector(vec![1.0, 0.5]),
        );
        let b = Node::from_input(NewNode::new("NOTE", ""));
        let relationship = Relationship::new(a.id, b.id, "RELATED_TO");
        Graph::new()
            .with_nodes(vec![a, b])
            .with_relationships(vec![relationship])
    }

    #[test]
    fn test_graphml_round_trip() {
        let graph = sample();
        let xml = to_graphml(&graph).unwrap();
        assert!(xml.contains("<graphml"));
        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));

        let parsed = from_graphml(&xml).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_undeclared_keys_and_cdata() {
        let id = NodeId::new();
        let xml = format!(
            r#"<graphml><graph>
                 <node id="{}">
                   <data key="type">NOTE</data>
                   <data key="label"><![CDATA[a <raw> label]]></data>
                 </node>
               </graph></graphml>"#,
            id
        );

        let graph = from_graphml(&xml).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, id);
        assert_eq!(graph.nodes[0].label, "a <raw> label");
        assert!(graph.nodes[0].properties.is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(from_graphml("<graphml><graph><node id=\"x\"></graph>").is_err());
    }

    #[test]
    fn test_edge_without_source() {
        let xml = format!(
            r#"<graphml><graph><edge id="{}" target="{}"><data key="type">X</data></edge></graph></graphml>"#,
            RelationshipId::new(),
            NodeId::new()
        );
        assert!(matches!(
            from_graphml(&xml),
            Err(SnapshotError::InvalidRecord(_))
        ));
    }
}
