//! Record model for the graph produced by the adapter.
//!
//! Nodes and edges are plain values: an identifier, a closed type tag and an
//! ordered property map. They are built once per run and never mutated.

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the value of a single node or edge property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Float(f64),
    Null,
}

impl FieldValue {
    /// Wrap a raw cell, mapping empty text to `Null`.
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::String(trimmed.to_string())
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// Property name -> value, in schema order.
pub type Properties = IndexMap<String, FieldValue>;

/// Node categories the adapter can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Gene,
    TranscriptionFactor,
}

impl NodeType {
    pub const ALL: [NodeType; 2] = [NodeType::Gene, NodeType::TranscriptionFactor];

    /// Snake-case tag, e.g. `transcription_factor`.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeType::Gene => "gene",
            NodeType::TranscriptionFactor => "transcription_factor",
        }
    }

    /// Label used by the graph store (`TranscriptionFactor`).
    pub fn label(&self) -> String {
        self.tag().to_case(Case::Pascal)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Edge categories the adapter can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    TranscriptionalRegulation,
}

impl EdgeType {
    pub const ALL: [EdgeType; 1] = [EdgeType::TranscriptionalRegulation];

    pub fn tag(&self) -> &'static str {
        match self {
            EdgeType::TranscriptionalRegulation => "transcriptional_regulation",
        }
    }

    pub fn label(&self) -> String {
        self.tag().to_case(Case::Pascal)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A typed graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "label")]
    pub node_type: NodeType,
    /// Namespace the identifier is drawn from (e.g. `hgnc.symbol`).
    pub preferred_id: String,
    pub properties: Properties,
}

impl Node {
    pub fn property(&self, name: &str) -> Option<&FieldValue> {
        self.properties.get(name)
    }
}

/// A directed, typed graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Content hash over endpoints and properties.
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "label")]
    pub edge_type: EdgeType,
    pub properties: Properties,
}

impl Edge {
    pub fn property(&self, name: &str) -> Option<&FieldValue> {
        self.properties.get(name)
    }
}

/// Common behaviour of records handed to the load stage.
pub trait GraphRecord: Serialize {
    /// Store label this record is grouped under.
    fn label(&self) -> String;

    fn id(&self) -> &str;

    /// Convert record to JSON string
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Convert record to NDJSON line (newline-delimited JSON)
    fn to_ndjson_line(&self) -> Result<String, serde_json::Error> {
        let json = self.to_json()?;
        Ok(format!("{}\n", json))
    }
}

impl GraphRecord for Node {
    fn label(&self) -> String {
        self.node_type.label()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl GraphRecord for Edge {
    fn label(&self) -> String {
        self.edge_type.label()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tf_node() -> Node {
        let mut properties = Properties::new();
        properties.insert("name".to_string(), FieldValue::text("MYC"));
        properties.insert("category".to_string(), FieldValue::text("DNA-binding"));
        Node {
            id: "MYC".to_string(),
            node_type: NodeType::TranscriptionFactor,
            preferred_id: "hgnc.symbol".to_string(),
            properties,
        }
    }

    #[test]
    fn test_labels_are_pascal_case() {
        assert_eq!(NodeType::TranscriptionFactor.label(), "TranscriptionFactor");
        assert_eq!(NodeType::Gene.label(), "Gene");
        assert_eq!(
            EdgeType::TranscriptionalRegulation.label(),
            "TranscriptionalRegulation"
        );
    }

    #[test]
    fn test_empty_text_is_null() {
        assert_eq!(FieldValue::text("  "), FieldValue::Null);
        assert_eq!(
            FieldValue::text(" ExTRI "),
            FieldValue::String("ExTRI".to_string())
        );
    }

    #[test]
    fn test_node_to_json_keeps_property_order() {
        let json = tf_node().to_json().unwrap();
        assert!(json.contains("\"label\":\"transcription_factor\""));
        let name_at = json.find("\"name\"").unwrap();
        let category_at = json.find("\"category\"").unwrap();
        assert!(name_at < category_at);
    }

    #[test]
    fn test_ndjson_line_ends_with_newline() {
        let line = tf_node().to_ndjson_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
