//! Declarative schema document for the graph store.
//!
//! Renders the registry as a `schema_config.yaml`: one entry per node and
//! edge type with its ontology parent, representation, preferred identifier
//! and property types. The document is informational; the adapter never reads
//! it back.

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::entity::{EdgeType, NodeType};
use crate::error::SerializationError;
use crate::schema_registry::{edge_schema, node_schema, PropertyRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Node,
    Edge,
}

/// One entry of the schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    pub represented_as: Representation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_id: Option<String>,
    pub input_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

/// Schema document keyed by ontology class name (`transcription factor`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDeclaration {
    pub entries: IndexMap<String, SchemaEntry>,
}

fn class_name(tag: &str) -> String {
    tag.to_case(Case::Lower)
}

fn declared_properties(rules: &[PropertyRule]) -> IndexMap<String, String> {
    rules
        .iter()
        .map(|rule| (rule.property.to_string(), rule.coercion.declared_type().to_string()))
        .collect()
}

impl SchemaDeclaration {
    /// Build the document from the static registry.
    pub fn from_registry() -> Self {
        let mut entries = IndexMap::new();

        for node_type in NodeType::ALL {
            let schema = node_schema(node_type);
            entries.insert(
                class_name(node_type.tag()),
                SchemaEntry {
                    is_a: schema.is_a.map(str::to_string),
                    represented_as: Representation::Node,
                    preferred_id: Some(schema.preferred_id.to_string()),
                    input_label: node_type.tag().to_string(),
                    source: None,
                    target: None,
                    properties: declared_properties(schema.properties),
                },
            );
        }

        for edge_type in EdgeType::ALL {
            let schema = edge_schema(edge_type);
            entries.insert(
                class_name(edge_type.tag()),
                SchemaEntry {
                    is_a: schema.is_a.map(str::to_string),
                    represented_as: Representation::Edge,
                    preferred_id: None,
                    input_label: edge_type.tag().to_string(),
                    source: Some(class_name(NodeType::TranscriptionFactor.tag())),
                    target: Some(class_name(NodeType::Gene.tag())),
                    properties: declared_properties(schema.properties),
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, class: &str) -> Option<&SchemaEntry> {
        self.entries.get(class)
    }

    pub fn to_yaml(&self) -> Result<String, SerializationError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SerializationError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SerializationError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}
