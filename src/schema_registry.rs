//! Static schema registry.
//!
//! Describes, for every node and edge type, which source column holds the
//! identifier and how source columns are renamed and coerced into properties.
//! The adapter consults this table; nothing mutates it at runtime.

use serde::{Deserialize, Serialize};

use crate::entity::{EdgeType, FieldValue, NodeType};
use crate::error::RowTransformError;

/// Source column holding the regulator identifier.
pub const SOURCE_COLUMN: &str = "source";
/// Source column holding the regulated gene identifier.
pub const TARGET_COLUMN: &str = "target";
pub const WEIGHT_COLUMN: &str = "weight";
pub const CATEGORY_COLUMN: &str = "TF.category";
pub const RESOURCES_COLUMN: &str = "resources";
pub const REFERENCES_COLUMN: &str = "PMID";
pub const SIGN_DECISION_COLUMN: &str = "sign.decision";

/// Header contract of the CollecTRI table, in file order.
pub const EXPECTED_COLUMNS: [&str; 7] = [
    SOURCE_COLUMN,
    TARGET_COLUMN,
    WEIGHT_COLUMN,
    CATEGORY_COLUMN,
    RESOURCES_COLUMN,
    REFERENCES_COLUMN,
    SIGN_DECISION_COLUMN,
];

/// Fields a node type can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeField {
    Symbol,
    Category,
}

impl NodeField {
    pub const ALL: [NodeField; 2] = [NodeField::Symbol, NodeField::Category];
}

/// Fields a transcriptional regulation edge can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeField {
    Weight,
    Resources,
    References,
    SignDecision,
}

impl EdgeField {
    pub const ALL: [EdgeField; 4] = [
        EdgeField::Weight,
        EdgeField::Resources,
        EdgeField::References,
        EdgeField::SignDecision,
    ];
}

/// How a raw cell becomes a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Trimmed text; blank becomes null.
    Text,
    /// Required finite number.
    Float,
    /// `dbTF` / `coTF` / `GTF` expanded to descriptive names, others null.
    TfCategory,
    /// Sign of a required number: `activation` if positive, else `inhibition`.
    RegulationDirection,
}

impl Coercion {
    /// Apply the coercion to one cell of row `row`.
    pub fn apply(
        &self,
        raw: Option<&str>,
        row: usize,
        column: &str,
    ) -> Result<FieldValue, RowTransformError> {
        match self {
            Coercion::Text => Ok(raw.map(FieldValue::text).unwrap_or(FieldValue::Null)),
            Coercion::Float => parse_number(raw, row, column).map(FieldValue::Float),
            Coercion::TfCategory => Ok(raw
                .and_then(|code| tf_category(code.trim()))
                .map(|name| FieldValue::String(name.to_string()))
                .unwrap_or(FieldValue::Null)),
            Coercion::RegulationDirection => {
                let weight = parse_number(raw, row, column)?;
                let direction = if weight > 0.0 { "activation" } else { "inhibition" };
                Ok(FieldValue::String(direction.to_string()))
            }
        }
    }

    /// Type name used in the schema declaration document.
    pub fn declared_type(&self) -> &'static str {
        match self {
            Coercion::Float => "float",
            _ => "str",
        }
    }
}

fn parse_number(raw: Option<&str>, row: usize, column: &str) -> Result<f64, RowTransformError> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RowTransformError::MissingValue {
            row,
            column: column.to_string(),
        })?;
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(RowTransformError::NotNumeric {
            row,
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Expand a CollecTRI transcription factor category code.
pub fn tf_category(code: &str) -> Option<&'static str> {
    match code {
        "dbTF" => Some("DNA-binding"),
        "coTF" => Some("co-regulatory"),
        "GTF" => Some("general initiation"),
        _ => None,
    }
}

/// Field a property rule belongs to, for type/field selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Node(NodeField),
    Edge(EdgeField),
}

/// One source column mapped to one property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyRule {
    pub column: &'static str,
    pub property: &'static str,
    pub coercion: Coercion,
    pub field: RuleField,
}

/// Registry entry for a node type.
#[derive(Debug, Clone, Copy)]
pub struct NodeSchema {
    pub node_type: NodeType,
    pub identifier_column: &'static str,
    pub preferred_id: &'static str,
    /// Ontology parent, if the type specialises another one.
    pub is_a: Option<&'static str>,
    pub properties: &'static [PropertyRule],
}

/// Registry entry for an edge type.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSchema {
    pub edge_type: EdgeType,
    pub source_column: &'static str,
    pub target_column: &'static str,
    pub is_a: Option<&'static str>,
    pub properties: &'static [PropertyRule],
}

pub const PREFERRED_ID: &str = "hgnc.symbol";

static GENE: NodeSchema = NodeSchema {
    node_type: NodeType::Gene,
    identifier_column: TARGET_COLUMN,
    preferred_id: PREFERRED_ID,
    is_a: None,
    properties: &[PropertyRule {
        column: TARGET_COLUMN,
        property: "name",
        coercion: Coercion::Text,
        field: RuleField::Node(NodeField::Symbol),
    }],
};

static TRANSCRIPTION_FACTOR: NodeSchema = NodeSchema {
    node_type: NodeType::TranscriptionFactor,
    identifier_column: SOURCE_COLUMN,
    preferred_id: PREFERRED_ID,
    is_a: Some("gene"),
    properties: &[
        PropertyRule {
            column: SOURCE_COLUMN,
            property: "name",
            coercion: Coercion::Text,
            field: RuleField::Node(NodeField::Symbol),
        },
        PropertyRule {
            column: CATEGORY_COLUMN,
            property: "category",
            coercion: Coercion::TfCategory,
            field: RuleField::Node(NodeField::Category),
        },
    ],
};

static TRANSCRIPTIONAL_REGULATION: EdgeSchema = EdgeSchema {
    edge_type: EdgeType::TranscriptionalRegulation,
    source_column: SOURCE_COLUMN,
    target_column: TARGET_COLUMN,
    is_a: Some("gene regulatory relationship"),
    properties: &[
        PropertyRule {
            column: WEIGHT_COLUMN,
            property: "weight",
            coercion: Coercion::Float,
            field: RuleField::Edge(EdgeField::Weight),
        },
        PropertyRule {
            column: WEIGHT_COLUMN,
            property: "activation_or_inhibition",
            coercion: Coercion::RegulationDirection,
            field: RuleField::Edge(EdgeField::Weight),
        },
        PropertyRule {
            column: RESOURCES_COLUMN,
            property: "resources",
            coercion: Coercion::Text,
            field: RuleField::Edge(EdgeField::Resources),
        },
        PropertyRule {
            column: REFERENCES_COLUMN,
            property: "references",
            coercion: Coercion::Text,
            field: RuleField::Edge(EdgeField::References),
        },
        PropertyRule {
            column: SIGN_DECISION_COLUMN,
            property: "sign_decision",
            coercion: Coercion::Text,
            field: RuleField::Edge(EdgeField::SignDecision),
        },
    ],
};

/// Look up the registry entry for a node type.
pub fn node_schema(node_type: NodeType) -> &'static NodeSchema {
    match node_type {
        NodeType::Gene => &GENE,
        NodeType::TranscriptionFactor => &TRANSCRIPTION_FACTOR,
    }
}

/// Look up the registry entry for an edge type.
pub fn edge_schema(edge_type: EdgeType) -> &'static EdgeSchema {
    match edge_type {
        EdgeType::TranscriptionalRegulation => &TRANSCRIPTIONAL_REGULATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuated_columns_are_renamed() {
        let edge = edge_schema(EdgeType::TranscriptionalRegulation);
        let renamed: Vec<(&str, &str)> = edge
            .properties
            .iter()
            .map(|rule| (rule.column, rule.property))
            .collect();

        assert!(renamed.contains(&("sign.decision", "sign_decision")));
        assert!(renamed.contains(&("PMID", "references")));

        let tf = node_schema(NodeType::TranscriptionFactor);
        assert!(tf
            .properties
            .iter()
            .any(|rule| rule.column == "TF.category" && rule.property == "category"));
    }

    #[test]
    fn test_identifier_columns() {
        assert_eq!(node_schema(NodeType::Gene).identifier_column, "target");
        assert_eq!(node_schema(NodeType::TranscriptionFactor).identifier_column, "source");
        assert_eq!(node_schema(NodeType::TranscriptionFactor).is_a, Some("gene"));
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Coercion::Float.apply(Some("1"), 0, "weight"), Ok(FieldValue::Float(1.0)));
        assert_eq!(Coercion::Float.apply(Some(" -1 "), 0, "weight"), Ok(FieldValue::Float(-1.0)));
        assert!(matches!(
            Coercion::Float.apply(Some(""), 3, "weight"),
            Err(RowTransformError::MissingValue { row: 3, .. })
        ));
        assert!(matches!(
            Coercion::Float.apply(None, 3, "weight"),
            Err(RowTransformError::MissingValue { .. })
        ));
        assert!(matches!(
            Coercion::Float.apply(Some("NaN"), 4, "weight"),
            Err(RowTransformError::NotNumeric { row: 4, .. })
        ));
        assert!(matches!(
            Coercion::Float.apply(Some("strong"), 4, "weight"),
            Err(RowTransformError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_regulation_direction() {
        let apply = |raw| Coercion::RegulationDirection.apply(Some(raw), 0, "weight").unwrap();
        assert_eq!(apply("1"), FieldValue::String("activation".to_string()));
        assert_eq!(apply("-1"), FieldValue::String("inhibition".to_string()));
        assert_eq!(apply("0"), FieldValue::String("inhibition".to_string()));
    }

    #[test]
    fn test_tf_category_codes() {
        assert_eq!(tf_category("dbTF"), Some("DNA-binding"));
        assert_eq!(tf_category("coTF"), Some("co-regulatory"));
        assert_eq!(tf_category("GTF"), Some("general initiation"));
        assert_eq!(tf_category("unknown"), None);
        assert_eq!(
            Coercion::TfCategory.apply(Some("other"), 0, "TF.category"),
            Ok(FieldValue::Null)
        );
    }

    #[test]
    fn test_text_coercion_blank_is_null() {
        assert_eq!(Coercion::Text.apply(Some(""), 0, "resources"), Ok(FieldValue::Null));
        assert_eq!(Coercion::Text.apply(None, 0, "resources"), Ok(FieldValue::Null));
    }
}
