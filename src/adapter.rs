//! CollecTRI adapter: turns the regulon table into graph records.
//!
//! Extraction runs in two passes over the loaded table. Pass 1 discovers the
//! transcription factor and gene universes; an identifier seen as a regulator
//! anywhere in the table is a transcription factor, even if other rows only
//! list it as a target. Pass 2 builds one edge per structurally valid row.
//!
//! Both passes are lazy and run at most once per adapter; their results are
//! cached, so node and edge sequences can be requested in any order and as
//! often as needed.

use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;

use crate::config::AdapterConfig;
use crate::entity::{Edge, EdgeType, FieldValue, Node, NodeType, Properties};
use crate::error::{LoadError, RowTransformError};
use crate::schema_registry::{
    edge_schema, node_schema, PropertyRule, RuleField, CATEGORY_COLUMN, EXPECTED_COLUMNS,
    SOURCE_COLUMN, TARGET_COLUMN,
};
use crate::table::{Extractor, Row, Table};

/// Where a discovered entity's attributes are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntityEntry {
    /// First row that carries the entity's attributes (or its first row).
    pub attribute_row: usize,
    attributes_complete: bool,
}

/// Result of pass 1.
#[derive(Debug, Default)]
pub(crate) struct Discovery {
    pub transcription_factors: IndexMap<String, EntityEntry>,
    pub genes: IndexMap<String, EntityEntry>,
    /// Rows without a source or target identifier.
    pub skipped_rows: Vec<usize>,
    pub category_conflicts: usize,
}

impl Discovery {
    /// Genes that are also regulators and therefore emitted as TFs.
    fn reclassified(&self) -> usize {
        self.genes
            .keys()
            .filter(|id| self.transcription_factors.contains_key(*id))
            .count()
    }
}

/// Result of pass 2.
#[derive(Debug, Default)]
pub(crate) struct EdgePass {
    pub edges: Vec<Edge>,
    pub errors: Vec<RowTransformError>,
}

/// A row that produced no edge, as reported in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub message: String,
}

impl From<&RowTransformError> for RowIssue {
    fn from(err: &RowTransformError) -> Self {
        Self {
            row: err.row(),
            message: err.to_string(),
        }
    }
}

/// Counters describing one adapter run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub rows_read: usize,
    pub rows_missing_identifier: usize,
    pub row_errors: usize,
    pub transcription_factors: usize,
    pub genes: usize,
    pub edges: usize,
    /// Target identifiers promoted to transcription factors.
    pub reclassified_genes: usize,
    /// Transcription factors whose category differs between rows.
    pub category_conflicts: usize,
    /// Rows rejected during edge construction, in row order.
    pub row_issues: Vec<RowIssue>,
}

impl RunSummary {
    /// Rows that produced no edge.
    pub fn skipped_rows(&self) -> usize {
        self.rows_missing_identifier + self.row_errors
    }
}

/// Generates gene, transcription factor and regulation records from a
/// CollecTRI table.
#[derive(Debug)]
pub struct CollectriAdapter {
    table: Table,
    config: AdapterConfig,
    discovery: OnceLock<Discovery>,
    edge_pass: OnceLock<EdgePass>,
}

impl CollectriAdapter {
    /// Wrap a loaded table.
    ///
    /// # Errors
    /// Returns [`LoadError::MissingColumn`] if the header lacks the `source`
    /// or `target` column.
    pub fn new(table: Table, config: AdapterConfig) -> Result<Self, LoadError> {
        for column in [SOURCE_COLUMN, TARGET_COLUMN] {
            if !table.has_column(column) {
                return Err(LoadError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        for column in EXPECTED_COLUMNS {
            if !table.has_column(column) {
                tracing::warn!(column, "expected column missing from header; values will be null");
            }
        }

        Ok(Self {
            table,
            config,
            discovery: OnceLock::new(),
            edge_pass: OnceLock::new(),
        })
    }

    /// Load `path` and wrap it.
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        delimiter: u8,
        config: AdapterConfig,
    ) -> Result<Self, LoadError> {
        let table = Table::load(path, delimiter)?;
        Self::new(table, config)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub(crate) fn discovery(&self) -> &Discovery {
        self.discovery.get_or_init(|| discover_entities(&self.table))
    }

    pub(crate) fn edge_pass(&self) -> &EdgePass {
        self.edge_pass.get_or_init(|| {
            if self.config.includes_edge_type(EdgeType::TranscriptionalRegulation) {
                build_edges(&self.table, &self.config)
            } else {
                EdgePass::default()
            }
        })
    }

    /// Rows that failed edge construction, in row order.
    pub fn row_errors(&self) -> &[RowTransformError] {
        &self.edge_pass().errors
    }

    /// Run both passes (if not already done) and report the counters.
    pub fn summary(&self) -> RunSummary {
        let discovery = self.discovery();
        let edge_pass = self.edge_pass();

        let transcription_factors =
            if self.config.includes_node_type(NodeType::TranscriptionFactor) {
                discovery.transcription_factors.len()
            } else {
                0
            };
        let genes = if self.config.includes_node_type(NodeType::Gene) {
            discovery.genes.len() - discovery.reclassified()
        } else {
            0
        };

        RunSummary {
            input: self.table.origin().display().to_string(),
            rows_read: self.table.len(),
            rows_missing_identifier: discovery.skipped_rows.len(),
            row_errors: edge_pass.errors.len(),
            transcription_factors,
            genes,
            edges: edge_pass.edges.len(),
            reclassified_genes: discovery.reclassified(),
            category_conflicts: discovery.category_conflicts,
            row_issues: edge_pass.errors.iter().map(RowIssue::from).collect(),
        }
    }

    /// Build the node for a discovered entity.
    pub(crate) fn build_node(&self, node_type: NodeType, id: &str, entry: &EntityEntry) -> Node {
        let schema = node_schema(node_type);
        let row = self.table.row(entry.attribute_row);
        let mut properties = Properties::new();

        for rule in schema.properties {
            if let RuleField::Node(field) = rule.field {
                if !self.config.includes_node_field(field) {
                    continue;
                }
            }
            let raw = if rule.column == schema.identifier_column {
                Some(id)
            } else {
                row.as_ref().and_then(|row| row.extract(rule.column))
            };
            let value = rule
                .coercion
                .apply(raw, entry.attribute_row, rule.column)
                .unwrap_or_else(|err| {
                    tracing::warn!(%err, node = id, "dropping node property");
                    FieldValue::Null
                });
            properties.insert(rule.property.to_string(), value);
        }

        Node {
            id: self.config.format_id(id),
            node_type,
            preferred_id: schema.preferred_id.to_string(),
            properties,
        }
    }
}

/// Pass 1: collect the transcription factor and gene universes.
fn discover_entities(table: &Table) -> Discovery {
    tracing::info!(rows = table.len(), "discovering entities");
    let mut discovery = Discovery::default();

    for row in table.rows() {
        let (source, target) = match (
            row.extract_non_empty(SOURCE_COLUMN),
            row.extract_non_empty(TARGET_COLUMN),
        ) {
            (Some(source), Some(target)) => (source, target),
            _ => {
                tracing::warn!(row = row.index(), "skipping row without source/target identifier");
                discovery.skipped_rows.push(row.index());
                continue;
            }
        };

        let category = row.extract_non_empty(CATEGORY_COLUMN);
        match discovery.transcription_factors.get_mut(source) {
            None => {
                discovery.transcription_factors.insert(
                    source.to_string(),
                    EntityEntry {
                        attribute_row: row.index(),
                        attributes_complete: category.is_some(),
                    },
                );
            }
            Some(entry) if !entry.attributes_complete => {
                if category.is_some() {
                    entry.attribute_row = row.index();
                    entry.attributes_complete = true;
                }
            }
            Some(entry) => {
                let first = table
                    .row(entry.attribute_row)
                    .and_then(|first| first.extract_non_empty(CATEGORY_COLUMN).map(str::to_string));
                if let (Some(first), Some(current)) = (first, category) {
                    if first != current {
                        tracing::debug!(
                            tf = source,
                            kept = %first,
                            ignored = current,
                            row = row.index(),
                            "conflicting transcription factor category"
                        );
                        discovery.category_conflicts += 1;
                    }
                }
            }
        }

        if !discovery.genes.contains_key(target) {
            discovery.genes.insert(
                target.to_string(),
                EntityEntry {
                    attribute_row: row.index(),
                    attributes_complete: true,
                },
            );
        }
    }

    tracing::info!(
        transcription_factors = discovery.transcription_factors.len(),
        genes = discovery.genes.len(),
        reclassified = discovery.reclassified(),
        skipped = discovery.skipped_rows.len(),
        "entity discovery finished"
    );
    discovery
}

/// Pass 2: one edge per row with identifiers and a numeric weight.
fn build_edges(table: &Table, config: &AdapterConfig) -> EdgePass {
    tracing::info!("generating edges");
    let schema = edge_schema(EdgeType::TranscriptionalRegulation);
    let mut pass = EdgePass::default();

    for row in table.rows() {
        let (source, target) = match (
            row.extract_non_empty(schema.source_column),
            row.extract_non_empty(schema.target_column),
        ) {
            (Some(source), Some(target)) => (source, target),
            // Already counted during discovery.
            _ => continue,
        };

        match edge_properties(&row, schema.properties, config) {
            Ok(properties) => {
                let source = config.format_id(source);
                let target = config.format_id(target);
                let id = relationship_id(&source, &target, &properties);
                pass.edges.push(Edge {
                    id,
                    source,
                    target,
                    edge_type: schema.edge_type,
                    properties,
                });
            }
            Err(err) => {
                tracing::warn!(%err, "skipping row");
                pass.errors.push(err);
            }
        }
    }

    tracing::info!(
        edges = pass.edges.len(),
        errors = pass.errors.len(),
        "edge generation finished"
    );
    pass
}

/// Apply the registry rules to one row.
///
/// The weight is validated even when the weight field is not selected, so
/// edge counts do not depend on field selection.
fn edge_properties(
    row: &Row<'_>,
    rules: &[PropertyRule],
    config: &AdapterConfig,
) -> Result<Properties, RowTransformError> {
    let mut properties = Properties::new();
    for rule in rules {
        let value = rule
            .coercion
            .apply(row.extract(rule.column), row.index(), rule.column)?;
        let selected = match rule.field {
            RuleField::Edge(field) => config.includes_edge_field(field),
            RuleField::Node(_) => false,
        };
        if selected {
            properties.insert(rule.property.to_string(), value);
        }
    }
    Ok(properties)
}

/// Hex SHA-256 over endpoints and property values, NUL-separated.
fn relationship_id(source: &str, target: &str, properties: &Properties) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\0");
    hasher.update(target.as_bytes());
    for value in properties.values() {
        hasher.update(b"\0");
        hasher.update(value.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}
