//! # collectri: CollecTRI regulon graph adapter
//!
//! Converts the CollecTRI table of transcription factor → target gene
//! interactions into typed graph records ready for bulk import.
//!
//! ## Features
//!
//! - **Tabular loader**: reads the delimited source file into an in-memory table
//! - **Schema registry**: static column → property rename and coercion rules
//! - **Two-pass adapter**: entity discovery, then one edge per valid row
//! - **Restartable emission**: lazy node and edge sequences via [`GraphSource`]
//! - **Writers**: NDJSON per label, run summary, `schema_config.yaml`
//!
//! ## Example
//!
//! ```ignore
//! use collectri::{AdapterConfig, CollectriAdapter, GraphSource};
//!
//! let adapter = CollectriAdapter::from_path("CollecTRI.csv", b',', AdapterConfig::default())?;
//! for node in adapter.produce_nodes() {
//!     println!("{} {}", node.node_type, node.id);
//! }
//! println!("skipped rows: {}", adapter.summary().skipped_rows());
//! ```

// Core modules
pub mod entity;
pub mod error;
pub mod table;
pub mod schema_registry;
pub mod adapter;
pub mod emission;

// Ambient configuration and output
pub mod config;
pub mod serialization;
pub mod schema_config;

// Re-export key types
pub use entity::{Edge, EdgeType, FieldValue, GraphRecord, Node, NodeType, Properties};
pub use error::{ConfigError, LoadError, RowTransformError, SerializationError};
pub use table::{ColumnKind, Extractor, Row, Table};
pub use schema_registry::{EdgeField, NodeField};
pub use adapter::{CollectriAdapter, RowIssue, RunSummary};
pub use emission::GraphSource;
pub use config::{AdapterConfig, RunConfig, RunOverrides};
pub use serialization::{GraphWriter, NdjsonWriter};
pub use schema_config::SchemaDeclaration;
