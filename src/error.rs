//! Error types for loading, transforming and writing.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while reading the source table. Aborts the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no header row", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("malformed header in {}: {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("required column '{column}' is missing from the header")]
    MissingColumn { column: String },
}

/// A single row that could not be turned into an edge. Never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowTransformError {
    #[error("row {row}: column '{column}' is missing or empty")]
    MissingValue { row: usize, column: String },

    #[error("row {row}: column '{column}' is not numeric: '{value}'")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

impl RowTransformError {
    /// Zero-based data row index (header excluded).
    pub fn row(&self) -> usize {
        match self {
            RowTransformError::MissingValue { row, .. } => *row,
            RowTransformError::NotNumeric { row, .. } => *row,
        }
    }
}

/// Problems with the adapter configuration file or overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),

    #[error("no input file given (use --input, COLLECTRI_INPUT or the config file)")]
    MissingInput,
}

/// Failure while writing graph records or documents.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
