//! Adapter configuration.
//!
//! Values are resolved with the precedence CLI flag > environment variable >
//! config file > default, see [`RunConfig::resolve`]. The adapter itself only
//! sees the resolved [`AdapterConfig`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::entity::{EdgeType, NodeType};
use crate::error::ConfigError;
use crate::schema_registry::{EdgeField, NodeField, PREFERRED_ID};

pub const ENV_INPUT: &str = "COLLECTRI_INPUT";
pub const ENV_OUTPUT: &str = "COLLECTRI_OUTPUT";
pub const ENV_ID_PREFIX: &str = "COLLECTRI_ID_PREFIX";

/// Which node/edge types and fields are produced, and how ids are written.
///
/// An empty list selects everything of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub node_types: Vec<NodeType>,
    pub node_fields: Vec<NodeField>,
    pub edge_types: Vec<EdgeType>,
    pub edge_fields: Vec<EdgeField>,
    /// Namespace prepended to identifiers as `<prefix>:<id>`.
    #[serde(skip)]
    pub id_prefix: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            node_types: NodeType::ALL.to_vec(),
            node_fields: NodeField::ALL.to_vec(),
            edge_types: EdgeType::ALL.to_vec(),
            edge_fields: EdgeField::ALL.to_vec(),
            id_prefix: None,
        }
    }
}

impl AdapterConfig {
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn includes_node_type(&self, node_type: NodeType) -> bool {
        self.node_types.is_empty() || self.node_types.contains(&node_type)
    }

    pub fn includes_edge_type(&self, edge_type: EdgeType) -> bool {
        self.edge_types.is_empty() || self.edge_types.contains(&edge_type)
    }

    pub fn includes_node_field(&self, field: NodeField) -> bool {
        self.node_fields.is_empty() || self.node_fields.contains(&field)
    }

    pub fn includes_edge_field(&self, field: EdgeField) -> bool {
        self.edge_fields.is_empty() || self.edge_fields.contains(&field)
    }

    /// Apply the configured prefix to a raw identifier.
    pub fn format_id(&self, raw: &str) -> String {
        match &self.id_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, raw),
            _ => raw.to_string(),
        }
    }
}

/// Values given explicitly on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub id_prefix: Option<String>,
    pub delimiter: Option<String>,
}

/// Contents of a `collectri.yaml` run configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub delimiter: String,
    /// Identifier namespace; an empty string disables prefixing.
    pub id_prefix: String,
    pub adapter: AdapterConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("biocypher-out"),
            delimiter: ",".to_string(),
            id_prefix: PREFERRED_ID.to_string(),
            adapter: AdapterConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a run configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid YAML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve with precedence overrides > environment > `file` > default.
    ///
    /// # Errors
    /// Returns error if `file` is given but can't be loaded
    pub fn resolve(file: Option<&Path>, overrides: RunOverrides) -> Result<Self, ConfigError> {
        let mut run = match file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        }
        .apply_env();

        if let Some(input) = overrides.input {
            run.input = Some(input);
        }
        if let Some(output) = overrides.output {
            run.output = output;
        }
        if let Some(prefix) = overrides.id_prefix {
            run.id_prefix = prefix;
        }
        if let Some(delimiter) = overrides.delimiter {
            run.delimiter = delimiter;
        }
        Ok(run)
    }

    /// Overlay environment variables on top of file/default values.
    pub fn apply_env(mut self) -> Self {
        if let Ok(input) = std::env::var(ENV_INPUT) {
            self.input = Some(PathBuf::from(input));
        }
        if let Ok(output) = std::env::var(ENV_OUTPUT) {
            self.output = PathBuf::from(output);
        }
        if let Ok(prefix) = std::env::var(ENV_ID_PREFIX) {
            self.id_prefix = prefix;
        }
        self
    }

    /// The field delimiter as a byte.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        parse_delimiter(&self.delimiter)
    }

    /// Adapter settings with the run's identifier prefix applied.
    pub fn adapter_config(&self) -> AdapterConfig {
        let mut adapter = self.adapter.clone();
        adapter.id_prefix = if self.id_prefix.is_empty() {
            None
        } else {
            Some(self.id_prefix.clone())
        };
        adapter
    }

    pub fn require_input(&self) -> Result<&Path, ConfigError> {
        self.input.as_deref().ok_or(ConfigError::MissingInput)
    }
}

/// Accepts a single ASCII character, or `\t` / `tab` for tab-separated files.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    let bytes = raw.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii() {
        Ok(bytes[0])
    } else {
        Err(ConfigError::InvalidDelimiter(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_enable_everything() {
        let config = AdapterConfig::default();
        assert!(config.includes_node_type(NodeType::Gene));
        assert!(config.includes_node_type(NodeType::TranscriptionFactor));
        assert!(config.includes_edge_field(EdgeField::SignDecision));
        assert_eq!(config.format_id("MYC"), "MYC");
    }

    #[test]
    fn test_prefix() {
        let config = AdapterConfig::default().with_id_prefix("hgnc.symbol");
        assert_eq!(config.format_id("MYC"), "hgnc.symbol:MYC");
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(matches!(
            parse_delimiter(";;"),
            Err(ConfigError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "input: data/CollecTRI.csv\nadapter:\n  node_types: [transcription_factor]\n  edge_fields: [weight, resources]\n"
        )
        .unwrap();

        let config = RunConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.input, Some(PathBuf::from("data/CollecTRI.csv")));
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.adapter.node_types, vec![NodeType::TranscriptionFactor]);
        assert_eq!(config.adapter.edge_fields, vec![EdgeField::Weight, EdgeField::Resources]);
        assert_eq!(config.adapter.node_fields, NodeField::ALL.to_vec());
        assert_eq!(
            config.adapter_config().id_prefix.as_deref(),
            Some("hgnc.symbol")
        );
    }

    #[test]
    fn test_empty_yaml_lists_select_everything() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "adapter:\n  node_types: []\n  edge_fields: []\n").unwrap();

        let adapter = RunConfig::load_from_file(file.path()).unwrap().adapter_config();

        assert!(adapter.node_types.is_empty());
        for node_type in NodeType::ALL {
            assert!(adapter.includes_node_type(node_type));
        }
        for field in EdgeField::ALL {
            assert!(adapter.includes_edge_field(field));
        }
    }

    // The only test in this crate that touches the process environment.
    #[test]
    fn test_resolve_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "input: file.csv\noutput: file-out\ndelimiter: \";\"\nid_prefix: ncbigene\n"
        )
        .unwrap();

        for name in [ENV_INPUT, ENV_OUTPUT, ENV_ID_PREFIX] {
            std::env::remove_var(name);
        }

        // default only
        let run = RunConfig::resolve(None, RunOverrides::default()).unwrap();
        assert_eq!(run, RunConfig::default());

        // file beats default
        let run = RunConfig::resolve(Some(file.path()), RunOverrides::default()).unwrap();
        assert_eq!(run.input, Some(PathBuf::from("file.csv")));
        assert_eq!(run.output, PathBuf::from("file-out"));
        assert_eq!(run.delimiter_byte().unwrap(), b';');
        assert_eq!(run.adapter_config().format_id("MYC"), "ncbigene:MYC");

        // env beats file
        std::env::set_var(ENV_INPUT, "env.csv");
        std::env::set_var(ENV_OUTPUT, "env-out");
        std::env::set_var(ENV_ID_PREFIX, "");
        let run = RunConfig::resolve(Some(file.path()), RunOverrides::default()).unwrap();
        assert_eq!(run.input, Some(PathBuf::from("env.csv")));
        assert_eq!(run.output, PathBuf::from("env-out"));
        assert_eq!(run.delimiter, ";");
        assert_eq!(run.adapter_config().id_prefix, None);
        assert_eq!(run.adapter_config().format_id("MYC"), "MYC");

        // CLI beats env
        let overrides = RunOverrides {
            input: Some(PathBuf::from("cli.csv")),
            output: Some(PathBuf::from("cli-out")),
            id_prefix: Some("hgnc.symbol".to_string()),
            delimiter: Some("\\t".to_string()),
        };
        let run = RunConfig::resolve(Some(file.path()), overrides).unwrap();
        assert_eq!(run.input, Some(PathBuf::from("cli.csv")));
        assert_eq!(run.output, PathBuf::from("cli-out"));
        assert_eq!(run.delimiter_byte().unwrap(), b'\t');
        assert_eq!(run.adapter_config().format_id("MYC"), "hgnc.symbol:MYC");

        // an empty CLI prefix turns prefixing off too
        let overrides = RunOverrides {
            id_prefix: Some(String::new()),
            ..RunOverrides::default()
        };
        let run = RunConfig::resolve(Some(file.path()), overrides).unwrap();
        assert_eq!(run.adapter_config().format_id("MYC"), "MYC");

        for name in [ENV_INPUT, ENV_OUTPUT, ENV_ID_PREFIX] {
            std::env::remove_var(name);
        }

        assert!(matches!(
            RunConfig::resolve(Some(Path::new("/definitely/not/here.yaml")), RunOverrides::default()),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "adapter: [not, a, map").unwrap();

        assert!(matches!(
            RunConfig::load_from_file(file.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
