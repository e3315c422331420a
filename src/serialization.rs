//! Writers for graph records.
//!
//! Records are written as NDJSON, one file per store label, so an external
//! bulk-import step can pick them up.

use indexmap::IndexMap;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::adapter::RunSummary;
use crate::emission::GraphSource;
use crate::entity::GraphRecord;
use crate::error::SerializationError;

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes records as NDJSON, one JSON object per line.
pub struct NdjsonWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Write a single record as an NDJSON line
    pub fn write<T: GraphRecord>(&mut self, record: &T) -> Result<(), SerializationError> {
        self.writer.write_all(record.to_ndjson_line()?.as_bytes())?;
        tracing::trace!(id = record.id(), "wrote record");
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes every record of a [`GraphSource`] into `<dir>/<Label>.ndjson`.
pub struct GraphWriter {
    output_dir: PathBuf,
}

impl GraphWriter {
    /// Create the writer, creating `output_dir` if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, SerializationError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all nodes; returns the files written with their record counts.
    pub fn write_nodes(
        &self,
        source: &dyn GraphSource,
    ) -> Result<IndexMap<PathBuf, usize>, SerializationError> {
        tracing::info!("writing nodes");
        self.write_grouped(source.produce_nodes())
    }

    /// Write all edges; returns the files written with their record counts.
    pub fn write_edges(
        &self,
        source: &dyn GraphSource,
    ) -> Result<IndexMap<PathBuf, usize>, SerializationError> {
        tracing::info!("writing edges");
        self.write_grouped(source.produce_edges())
    }

    /// Write the run summary as pretty JSON to `summary.json`.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf, SerializationError> {
        let path = self.output_dir.join("summary.json");
        write_json_pretty(&path, summary)?;
        Ok(path)
    }

    fn write_grouped<T, I>(&self, records: I) -> Result<IndexMap<PathBuf, usize>, SerializationError>
    where
        T: GraphRecord,
        I: Iterator<Item = T>,
    {
        let mut writers: IndexMap<String, (PathBuf, NdjsonWriter<BufWriter<File>>)> = IndexMap::new();

        for record in records {
            let label = record.label();
            if !writers.contains_key(&label) {
                let path = self.output_dir.join(format!("{}.ndjson", label));
                let file = File::create(&path)?;
                writers.insert(label.clone(), (path, NdjsonWriter::new(BufWriter::new(file))));
            }
            if let Some((_, writer)) = writers.get_mut(&label) {
                writer.write(&record)?;
            }
        }

        let mut written = IndexMap::with_capacity(writers.len());
        for (label, (path, mut writer)) in writers {
            writer.flush()?;
            tracing::debug!(label = %label, records = writer.written(), path = %path.display(), "wrote records");
            written.insert(path, writer.written());
        }
        Ok(written)
    }
}

fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), SerializationError> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, value)?;
    writeln!(file)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterConfig;
    use crate::entity::{Edge, EdgeType, Properties};
    use crate::CollectriAdapter;
    use crate::table::Table;

    #[test]
    fn test_ndjson_writer() {
        let mut buf = Vec::new();
        let mut writer = NdjsonWriter::new(&mut buf);

        for target in ["TERT", "CDK4"] {
            writer
                .write(&Edge {
                    id: format!("MYC-{}", target),
                    source: "MYC".to_string(),
                    target: target.to_string(),
                    edge_type: EdgeType::TranscriptionalRegulation,
                    properties: Properties::new(),
                })
                .unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.written(), 2);

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("TERT"));
        assert!(lines[1].contains("CDK4"));
    }

    #[test]
    fn test_graph_writer_groups_by_label() {
        let data = "source,target,weight,TF.category,resources,PMID,sign.decision\n\
            MYC,TERT,1,dbTF,ExTRI,1,PMID\n\
            MYC,CDK4,1,dbTF,ExTRI,2,PMID\n";
        let table = Table::from_reader(data.as_bytes(), b',', "<test>").unwrap();
        let adapter = CollectriAdapter::new(table, AdapterConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let writer = GraphWriter::new(dir.path().join("out")).unwrap();

        let nodes = writer.write_nodes(&adapter).unwrap();
        let edges = writer.write_edges(&adapter).unwrap();
        writer.write_summary(&adapter.summary()).unwrap();

        let out = dir.path().join("out");
        assert_eq!(nodes.get(&out.join("TranscriptionFactor.ndjson")), Some(&1));
        assert_eq!(nodes.get(&out.join("Gene.ndjson")), Some(&2));
        assert_eq!(edges.get(&out.join("TranscriptionalRegulation.ndjson")), Some(&2));

        let summary = fs::read_to_string(out.join("summary.json")).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(summary["edges"], 2);
    }
}
