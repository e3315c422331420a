//! In-memory tabular input.
//!
//! The loader reads a delimited file into column names plus rows of text
//! cells, preserving row order. It knows nothing about genes or regulators;
//! the adapter reads cells by column name through [`Extractor`].

use indexmap::IndexMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// How a column's cells look once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-empty cell parses as a finite number.
    Numeric,
    Text,
}

/// A loaded table: header plus rows, all cells kept as text.
#[derive(Debug, Clone)]
pub struct Table {
    origin: PathBuf,
    columns: IndexMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a delimited file from disk.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the file cannot be opened or parsed, or the
    /// header row is missing or malformed.
    pub fn load<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, delimiter, path)
    }

    /// Load from any reader; `origin` is only used in error messages.
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        origin: impl Into<PathBuf>,
    ) -> Result<Self, LoadError> {
        let origin = origin.into();
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr
            .headers()
            .map_err(|source| LoadError::Csv {
                path: origin.clone(),
                source,
            })?
            .clone();

        if header.is_empty() || header.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::MissingHeader { path: origin });
        }

        let mut columns = IndexMap::with_capacity(header.len());
        for (position, name) in header.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                return Err(LoadError::MalformedHeader {
                    path: origin,
                    reason: format!("column {} has an empty name", position + 1),
                });
            }
            if columns.insert(name.to_string(), position).is_some() {
                return Err(LoadError::MalformedHeader {
                    path: origin,
                    reason: format!("duplicate column '{}'", name),
                });
            }
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|source| LoadError::Csv {
                path: origin.clone(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(
            path = %origin.display(),
            columns = columns.len(),
            rows = rows.len(),
            "loaded table"
        );

        Ok(Self {
            origin,
            columns,
            rows,
        })
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Column names in file order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            table: self,
            index,
            cells,
        })
    }

    /// Rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(index, cells)| Row {
            table: self,
            index,
            cells,
        })
    }

    /// Classify a column. `None` if the column does not exist.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let position = *self.columns.get(name)?;
        let mut seen_value = false;
        for cells in &self.rows {
            let cell = match cells.get(position) {
                Some(cell) if !cell.trim().is_empty() => cell.trim(),
                _ => continue,
            };
            seen_value = true;
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => {}
                _ => return Some(ColumnKind::Text),
            }
        }
        Some(if seen_value {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        })
    }
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Zero-based position among data rows.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Trait for types that can hand out cell values by column name.
pub trait Extractor {
    /// Raw cell value, `None` if the column or cell does not exist.
    fn extract(&self, column: &str) -> Option<&str>;

    /// Trimmed cell value, `None` when missing or blank.
    fn extract_non_empty(&self, column: &str) -> Option<&str> {
        self.extract(column)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl Extractor for Row<'_> {
    fn extract(&self, column: &str) -> Option<&str> {
        let position = *self.table.columns.get(column)?;
        self.cells.get(position).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &str) -> Result<Table, LoadError> {
        Table::from_reader(data.as_bytes(), b',', "<test>")
    }

    #[test]
    fn test_preserves_columns_and_row_order() {
        let t = table("source,target,weight\nMYC,TERT,1\nJUN,FOS,-1\n").unwrap();

        assert_eq!(t.columns().collect::<Vec<_>>(), vec!["source", "target", "weight"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(0).unwrap().extract("source"), Some("MYC"));
        assert_eq!(t.row(1).unwrap().extract("target"), Some("FOS"));
    }

    #[test]
    fn test_punctuated_column_names() {
        let t = table("source,TF.category,sign.decision\nMYC,dbTF,PMID\n").unwrap();
        let row = t.row(0).unwrap();

        assert_eq!(row.extract("TF.category"), Some("dbTF"));
        assert_eq!(row.extract("sign.decision"), Some("PMID"));
    }

    #[test]
    fn test_short_row_reads_as_missing() {
        let t = table("source,target,weight\nMYC,TERT\n").unwrap();
        let row = t.row(0).unwrap();

        assert_eq!(row.extract("weight"), None);
        assert_eq!(row.extract_non_empty("weight"), None);
        assert_eq!(row.extract("nope"), None);
    }

    #[test]
    fn test_extract_non_empty_trims() {
        let t = table("weight,resources\n -1 ,  \n").unwrap();
        let row = t.row(0).unwrap();

        assert_eq!(row.extract_non_empty("weight"), Some("-1"));
        assert_eq!(row.extract_non_empty("resources"), None);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(table(""), Err(LoadError::MissingHeader { .. })));
    }

    #[test]
    fn test_duplicate_column_is_malformed() {
        assert!(matches!(
            table("source,source\nA,B\n"),
            Err(LoadError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_empty_column_name_is_malformed() {
        assert!(matches!(
            table("source,,target\nA,x,B\n"),
            Err(LoadError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Table::load("/definitely/not/here.csv", b',').unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_column_kind() {
        let t = table("source,weight,PMID\nMYC,1,10022128\nJUN,-1,\nFOS,x1,123;456\n").unwrap();

        assert_eq!(t.column_kind("source"), Some(ColumnKind::Text));
        assert_eq!(t.column_kind("weight"), Some(ColumnKind::Text));
        assert_eq!(t.column_kind("missing"), None);

        let t = table("weight\n1\n\n-1\n").unwrap();
        assert_eq!(t.column_kind("weight"), Some(ColumnKind::Numeric));
    }
}
