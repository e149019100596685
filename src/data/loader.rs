//! CSV Table Loader Module
//! Reads a delimited file into raw string rows. No type coercion happens here.

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("source not found: {path}: {source}")]
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed table: {0}")]
    MalformedTable(String),
    #[error("failed to read CSV: {0}")]
    Read(#[source] csv::Error),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        let malformed = match err.kind() {
            ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.as_ref().map(|p| p.line()).unwrap_or_default();
                Some(format!("line {line} has {len} fields, expected {expected_len}"))
            }
            ErrorKind::Utf8 { pos, .. } => {
                let line = pos.as_ref().map(|p| p.line()).unwrap_or_default();
                Some(format!("line {line} is not valid UTF-8"))
            }
            _ => None,
        };

        match malformed {
            Some(msg) => LoaderError::MalformedTable(msg),
            None => LoaderError::Read(err),
        }
    }
}

/// A loaded table of untyped cells, in source row and column order.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

/// Borrowed view of one source row as an ordered header -> cell mapping.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    headers: &'a [String],
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    /// 1-based line number in the source file (header is line 1).
    pub fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or_default()
    }

    /// Raw cell under `column`, if the header has that column.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.record.get(idx)
    }

    /// Cell at a known column index.
    pub fn get_index(&self, idx: usize) -> Option<&'a str> {
        self.record.get(idx)
    }

    /// Iterate `(header, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.record.iter())
    }
}

impl RawTable {
    /// Get list of column names in header order.
    pub fn get_columns(&self) -> &[String] {
        &self.headers
    }

    /// Index of a column, matched exactly.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Get the number of data rows.
    pub fn get_row_count(&self) -> usize {
        self.records.len()
    }

    /// Iterate rows in source order. Restartable.
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> + '_ {
        self.records.iter().map(move |record| RawRow {
            headers: &self.headers,
            record,
        })
    }
}

/// Handles delimited file loading with the `csv` crate.
#[derive(Debug, Clone, Copy)]
pub struct TableLoader {
    delimiter: u8,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableLoader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load a delimited file from disk.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<RawTable, LoaderError> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|source| LoaderError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let table = self.load_reader(file)?;
        debug!(
            path = %path.display(),
            rows = table.get_row_count(),
            columns = table.headers.len(),
            "loaded raw table"
        );
        Ok(table)
    }

    /// Load from any reader. Every row must have as many fields as the header.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<RawTable, LoaderError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(LoaderError::MalformedTable("missing header row".into()));
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(LoaderError::MalformedTable(format!(
                    "duplicate column `{header}` in header"
                )));
            }
        }

        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

        Ok(RawTable { headers, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<RawTable, LoaderError> {
        TableLoader::default().load_reader(text.as_bytes())
    }

    #[test]
    fn test_preserves_row_and_column_order() {
        let table = load("Team,Record,Total Payroll\nB,1-2,\"$5\"\nA,3-4,\"$6\"\n").unwrap();
        assert_eq!(table.get_columns(), ["Team", "Record", "Total Payroll"]);
        assert_eq!(table.get_row_count(), 2);

        let teams: Vec<&str> = table.rows().map(|r| r.get("Team").unwrap()).collect();
        assert_eq!(teams, ["B", "A"]);

        let first = table.rows().next().unwrap();
        let pairs: Vec<(&str, &str)> = first.iter().collect();
        assert_eq!(
            pairs,
            [("Team", "B"), ("Record", "1-2"), ("Total Payroll", "$5")]
        );
        assert_eq!(first.line(), 2);
    }

    #[test]
    fn test_rows_are_restartable() {
        let table = load("Team\nA\nB\n").unwrap();
        assert_eq!(table.rows().count(), 2);
        assert_eq!(table.rows().count(), 2);
    }

    #[test]
    fn test_cells_are_not_coerced() {
        let table = load("Team,Total Payroll\nA,\"$1,234\"\n").unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("Total Payroll"), Some("$1,234"));
        assert_eq!(row.get("total payroll"), None);
    }

    #[test]
    fn test_file_not_found() {
        let result = TableLoader::default().load_csv("definitely/not/here.csv");
        assert!(matches!(result, Err(LoaderError::SourceNotFound { .. })));
    }

    #[test]
    fn test_empty_source_is_malformed() {
        assert!(matches!(load(""), Err(LoaderError::MalformedTable(_))));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let err = load("Team,Record\nA,1-2\nB\n").unwrap_err();
        match err {
            LoaderError::MalformedTable(msg) => assert!(msg.contains("line 3"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        assert!(matches!(
            load("Team,Team\nA,B\n"),
            Err(LoaderError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_custom_delimiter() {
        let table = TableLoader::new(b';')
            .load_reader("Team;Record\nA;1-2\n".as_bytes())
            .unwrap();
        assert_eq!(table.rows().next().unwrap().get("Record"), Some("1-2"));
    }
}
