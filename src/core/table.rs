//! Tabular output
//!
//! An [`OutputTable`] is built once from a non-empty, uniform set of records and written once as
//! UTF-8 CSV with `\r\n` line endings. The header is taken from the first record.

use crate::domain::{FlatRecord, HealthportError, Result, WriteError};
use std::fs::File;
use std::path::Path;

/// Header plus rows, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    header: Vec<String>,
    rows: Vec<FlatRecord>,
}

impl OutputTable {
    /// Builds a table whose header is the keys of the first record
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty record set, and
    /// [`WriteError::ColumnMismatch`] when any record's keys differ from the header.
    pub fn new(rows: Vec<FlatRecord>) -> Result<Self> {
        let first = rows.first().ok_or_else(|| {
            HealthportError::Validation(
                "Cannot build an output table from zero records".to_string(),
            )
        })?;
        let header: Vec<String> = first.keys().map(str::to_string).collect();

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| !row.keys().eq(header.iter().map(String::as_str)))
        {
            return Err(WriteError::ColumnMismatch {
                index,
                expected: header,
                found: row.keys().map(str::to_string).collect(),
            }
            .into());
        }

        Ok(Self { header, rows })
    }

    /// Column names, in output order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table to `path` and returns the number of data rows
    ///
    /// The content goes to a uniquely named staging file in the same directory and is renamed
    /// into place, so an interrupted write never leaves a partial file at `path`. The staging
    /// file is removed when writing fails.
    pub fn write(&self, path: &Path) -> std::result::Result<usize, WriteError> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".tmp")
            .tempfile_in(directory)
            .map_err(|e| WriteError::Io {
                path: path.to_path_buf(),
                reason: format!("cannot create staging file in {}: {e}", directory.display()),
            })?;

        self.write_to(staging.as_file(), path)?;

        staging.persist(path).map_err(|e| WriteError::Io {
            path: path.to_path_buf(),
            reason: format!("failed to move staging file into place: {}", e.error),
        })?;

        tracing::debug!(path = %path.display(), rows = self.rows.len(), "Table written");
        Ok(self.rows.len())
    }

    fn write_to(&self, file: &File, path: &Path) -> std::result::Result<(), WriteError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(file);

        writer
            .write_record(&self.header)
            .map_err(|e| encoding_error(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.values())
                .map_err(|e| encoding_error(path, e))?;
        }

        writer.flush().map_err(|e| WriteError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Name prefix of in-progress output files
const STAGING_PREFIX: &str = ".healthport-";

fn io_error(path: &Path, err: csv::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn encoding_error(path: &Path, err: csv::Error) -> WriteError {
    if err.is_io_error() {
        return io_error(path, err);
    }
    WriteError::Encoding {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
