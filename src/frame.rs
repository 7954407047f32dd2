//! In-memory tabular dataset and its cleaning operations.
//!
//! A [`DataFrame`] holds named columns and rows of optional typed values;
//! `None` is the missing-value marker. The whole dataset is materialized in
//! memory for the duration of a run. Rows keep their insertion order and all
//! rows always share the column layout; only [`DataFrame::drop_columns`]
//! narrows it.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;

use crate::{
    data::{self, ColumnType, Value},
    error::PipelineError,
    io_utils,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

/// Result of a single column cast. Failures are recoverable: the column is
/// left untouched and the caller records a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Applied,
    /// The configured column does not exist in the dataset; a no-op.
    MissingColumn,
    Failed {
        /// 1-based data row of the first value that refused the conversion.
        row: usize,
        reason: String,
    },
}

impl DataFrame {
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<Value>>>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                bail!(
                    "Row {} has {} value(s) but the dataset has {} column(s)",
                    idx + 1,
                    row.len(),
                    columns.len()
                );
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parses a delimited text file into a dataset. The first row is the
    /// header; every field is loaded as a string value, with empty fields
    /// becoming missing values. Ragged rows are rejected by the strict
    /// reader.
    pub fn load(
        path: &Path,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self, PipelineError> {
        Self::read(path, delimiter, encoding).map_err(|err| PipelineError::DataLoad {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })
    }

    fn read(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(path, delimiter)?;
        let columns = io_utils::reader_headers(&mut reader, encoding)?;
        if columns.is_empty() {
            bail!("Input file {path:?} has no header row");
        }
        let mut rows = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)?;
            let row = decoded
                .into_iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(Value::String(field))
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Removes every row containing at least one missing value. Returns the
    /// number of removed rows; surviving rows keep their order.
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| row.iter().all(|cell| cell.is_some()));
        before - self.rows.len()
    }

    /// Removes rows that duplicate an earlier row in every column
    /// (null equals null for this purpose). The first occurrence survives;
    /// order is preserved. Returns the number of removed rows.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Attempts to convert every value in the named column to the target
    /// type. All-or-nothing per column: the first refusing value aborts the
    /// cast and the column is left unmodified. Missing values pass through.
    pub fn cast_column(&mut self, name: &str, target: &ColumnType) -> CastOutcome {
        let Some(idx) = self.columns.iter().position(|column| column == name) else {
            return CastOutcome::MissingColumn;
        };
        let mut converted = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            match &row[idx] {
                None => converted.push(None),
                Some(value) => match data::convert_value(value, target) {
                    Ok(value) => converted.push(Some(value)),
                    Err(err) => {
                        return CastOutcome::Failed {
                            row: row_idx + 1,
                            reason: format!("{err:#}"),
                        };
                    }
                },
            }
        }
        for (row, value) in self.rows.iter_mut().zip(converted) {
            row[idx] = value;
        }
        CastOutcome::Applied
    }

    /// Removes the named columns that exist in the dataset; absent names are
    /// silently ignored. Remaining columns keep their relative order.
    /// Returns the names actually removed, in dataset order.
    pub fn drop_columns(&mut self, names: &[String]) -> Vec<String> {
        let doomed: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| names.contains(column))
            .map(|(idx, _)| idx)
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }
        let removed = doomed
            .iter()
            .map(|&idx| self.columns[idx].clone())
            .collect();
        for &idx in doomed.iter().rev() {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        removed
    }

    /// Writes the dataset to a delimited text file: header first, then rows
    /// in order, missing values as empty fields, no synthetic row index. An
    /// existing file at the destination is overwritten.
    pub fn save(&self, path: &Path, delimiter: u8) -> Result<(), PipelineError> {
        self.write(path, delimiter)
            .map_err(|err| PipelineError::DataWrite {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            })
    }

    fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = io_utils::open_csv_writer(path, delimiter)?;
        writer
            .write_record(self.columns.iter())
            .context("Writing output headers")?;
        for (idx, row) in self.rows.iter().enumerate() {
            let fields = row
                .iter()
                .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default());
            writer
                .write_record(fields)
                .with_context(|| format!("Writing output row {}", idx + 2))?;
        }
        writer.flush().context("Flushing output writer")?;
        Ok(())
    }
}
