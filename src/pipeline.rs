//! The cleaning pipeline: configuration load, dataset load, the fixed
//! sequence of cleaning stages, and the final save.
//!
//! Stages run strictly in order — drop missing values, drop duplicates,
//! type corrections, column pruning — each gated by its configuration flag;
//! disabled stages are skipped without a report. Configuration load, dataset
//! load, and save failures end the run; per-column cast failures only emit a
//! warning and the run continues.

use std::path::Path;

use itertools::Itertools;

use crate::{
    config::CleaningConfig,
    error::PipelineError,
    frame::{CastOutcome, DataFrame},
    io_utils,
    report::Reporter,
};

/// Invocation-time I/O settings. Everything defaults to "derive from the
/// file paths": delimiters from extensions, UTF-8 input.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub delimiter: Option<u8>,
    pub output_delimiter: Option<u8>,
    pub input_encoding: Option<String>,
}

/// Counts gathered while a run progresses. A successful run with zero rows
/// remaining is a valid outcome, distinct from a failed run (which returns
/// an error instead of a report).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub rows_loaded: usize,
    pub rows_dropped_missing: usize,
    pub rows_dropped_duplicate: usize,
    pub columns_cast: usize,
    pub cast_failures: usize,
    pub columns_removed: usize,
    pub rows_written: usize,
    pub columns_written: usize,
}

pub struct CleaningPipeline {
    reporter: Reporter,
    options: PipelineOptions,
}

impl CleaningPipeline {
    pub fn new(reporter: Reporter, options: PipelineOptions) -> Self {
        Self { reporter, options }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Runs the whole pipeline: loads the configuration, loads the dataset,
    /// applies every enabled stage in order, and writes the result. Fatal
    /// failures are reported and returned; nothing after a fatal stage
    /// executes, so no partial output file is ever produced.
    pub fn run(
        &mut self,
        config_path: &Path,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<RunReport, PipelineError> {
        self.reporter.stage("Starting data cleaning");

        let config = match CleaningConfig::load(config_path) {
            Ok(config) => {
                self.reporter.info(&format!(
                    "Configuration loaded from {}",
                    config_path.display()
                ));
                config
            }
            Err(err) => {
                self.reporter
                    .error(&format!("Failed to load configuration: {err}"));
                return Err(err);
            }
        };
        if config.is_noop() {
            self.reporter
                .info("No cleaning stage enabled; the input will be copied as-is");
        }

        let delimiter = io_utils::resolve_input_delimiter(input_path, self.options.delimiter);
        let encoding = match io_utils::resolve_encoding(self.options.input_encoding.as_deref()) {
            Ok(encoding) => encoding,
            Err(err) => {
                let err = PipelineError::DataLoad {
                    path: input_path.to_path_buf(),
                    reason: format!("{err:#}"),
                };
                self.reporter
                    .error(&format!("Failed to load dataset: {err}"));
                return Err(err);
            }
        };
        let mut frame = match DataFrame::load(input_path, delimiter, encoding) {
            Ok(frame) => frame,
            Err(err) => {
                self.reporter
                    .error(&format!("Failed to load dataset: {err}"));
                return Err(err);
            }
        };
        let mut report = RunReport {
            rows_loaded: frame.row_count(),
            ..RunReport::default()
        };
        self.reporter.info(&format!(
            "Dataset loaded with {} row(s) and {} column(s) (delimiter '{}')",
            frame.row_count(),
            frame.column_count(),
            io_utils::printable_delimiter(delimiter)
        ));

        if config.drop_na {
            let before = frame.row_count();
            report.rows_dropped_missing = frame.drop_missing();
            self.reporter.info(&format!(
                "Dropped rows with missing values: {before} row(s) before, {} after",
                frame.row_count()
            ));
        }

        if config.drop_duplicates {
            let before = frame.row_count();
            report.rows_dropped_duplicate = frame.drop_duplicates();
            self.reporter.info(&format!(
                "Dropped duplicate rows: {before} row(s) before, {} after",
                frame.row_count()
            ));
        }

        for (column, target) in &config.data_type_corrections {
            match frame.cast_column(column, target) {
                CastOutcome::Applied => {
                    report.columns_cast += 1;
                    self.reporter
                        .info(&format!("Column '{column}' cast to {target}"));
                }
                CastOutcome::MissingColumn => {
                    log::debug!("Column '{column}' not present; cast to {target} skipped");
                }
                CastOutcome::Failed { row, reason } => {
                    report.cast_failures += 1;
                    self.reporter.warn(&format!(
                        "Cast of column '{column}' to {target} failed at row {row}: {reason}; column left unchanged"
                    ));
                }
            }
        }

        if !config.remove_columns.is_empty() {
            let removed = frame.drop_columns(&config.remove_columns);
            report.columns_removed = removed.len();
            if !removed.is_empty() {
                self.reporter.info(&format!(
                    "Removed column(s): {}",
                    removed.iter().join(", ")
                ));
            }
        }

        let output_delimiter =
            io_utils::resolve_output_delimiter(output_path, self.options.output_delimiter, delimiter);
        if let Err(err) = frame.save(output_path, output_delimiter) {
            self.reporter
                .error(&format!("Failed to write dataset: {err}"));
            return Err(err);
        }
        report.rows_written = frame.row_count();
        report.columns_written = frame.column_count();
        self.reporter.info(&format!(
            "Cleaned dataset with {} row(s) and {} column(s) written to {}",
            report.rows_written,
            report.columns_written,
            output_path.display()
        ));

        self.reporter.stage("Data cleaning completed successfully");
        Ok(report)
    }
}
