//! Progress and status reporting.
//!
//! The [`Reporter`] is an explicit observability sink owned by the pipeline:
//! every message is mirrored to the console through the `log` facade and,
//! when a log file is configured, appended as a timestamped line. Reporting
//! never fails the run; file errors are swallowed on purpose.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Stage,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Severity::Stage => "STAGE",
            Severity::Info => "INFO",
            Severity::Warn => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{tag}")
    }
}

pub struct Reporter {
    file: Option<BufWriter<std::fs::File>>,
    captured: Option<Vec<(Severity, String)>>,
}

impl Reporter {
    /// Reporter with a durable append-only log file alongside the console.
    /// Falls back to console-only when the file cannot be opened.
    pub fn with_log_file(path: &Path) -> Self {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(err) => {
                warn!("Could not open log file {path:?}: {err}; reporting to console only");
                None
            }
        };
        Self {
            file,
            captured: None,
        }
    }

    pub fn console_only() -> Self {
        Self {
            file: None,
            captured: None,
        }
    }

    /// Reporter that records every message in memory, so tests can assert
    /// the exact sequence a run emitted.
    pub fn capturing() -> Self {
        Self {
            file: None,
            captured: Some(Vec::new()),
        }
    }

    pub fn captured(&self) -> &[(Severity, String)] {
        self.captured.as_deref().unwrap_or(&[])
    }

    pub fn stage(&mut self, message: &str) {
        self.emit(Severity::Stage, message);
    }

    pub fn info(&mut self, message: &str) {
        self.emit(Severity::Info, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.emit(Severity::Warn, message);
    }

    pub fn error(&mut self, message: &str) {
        self.emit(Severity::Error, message);
    }

    fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Stage | Severity::Info => info!("{message}"),
            Severity::Warn => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
        if let Some(file) = &mut self.file {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "{timestamp} - {severity} - {message}");
            let _ = file.flush();
        }
        if let Some(captured) = &mut self.captured {
            captured.push((severity, message.to_string()));
        }
    }
}
