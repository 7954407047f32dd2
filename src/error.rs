use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline failures. Each variant ends the run before any further
/// stage executes; per-column cast failures are recoverable and therefore
/// not represented here (see [`crate::frame::CastOutcome`]).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration file is missing, unreadable, or not valid
    /// structured data. There is no default configuration to fall back to.
    #[error("configuration load failed for {path}: {reason}", path = .path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    /// The input dataset is missing, unreadable, or structurally malformed.
    #[error("dataset load failed for {path}: {reason}", path = .path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// The output location cannot be created or written.
    #[error("dataset write failed for {path}: {reason}", path = .path.display())]
    DataWrite { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn path(&self) -> &PathBuf {
        match self {
            PipelineError::ConfigLoad { path, .. }
            | PipelineError::DataLoad { path, .. }
            | PipelineError::DataWrite { path, .. } => path,
        }
    }
}
