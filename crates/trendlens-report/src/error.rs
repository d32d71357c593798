//! Error types for report generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing reports or the index.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A report or index file could not be read or written.
    #[error("report I/O failed at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
