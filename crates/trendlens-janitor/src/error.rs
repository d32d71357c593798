//! Error types for the janitor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a sweep.
///
/// Individual file deletions that fail are logged and skipped, not raised;
/// only being unable to scan the directory at all is an error.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// The data directory could not be scanned.
    #[error("failed to scan data directory {path}: {source}")]
    Scan {
        /// Directory that was being scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
