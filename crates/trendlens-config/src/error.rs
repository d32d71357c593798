//! Error types for configuration resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while gathering or resolving configuration.
///
/// All variants are fatal: configuration problems are surfaced immediately
/// and never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for the expected shape.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The TianAPI credential is absent after the full merge.
    #[error(
        "TianAPI key is not set; provide it via the TIANAPI_KEY environment variable, \
         api.tianapi.key in the config file, or --api-key"
    )]
    MissingApiKey,

    /// No upstream endpoint is configured for the requested platform.
    #[error("no TianAPI endpoint configured for platform '{0}'")]
    UnknownSource(String),
}
