//! Error types for the pipeline.

use std::path::PathBuf;
use thiserror::Error;
use trendlens_config::ConfigError;
use trendlens_domain::Platform;
use trendlens_fetch::FetchError;
use trendlens_llm::LlmError;
use trendlens_report::ReportError;

/// Fatal pipeline failures.
///
/// Terminal repair failures are deliberately absent: they surface as
/// [`crate::AnalyzeOutcome::Unanalyzed`], not as errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration problem; never retried.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fetch retry budget exhausted.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// LLM call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Report or index writing failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Analyze was requested but no raw snapshot exists for the platform.
    #[error("no raw snapshot found for platform '{0}'; run fetch first")]
    NoRawSnapshot(Platform),

    /// Snapshot or analysis file I/O failed.
    #[error("I/O failed at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The model's output parsed as JSON but not as an analysis batch.
    #[error("unexpected analysis payload: {0}")]
    Payload(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
