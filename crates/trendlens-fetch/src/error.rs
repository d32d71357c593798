//! Error types for the fetch layer.

use thiserror::Error;

/// A failure of the transport itself, before any validation runs.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The request could not be completed (timeout, connect error, body
    /// read failure, or a non-JSON body).
    #[error("request failed: {0}")]
    Request(String),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },
}

/// Why a single fetch attempt failed.
///
/// Both variants are retryable; the distinction only matters for triage
/// once the budget is exhausted.
#[derive(Error, Debug, Clone)]
pub enum AttemptError {
    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The response arrived but did not pass the caller's validation.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Terminal fetch failure, surfaced only after the whole retry budget is
/// spent. Carries enough context for manual triage without re-running.
#[derive(Error, Debug)]
pub enum FetchError {
    /// All permitted attempts failed.
    #[error("all {attempts} fetch attempts failed; last error: {last_error}")]
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The error observed on the final attempt.
        last_error: AttemptError,
    },
}
