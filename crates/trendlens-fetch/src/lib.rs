//! Trendlens Fetch Layer
//!
//! A fetch client hardened against an unreliable upstream: bounded retry,
//! exponential backoff between attempts, and caller-supplied response
//! validation, behind a transport seam so the retry policy is testable
//! without a network.
//!
//! # Retry state machine
//!
//! ```text
//! Idle → Attempting → Validating → Success
//!              ↑           |
//!              |           v
//!          Retrying ← (invalid / transport error)
//!              |
//!              v
//!          Exhausted → FetchError
//! ```
//!
//! A transport failure (timeout, connect error, non-2xx status) and a
//! validation failure are treated identically for retry purposes. Before
//! attempt *k* (0-indexed, k >= 1) the fetcher sleeps `2^(k-1)` seconds, with
//! no jitter and no sleep before the first attempt or after the last. Attempts are
//! read-only GETs, so retrying is safe under at-least-once semantics.

#![warn(missing_docs)]

mod error;
mod fetcher;
mod tianapi;
mod transport;

pub use error::{AttemptError, FetchError, TransportError};
pub use fetcher::{backoff_delay, RawPayload, RetryPolicy, RetryingFetcher};
pub use tianapi::{key_params, validate_response};
pub use transport::{HttpTransport, MockTransport, TrendTransport};
