//! Trendlens Ingestion Pipeline
//!
//! Composes the workspace into the per-run flow:
//!
//! ```text
//! resolve config → fetch raw list → persist snapshot
//!                → prompt LLM → repair response → persist analysis + report
//!                                     |
//!                                     └─ terminal failure → debug artifact
//! ```
//!
//! One platform per invocation, strictly sequential. Failure policy follows
//! the error taxonomy: configuration problems and exhausted fetches are
//! fatal to the run; a terminal repair failure is not. The batch is
//! reported as unanalyzed after its debug artifact is recorded, and the run
//! still counts as complete.

#![warn(missing_docs)]

mod error;
mod pipeline;
mod prompt;
mod storage;

pub use error::PipelineError;
pub use pipeline::{
    analyze_latest, fetch_snapshot, run, AnalysisReport, AnalyzeOutcome, FetchReport, RunSummary,
};
pub use prompt::build_analysis_prompt;
