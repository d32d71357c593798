//! Trendlens JSON Repair Layer
//!
//! LLM output is usually *almost* valid JSON. This crate recovers usable
//! structured data from the malformation patterns real model output actually
//! produces, through an ordered cascade of increasingly aggressive
//! strategies, and captures a forensic artifact whenever every strategy
//! fails.
//!
//! # The cascade
//!
//! 1. direct parse of the verbatim text;
//! 2. extraction of the outermost `[` … `]` span (greedy across the whole
//!    text) and a direct parse of that span; recovers arrays wrapped in
//!    prose or markdown fencing;
//! 3. rule-based repair of the extracted span, then parse;
//! 4. rule-based repair of the full original text, then parse;
//! 5. terminal failure carrying the original text, the last attempted
//!    candidate, and the parser's line/column.
//!
//! # Known limitation
//!
//! The repair rules are textual substitutions applied without awareness of
//! string-literal boundaries: a value containing literal `}{` text will be
//! corrupted by the object-seam rule. This precision/recall tradeoff is
//! deliberate: the goal is targeted, explainable recovery of a handful of
//! observed malformation classes, not a general error-tolerant grammar.

#![warn(missing_docs)]

mod artifact;
mod cascade;
mod rules;

pub use artifact::{ArtifactWriter, DebugArtifact};
pub use cascade::{parse, RepairFailure, RepairStrategy, Repaired};
pub use rules::apply_rules;
