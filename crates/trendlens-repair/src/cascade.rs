//! The repair cascade.

use crate::rules::apply_rules;
use serde_json::Value;
use thiserror::Error;

/// Which stage of the cascade produced the winning candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// The verbatim text parsed as-is.
    Direct,
    /// The extracted array span parsed without repair.
    ExtractedArray,
    /// The extracted array span parsed after rule repair.
    RuleFixed,
    /// The full original text parsed after rule repair.
    OriginalFixed,
}

impl RepairStrategy {
    /// Stable tag used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStrategy::Direct => "direct",
            RepairStrategy::ExtractedArray => "extracted-array",
            RepairStrategy::RuleFixed => "rule-fixed",
            RepairStrategy::OriginalFixed => "original-fixed",
        }
    }
}

/// A successful recovery: the parsed value and the strategy that won.
#[derive(Debug, Clone)]
pub struct Repaired {
    /// The recovered JSON value.
    pub value: Value,
    /// The cascade stage that produced it.
    pub strategy: RepairStrategy,
}

/// Terminal inability to recover structured data from the text.
///
/// Carries everything a postmortem needs: the untouched original, the
/// extracted span (when stage 2 found one), the last repaired candidate,
/// and where the parser gave up on it.
#[derive(Error, Debug, Clone)]
#[error("unable to recover JSON from model output (parse error at line {line}, column {column})")]
pub struct RepairFailure {
    /// The original text, untouched.
    pub original: String,
    /// The array span extracted in stage 2, if one was found.
    pub extracted: Option<String>,
    /// The last candidate the cascade attempted.
    pub repaired: String,
    /// Line of the first syntax error in the last candidate (1-based).
    pub line: usize,
    /// Column of the first syntax error in the last candidate (1-based).
    pub column: usize,
}

/// Run the full cascade over `text`.
///
/// Pure and deterministic: no I/O, no clock, no state. Each stage is tried
/// only if the previous one failed; the first parse success terminates the
/// cascade.
pub fn parse(text: &str) -> Result<Repaired, RepairFailure> {
    // Stage 1: the text as given.
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(Repaired {
            value,
            strategy: RepairStrategy::Direct,
        });
    }

    // Stages 2 and 3 only apply when the text contains an array span.
    let extracted = extract_array_span(text);
    if let Some(span) = extracted {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(Repaired {
                value,
                strategy: RepairStrategy::ExtractedArray,
            });
        }

        let repaired_span = apply_rules(span);
        if let Ok(value) = serde_json::from_str(&repaired_span) {
            return Ok(Repaired {
                value,
                strategy: RepairStrategy::RuleFixed,
            });
        }
    }

    // Stage 4: repair the full original text.
    let repaired = apply_rules(text);
    match serde_json::from_str(&repaired) {
        Ok(value) => Ok(Repaired {
            value,
            strategy: RepairStrategy::OriginalFixed,
        }),
        Err(e) => Err(RepairFailure {
            original: text.to_string(),
            extracted: extracted.map(str::to_string),
            repaired,
            line: e.line(),
            column: e.column(),
        }),
    }
}

/// The outermost bracketed array span: first `[` through the last `]`,
/// greedy across the whole text.
fn extract_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
