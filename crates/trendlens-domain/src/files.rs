//! File-name contract helpers.
//!
//! The pipeline's outputs are consumed by external report/index tooling, so
//! the names are a contract: `{source}_raw_{timestamp}.json`,
//! `{source}_analysis_{timestamp}.json` / `.html`, and
//! `debug_json_{timestamp}.txt`, with timestamps in `%Y%m%d_%H%M%S` form.
//! Formats are configurable patterns with `{source}` and `{timestamp}`
//! placeholders; parsing accepts only the contract shape above.

use crate::platform::Platform;

/// Prefix of debug artifacts written on terminal repair failures.
pub const DEBUG_ARTIFACT_PREFIX: &str = "debug_json_";

/// Compact timestamp format shared by all generated file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Fill a filename pattern's `{source}` and `{timestamp}` placeholders.
pub fn fill_pattern(pattern: &str, source: Platform, timestamp: &str) -> String {
    pattern
        .replace("{source}", source.as_str())
        .replace("{timestamp}", timestamp)
}

/// Parse `{source}_raw_{timestamp}.json` back into platform and timestamp.
pub fn parse_raw_filename(name: &str) -> Option<(Platform, &str)> {
    parse_contract_name(name, "_raw_", ".json")
}

/// Parse `{source}_analysis_{timestamp}.html` back into platform and timestamp.
pub fn parse_report_filename(name: &str) -> Option<(Platform, &str)> {
    parse_contract_name(name, "_analysis_", ".html")
}

/// True for `debug_json_{timestamp}.txt` names (numeric collision suffixes
/// included).
pub fn is_debug_artifact(name: &str) -> bool {
    name.starts_with(DEBUG_ARTIFACT_PREFIX) && name.ends_with(".txt")
}

fn parse_contract_name<'a>(
    name: &'a str,
    infix: &str,
    extension: &str,
) -> Option<(Platform, &'a str)> {
    let stem = name.strip_suffix(extension)?;
    for platform in Platform::ALL {
        if let Some(rest) = stem.strip_prefix(platform.as_str()) {
            if let Some(timestamp) = rest.strip_prefix(infix) {
                if !timestamp.is_empty() {
                    return Some((platform, timestamp));
                }
            }
        }
    }
    None
}
