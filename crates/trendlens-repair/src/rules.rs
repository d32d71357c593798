//! The repair rules.
//!
//! Each rule is a pure string transformation named for the malformation it
//! targets, applied over the whole candidate in the fixed order of
//! [`apply_rules`]. None of them understand string-literal context; see the
//! crate docs for why that limitation is kept.

use once_cell::sync::Lazy;
use regex::Regex;

static OBJECT_SEAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\}\s*\{").unwrap());
static ARRAY_SEAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\s*\[").unwrap());
// The regex crate has no lookahead, so the first key character is captured
// and re-emitted instead.
static VALUE_THEN_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\d|true|false|null)\s*"(\w)"#).unwrap());
static VALUE_THEN_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d|true|false|null)\s*\{").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([\]}])").unwrap());
static LEADING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\[{])\s*,").unwrap());

/// Drop the byte-order mark and non-printable control characters.
///
/// JSON's own insignificant whitespace (`\n`, `\r`, `\t`) survives; raw
/// control bytes that some gateways leak into the text do not.
pub(crate) fn strip_control_characters(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\u{feff}' && (!c.is_control() || matches!(c, '\n' | '\r' | '\t')))
        .collect()
}

/// `}{` to `},{`: missing comma between adjacent objects.
pub(crate) fn comma_between_objects(text: &str) -> String {
    OBJECT_SEAM.replace_all(text, "},{").into_owned()
}

/// `][` to `],[`: missing comma between adjacent arrays.
pub(crate) fn comma_between_arrays(text: &str) -> String {
    ARRAY_SEAM.replace_all(text, "],[").into_owned()
}

/// `85"key"` / `true"key"` to `85,"key"`: missing comma between a bare
/// value and the next quoted key.
pub(crate) fn comma_after_bare_value(text: &str) -> String {
    VALUE_THEN_KEY
        .replace_all(text, "${1},\"${2}")
        .into_owned()
}

/// `true{` / `85{` to `true,{`: missing comma between a bare literal and
/// the next object opener.
pub(crate) fn comma_before_object(text: &str) -> String {
    VALUE_THEN_OBJECT.replace_all(text, "${1},{").into_owned()
}

/// `[1,2,]` to `[1,2]`: trailing comma before a closing bracket/brace.
pub(crate) fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "${1}").into_owned()
}

/// `{,"key"` to `{"key"`: leading comma after an opening bracket/brace.
pub(crate) fn strip_leading_commas(text: &str) -> String {
    LEADING_COMMA.replace_all(text, "${1}").into_owned()
}

/// Apply every repair rule once, in the fixed order.
pub fn apply_rules(text: &str) -> String {
    let text = strip_control_characters(text);
    let text = comma_between_objects(&text);
    let text = comma_between_arrays(&text);
    let text = comma_after_bare_value(&text);
    let text = comma_before_object(&text);
    let text = strip_trailing_commas(&text);
    strip_leading_commas(&text)
}
