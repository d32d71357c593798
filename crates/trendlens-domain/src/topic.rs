//! Normalized hot-search topics.
//!
//! TianAPI's endpoints do not agree on field names: the Weibo endpoint calls
//! the title `hotword`, others use `word` or `title`, and the heat metric
//! appears as `hotnum`, `hot`, `hotwordnum` or `num` depending on the
//! interface. [`HotTopic::from_api_item`] flattens that variance into one
//! shape so everything downstream can forget where a topic came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder title for items the upstream returned without any usable name.
pub const UNKNOWN_TITLE: &str = "unknown topic";

/// One entry of a platform's hot-search ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotTopic {
    /// 1-based position in the upstream list.
    pub rank: u32,
    /// Topic title.
    pub title: String,
    /// Heat metric as reported upstream; `"N/A"` when absent.
    pub hot_value: String,
    /// Link to the topic page, if the endpoint provides one.
    #[serde(default)]
    pub url: String,
    /// Short description or tag, if the endpoint provides one.
    #[serde(default)]
    pub description: String,
}

impl HotTopic {
    /// Normalize a single raw API item.
    ///
    /// `rank` is the 1-based position of the item in the response list; the
    /// upstream payloads carry no explicit rank field.
    pub fn from_api_item(rank: u32, item: &Value) -> Self {
        let title = first_field(item, &["word", "title", "hotword"])
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let hot_value = first_field(item, &["hotnum", "hot", "hotwordnum", "num"])
            .unwrap_or_else(|| "N/A".to_string());
        let url = first_field(item, &["url"]).unwrap_or_default();
        let description =
            first_field(item, &["desc", "description", "hottag"]).unwrap_or_default();

        Self {
            rank,
            title,
            hot_value,
            url,
            description,
        }
    }
}

/// First present, non-empty field among `keys`, stringified.
///
/// Numeric values are rendered with `to_string` so heat counts survive
/// endpoints that report them as numbers rather than strings.
fn first_field(item: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match item.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weibo_style_item() {
        let item = json!({"hotword": "topic one", "hotwordnum": "1234567"});
        let topic = HotTopic::from_api_item(1, &item);
        assert_eq!(topic.rank, 1);
        assert_eq!(topic.title, "topic one");
        assert_eq!(topic.hot_value, "1234567");
        assert_eq!(topic.url, "");
    }

    #[test]
    fn test_word_takes_precedence_over_hotword() {
        let item = json!({"word": "primary", "hotword": "secondary"});
        let topic = HotTopic::from_api_item(3, &item);
        assert_eq!(topic.title, "primary");
    }

    #[test]
    fn test_numeric_hot_value_is_stringified() {
        let item = json!({"title": "t", "hotnum": 98765});
        let topic = HotTopic::from_api_item(2, &item);
        assert_eq!(topic.hot_value, "98765");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let item = json!({});
        let topic = HotTopic::from_api_item(9, &item);
        assert_eq!(topic.title, UNKNOWN_TITLE);
        assert_eq!(topic.hot_value, "N/A");
        assert_eq!(topic.description, "");
    }

    #[test]
    fn test_description_aliases() {
        let item = json!({"word": "w", "hottag": "tag text"});
        let topic = HotTopic::from_api_item(1, &item);
        assert_eq!(topic.description, "tag text");
    }

    #[test]
    fn test_empty_string_title_is_skipped() {
        let item = json!({"word": "", "title": "real title"});
        let topic = HotTopic::from_api_item(1, &item);
        assert_eq!(topic.title, "real title");
    }
}
