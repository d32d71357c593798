//! Persisted fetch snapshots.

use crate::platform::Platform;
use crate::topic::HotTopic;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The persisted form of one successful fetch: metadata from the upstream
/// response plus the normalized topic list.
///
/// Serialized verbatim to `{source}_raw_{timestamp}.json`; the analyze stage
/// reads this file back rather than re-fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Wall-clock fetch time, RFC 3339.
    pub fetch_time: String,
    /// Platform the topics were fetched from.
    pub source: Platform,
    /// Status code reported inside the API body, if present.
    pub api_code: Option<i64>,
    /// Status message reported inside the API body, if present.
    pub api_message: Option<String>,
    /// Normalized topics, in upstream rank order.
    pub topics: Vec<HotTopic>,
    /// Number of topics in the snapshot.
    pub total_count: usize,
    /// Compact timestamp used for the snapshot's file name.
    pub timestamp: String,
}

impl RawSnapshot {
    /// Build a snapshot from a validated API response body.
    ///
    /// `fetch_time` and `timestamp` are the same instant in the two formats
    /// the file contract needs (RFC 3339 for the payload, compact for the
    /// file name); the caller formats them so this type stays clock-free.
    pub fn new(
        source: Platform,
        body: &Value,
        topics: Vec<HotTopic>,
        fetch_time: String,
        timestamp: String,
    ) -> Self {
        let total_count = topics.len();
        Self {
            fetch_time,
            source,
            api_code: body.get("code").and_then(Value::as_i64),
            api_message: body
                .get("msg")
                .and_then(Value::as_str)
                .map(str::to_string),
            topics,
            total_count,
            timestamp,
        }
    }
}

/// Extract the list of raw topic items from a TianAPI response body.
///
/// The `result` member is an array on some endpoints and an object with a
/// `list` array on others; both shapes are accepted. Anything else yields an
/// empty list.
pub fn topic_items(body: &Value) -> Vec<&Value> {
    match body.get("result") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => match map.get("list") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
