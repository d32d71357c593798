//! TianAPI request/response conventions.

use serde_json::Value;

/// Query parameters for a TianAPI hot-search request.
pub fn key_params(api_key: &str) -> Vec<(String, String)> {
    vec![("key".to_string(), api_key.to_string())]
}

/// Validate a TianAPI response body.
///
/// A usable body is a JSON object with `code == 200` and a `result` member;
/// anything else is reported as an invalid (retryable) response, with the
/// upstream's own `msg` quoted when it offers one.
pub fn validate_response(body: &Value) -> Result<(), String> {
    if !body.is_object() {
        return Err("response body is not a JSON object".to_string());
    }
    match body.get("code").and_then(Value::as_i64) {
        Some(200) => {}
        Some(code) => {
            let msg = body
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(format!("API returned code {code}: {msg}"));
        }
        None => return Err("response has no numeric 'code' field".to_string()),
    }
    if body.get("result").is_none() {
        return Err("response has no 'result' field".to_string());
    }
    Ok(())
}
