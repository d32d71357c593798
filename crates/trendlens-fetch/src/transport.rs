//! The transport seam between the retry loop and the network.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// How much response body to keep in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// One GET request returning a JSON body.
///
/// The retry loop only sees this trait, so its policy can be exercised with
/// a scripted double instead of a live upstream.
#[async_trait]
pub trait TrendTransport: Send + Sync {
    /// Issue a GET to `url` with the given query parameters.
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TrendTransport for HttpTransport {
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_LEN {
        body.to_string()
    } else {
        let mut cut: String = body.chars().take(BODY_EXCERPT_LEN).collect();
        cut.push_str("...");
        cut
    }
}

/// Scripted transport double for tests.
///
/// Responses are consumed front-to-back, one per attempt; once the script
/// runs dry every further call fails. Exposed publicly (not test-gated) so
/// downstream crates can drive the pipeline without a network.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<u32>,
}

impl MockTransport {
    /// A transport that answers each attempt with the next scripted result.
    pub fn with_script(script: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    /// A transport that fails every attempt.
    pub fn always_failing() -> Self {
        Self::default()
    }

    /// How many GETs were issued.
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TrendTransport for MockTransport {
    async fn get(&self, _url: &str, _params: &[(String, String)]) -> Result<Value, TransportError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("connection refused".to_string())))
    }
}
