//! Anthropic messages API provider.
//!
//! Speaks the `POST /v1/messages` protocol, which several gateways expose
//! compatibly; the base URL is therefore configurable while the credential
//! always comes from `ANTHROPIC_API_KEY`.

use crate::{LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Protocol version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default request timeout (large responses take a while to stream out).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Messages API client.
pub struct AnthropicProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    /// Create a provider with an explicit credential.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        })
    }

    /// Create a provider taking the credential from `ANTHROPIC_API_KEY`.
    pub fn from_env(
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(LlmError::MissingCredential)?;
        Self::new(base_url, api_key, model, max_tokens)
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.messages_url();
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        info!("calling model '{}' at {}", self.model, url);
        debug!("prompt length: {} chars", prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(300).collect::<String>()
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .find(|text| !text.is_empty())
            .ok_or_else(|| {
                LlmError::InvalidResponse("response contains no text content".to_string())
            })?;

        debug!("response length: {} chars", text.len());
        Ok(text)
    }
}
