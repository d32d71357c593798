//! Trendlens LLM Provider Layer
//!
//! Pluggable text-in/text-out LLM providers. The pipeline treats inference
//! as an opaque function of the prompt; everything model-specific lives
//! behind the [`LlmProvider`] trait.
//!
//! # Providers
//!
//! - [`AnthropicProvider`]: messages API client, usable against Anthropic
//!   or any compatible gateway via a base-URL override
//! - [`MockProvider`]: deterministic double for tests
//!
//! # Examples
//!
//! ```
//! use trendlens_llm::{LlmProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("[]");
//! let text = provider.generate("score these topics").await.unwrap();
//! assert_eq!(text, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

pub use anthropic::AnthropicProvider;

/// Errors that can occur during LLM operations.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error.
    #[error("communication error: {0}")]
    Communication(String),

    /// The API answered but the response was not usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The `ANTHROPIC_API_KEY` credential is not set.
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingCredential,
}

/// An opaque text-in/text-out inference call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Deterministic provider double for tests.
///
/// Returns a fixed response without any network traffic and counts how
/// often it was called. Exposed publicly so downstream crates can drive
/// the pipeline in their own tests.
#[derive(Debug)]
pub struct MockProvider {
    response: Result<String, String>,
    call_count: Mutex<usize>,
}

impl MockProvider {
    /// A provider that answers every prompt with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            call_count: Mutex::new(0),
        }
    }

    /// A provider that fails every call with a communication error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            call_count: Mutex::new(0),
        }
    }

    /// How many times [`LlmProvider::generate`] was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(LlmError::Communication(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_fixed_response() {
        let provider = MockProvider::new("canned");
        assert_eq!(provider.generate("anything").await.unwrap(), "canned");
        assert_eq!(provider.generate("else").await.unwrap(), "canned");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockProvider::failing("wire cut");
        let err = provider.generate("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::Communication(_)));
        assert_eq!(provider.call_count(), 1);
    }
}
