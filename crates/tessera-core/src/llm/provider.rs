//! Model provider boundary
//!
//! The engine never talks HTTP. Callers hand it an `Arc<dyn ModelProvider>`
//! wrapping whatever client they use.

use super::messages::Message;
use crate::tools::{ToolCall, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Everything a provider needs for one model call
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: &'a str,
    pub messages: &'a [Message],
    /// Output tool first, then helper tools
    pub tools: &'a [ToolDescriptor],
    /// Providers may watch this to abort in-flight transport work
    pub cancellation: &'a CancellationToken,
}

/// One model reply: free text, tool calls, or both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage = Some(TokenUsage::new(input_tokens, output_tokens));
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Provider failures; every kind ends the execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("token limit exceeded: {message}")]
    TokenLimitExceeded { message: String },

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl ModelError {
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn token_limit(message: impl Into<String>) -> Self {
        Self::TokenLimitExceeded {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Sends one request to a model and returns its reply
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn invoke(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut usage = TokenUsage::default();
        usage += TokenUsage::new(10, 5);
        usage += TokenUsage::new(3, 2);
        assert_eq!(usage, TokenUsage::new(13, 7));
        assert_eq!(usage.total(), 20);
    }

    #[test]
    fn test_response_constructors() {
        let response = ModelResponse::text("{}").with_usage(1, 2);
        assert_eq!(response.text.as_deref(), Some("{}"));
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage, Some(TokenUsage::new(1, 2)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ModelError::rate_limited("slow down", Some(30)).to_string(),
            "rate limited: slow down"
        );
    }
}
