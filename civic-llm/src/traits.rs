use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub finish_reason: Option<String>,
}

/// Failures of the external generation call.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid API key or access forbidden")]
    Unauthorized,

    #[error("Content blocked by provider: {0}")]
    Blocked(String),

    #[error("No content returned by the model")]
    EmptyResponse,

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A single-shot text generation service.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Generate text for the prompt. No retries are attempted here.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, LlmError>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
