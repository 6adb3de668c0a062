use crate::model::truncate_with_ellipsis;
use crate::traits::{LlmError, LlmResponse, TextCompletion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<GeminiSafetySetting>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
}

/// Tuning knobs for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request timeout; the only deadline an explanation call has.
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Google Gemini `generateContent` client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    options: GeminiOptions,
}

impl GeminiClient {
    /// Create a client with default options.
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Self::with_options(api_key, model, GeminiOptions::default())
    }

    pub fn with_options(
        api_key: String,
        model: String,
        options: GeminiOptions,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("Gemini API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            options,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn generation_config(&self) -> Option<GeminiGenerationConfig> {
        if self.options.temperature.is_none() && self.options.max_output_tokens.is_none() {
            return None;
        }
        Some(GeminiGenerationConfig {
            temperature: self.options.temperature,
            max_output_tokens: self.options.max_output_tokens,
        })
    }

    fn create_safety_settings() -> Vec<GeminiSafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::Unauthorized,
        429 => LlmError::RateLimit,
        code => {
            let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
                .map(|env| env.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_with_ellipsis(body, 300));
            LlmError::Api {
                status: code,
                message,
            }
        }
    }
}

fn response_text(response: GeminiResponse) -> Result<(String, Option<String>, Option<u32>), LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Blocked(reason));
    }

    let tokens_used = response.usage_metadata.and_then(|u| u.total_token_count);
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(LlmError::Blocked("SAFETY".to_string()));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok((text, candidate.finish_reason, tokens_used))
}

#[async_trait]
impl TextCompletion for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let url = self.endpoint();
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation_config(),
            safety_settings: Some(Self::create_safety_settings()),
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "gemini.request");

        let resp = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = status_error(status, &body);
            tracing::warn!(%status, error = %err, "gemini.request.failed");
            return Err(err);
        }

        let body: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        let (text, finish_reason, tokens_used) = response_text(body)?;

        tracing::debug!(
            model = %self.model,
            tokens_used = ?tokens_used,
            response_prefix = %truncate_with_ellipsis(&text, 100),
            "gemini.response"
        );

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
