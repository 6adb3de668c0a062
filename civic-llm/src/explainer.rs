//! Orchestration of the explanation pipeline.
//!
//! [`PolicyExplainer`] is shared behind an `Arc` by every request handler.
//! The only suspension point is the provider call; prompt building,
//! extraction, assembly and cache access are synchronous.

use crate::cache::ExplanationCache;
use crate::extract::{extract_explanation, ExtractError, ExtractedExplanation};
use crate::model::{
    truncate_with_ellipsis, ExplanationRequest, ExplanationResult, FactCheckResult, IdGenerator,
    ValidationError, POLICY_QUERY_ECHO_LIMIT,
};
use crate::prompt::build_explanation_prompt;
use crate::traits::{LlmError, TextCompletion};
use chrono::Utc;
use std::sync::Arc;

const PLACEHOLDER_KEY_POINTS: [&str; 3] = [
    "This is a sample key point for demonstration purposes.",
    "The actual explanation would be generated by the Gemini API.",
    "This is placeholder content only.",
];

#[derive(thiserror::Error, Debug)]
pub enum ExplainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("AI service call failed: {0}")]
    Service(#[from] LlmError),

    #[error("AI response could not be used: {0}")]
    Extract(#[from] ExtractError),
}

impl ExplainError {
    /// Caller mistakes, as opposed to provider or parsing failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub struct PolicyExplainer {
    llm: Arc<dyn TextCompletion>,
    cache: Arc<dyn ExplanationCache>,
    ids: IdGenerator,
}

impl PolicyExplainer {
    pub fn new(llm: Arc<dyn TextCompletion>, cache: Arc<dyn ExplanationCache>) -> Self {
        Self {
            llm,
            cache,
            ids: IdGenerator::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Always regenerates; failures propagate to the caller.
    pub async fn explain_by_text(
        &self,
        request: &ExplanationRequest,
    ) -> Result<ExplanationResult, ExplainError> {
        self.generate(request, POLICY_QUERY_ECHO_LIMIT).await
    }

    /// Cache-backed variant keyed by the raw query.
    ///
    /// Only an empty query fails. A miss that cannot be generated is
    /// answered with a stored placeholder instead of an error.
    pub async fn explain_by_query(&self, query: &str) -> Result<ExplanationResult, ExplainError> {
        if query.trim().is_empty() {
            return Err(ValidationError::MissingField("query").into());
        }

        if let Some(hit) = self.cache.lookup(query) {
            tracing::debug!(id = hit.id, "explain.cache.hit");
            return Ok(hit);
        }
        tracing::debug!(query = %truncate_with_ellipsis(query, 50), "explain.cache.miss");

        let request = ExplanationRequest::new(query)?;
        let result = match self.generate(&request, POLICY_QUERY_ECHO_LIMIT).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "explain.fallback.placeholder");
                self.placeholder(query)
            }
        };

        self.cache.store(query, result.clone());
        Ok(result)
    }

    /// Explain the claim, then rate it from the explanation's wording.
    pub async fn fact_check(
        &self,
        request: &ExplanationRequest,
    ) -> Result<FactCheckResult, ExplainError> {
        let explanation = self.generate(request, POLICY_QUERY_ECHO_LIMIT).await?;
        let result =
            FactCheckResult::from_explanation(self.ids.next_id(), explanation, request.text());

        tracing::info!(id = result.id, rating = %result.fact_rating, "factcheck.rated");
        Ok(result)
    }

    async fn generate(
        &self,
        request: &ExplanationRequest,
        echo_limit: usize,
    ) -> Result<ExplanationResult, ExplainError> {
        let prompt = build_explanation_prompt(request);

        let response = self.llm.complete(&prompt).await.map_err(|e| {
            tracing::warn!(model = self.llm.model_name(), error = %e, "explain.service_failed");
            e
        })?;

        let payload = extract_explanation(&response.text).map_err(|e| {
            log_extract_failure(&e);
            e
        })?;

        Ok(ExplanationResult::assemble(
            self.ids.next_id(),
            payload,
            request.text(),
            echo_limit,
            Utc::now(),
        ))
    }

    fn placeholder(&self, query: &str) -> ExplanationResult {
        let payload = ExtractedExplanation {
            summary: format!("Summary of {query}"),
            explanation: format!(
                "This is a simplified explanation of {query}. In a real implementation, \
                 this would be generated by the AI service based on the actual content \
                 of the policy or law."
            ),
            key_points: PLACEHOLDER_KEY_POINTS.iter().map(|p| p.to_string()).collect(),
        };
        ExplanationResult::assemble(
            self.ids.next_id(),
            payload,
            query,
            POLICY_QUERY_ECHO_LIMIT,
            Utc::now(),
        )
    }
}

fn log_extract_failure(err: &ExtractError) {
    match err {
        ExtractError::NoJsonFound => tracing::warn!("explain.extract.no_json"),
        ExtractError::MalformedJson { source, fragment } => tracing::warn!(
            error = %source,
            fragment = %truncate_with_ellipsis(fragment, 200),
            "explain.extract.malformed_json"
        ),
        ExtractError::InvalidStructure(reason) => {
            tracing::warn!(%reason, "explain.extract.invalid_structure")
        }
    }
}
