use crate::extract::ExtractedExplanation;
use crate::rating::{self, FactRating};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Query echo length on the explain-policy paths.
pub const POLICY_QUERY_ECHO_LIMIT: usize = 50;
/// Claim echo length on the fact-check path.
pub const FACT_CHECK_CLAIM_LIMIT: usize = 200;
/// Fixed confidence reported with every fact check.
pub const FACT_CHECK_CONFIDENCE: f64 = 0.85;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Input precondition failures. Always a 400 at the HTTP layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// What kind of text the caller submitted. Only affects prompt phrasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationKind {
    #[default]
    Policy,
    Document,
    Claim,
}

impl ExplanationKind {
    /// Phrase naming the input inside the prompt.
    pub fn context_phrase(self) -> &'static str {
        match self {
            Self::Policy => "law or policy",
            Self::Document => "legal document",
            Self::Claim => "text",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Document => "document",
            Self::Claim => "claim",
        }
    }
}

// Tags are matched exactly; anything else, including `Policy`, is free text.
impl From<&str> for ExplanationKind {
    fn from(tag: &str) -> Self {
        match tag {
            "policy" => Self::Policy,
            "document" => Self::Document,
            _ => Self::Claim,
        }
    }
}

/// A validated request to explain a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRequest {
    text: String,
    kind: ExplanationKind,
    language: String,
}

impl ExplanationRequest {
    /// Build a request; `text` must contain something other than whitespace.
    ///
    /// ```
    /// use civic_llm::model::{ExplanationKind, ExplanationRequest, ValidationError};
    ///
    /// let req = ExplanationRequest::new("Motor Vehicles Act").unwrap();
    /// assert_eq!(req.kind(), ExplanationKind::Policy);
    /// assert_eq!(req.language(), "en");
    ///
    /// assert_eq!(
    ///     ExplanationRequest::new("  \n").unwrap_err(),
    ///     ValidationError::MissingField("text")
    /// );
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::MissingField("text"));
        }
        Ok(Self {
            text,
            kind: ExplanationKind::default(),
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_kind(mut self, kind: ExplanationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Blank languages fall back to [`DEFAULT_LANGUAGE`].
    pub fn with_language(mut self, language: &str) -> Self {
        let language = language.trim();
        self.language = if language.is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            language.to_string()
        };
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> ExplanationKind {
        self.kind
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Canonical output of the pipeline. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResult {
    pub id: i64,
    pub query: String,
    pub summary: String,
    pub explanation: String,
    pub key_points: Vec<String>,
    pub timestamp: String,
}

impl ExplanationResult {
    /// Wrap a validated payload with its id, query echo and timestamp.
    pub fn assemble(
        id: i64,
        payload: ExtractedExplanation,
        text: &str,
        echo_limit: usize,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            query: truncate_with_ellipsis(text, echo_limit),
            summary: payload.summary,
            explanation: payload.explanation,
            key_points: payload.key_points,
            timestamp: iso_timestamp(at),
        }
    }
}

/// A fact-check view of an [`ExplanationResult`] plus a heuristic rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheckResult {
    pub id: i64,
    pub claim: String,
    pub analysis: String,
    pub conclusion: String,
    pub fact_rating: FactRating,
    pub sources: Vec<String>,
    pub confidence: f64,
}

impl FactCheckResult {
    pub fn from_explanation(id: i64, explanation: ExplanationResult, text: &str) -> Self {
        let fact_rating = rating::classify(&explanation.explanation);
        Self {
            id,
            claim: truncate_with_ellipsis(text, FACT_CHECK_CLAIM_LIMIT),
            analysis: explanation.explanation,
            conclusion: explanation.summary,
            fact_rating,
            sources: explanation.key_points,
            confidence: FACT_CHECK_CONFIDENCE,
        }
    }
}

/// Keep the first `limit` characters and append `...` when anything was cut.
///
/// ```
/// use civic_llm::model::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("short", 50), "short");
/// assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
/// ```
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Time-based ids: epoch milliseconds, bumped past the previous id when two
/// results land in the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        self.next_after(Utc::now().timestamp_millis())
    }

    fn next_after(&self, now_ms: i64) -> i64 {
        let bump = |prev: i64| now_ms.max(prev + 1);
        let (Ok(prev) | Err(prev)) =
            self.last
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| Some(bump(prev)));
        bump(prev)
    }
}
