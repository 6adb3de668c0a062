use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use civic_llm::model::{ExplanationKind, ExplanationRequest, ExplanationResult};
use civic_llm::ExplainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/explain-policy`.
///
/// `text` selects the uncached contract. A body with only `query` is served
/// by the cache-backed contract instead.
#[derive(Debug, Default, Deserialize)]
pub struct ExplainPolicyBody {
    pub text: Option<String>,
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub language: Option<String>,
    /// Accepted for client compatibility; output is always the same shape.
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FactCheckBody {
    pub text: Option<String>,
    /// Older clients send the claim under this name.
    pub claim: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub language: Option<String>,
}

/// Text-contract reply: the result without its timestamp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationView {
    pub id: i64,
    pub query: String,
    pub explanation: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

impl From<ExplanationResult> for ExplanationView {
    fn from(result: ExplanationResult) -> Self {
        Self {
            id: result.id,
            query: result.query,
            explanation: result.explanation,
            summary: result.summary,
            key_points: result.key_points,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthView {
    pub status: &'static str,
    pub model: String,
    pub version: &'static str,
    pub uptime_secs: u64,
}

pub async fn explain_policy(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body: ExplainPolicyBody = decode_body(&headers, body)?;

    match (body.text, body.query) {
        (None, Some(query)) => explain_by_query(&state, &query).await,
        (text, _) => {
            if let Some(format) = body.format.as_deref() {
                tracing::debug!(format, "explain.format.ignored");
            }
            explain_by_text(
                &state,
                text.unwrap_or_default(),
                body.kind.as_deref(),
                body.language.as_deref(),
            )
            .await
        }
    }
}

async fn explain_by_text(
    state: &AppState,
    text: String,
    kind: Option<&str>,
    language: Option<&str>,
) -> Result<Response, ApiError> {
    let missing_text = || {
        ApiError::bad_request("Query is required")
            .with_details("Please provide 'text' in the request body")
    };

    let request = build_request(text, kind, ExplanationKind::Policy, language)
        .map_err(|_| missing_text())?;
    tracing::info!(kind = request.kind().as_str(), language = request.language(), "explain.request");

    match state.explainer.explain_by_text(&request).await {
        Ok(result) => Ok(Json(ExplanationView::from(result)).into_response()),
        Err(e) if e.is_validation() => Err(missing_text()),
        Err(e) => {
            tracing::error!(error = %e, "explain.failed");
            Err(ApiError::internal("AI service error").flagged().with_details(&e))
        }
    }
}

async fn explain_by_query(state: &AppState, query: &str) -> Result<Response, ApiError> {
    tracing::info!("explain.query.request");

    match state.explainer.explain_by_query(query).await {
        Ok(result) => Ok(Json(result).into_response()),
        Err(e) if e.is_validation() => Err(ApiError::bad_request("Query is required")),
        Err(e) => {
            tracing::error!(error = %e, "explain.query.failed");
            Err(ApiError::internal("Failed to process request")
                .flagged()
                .with_details(&e))
        }
    }
}

pub async fn fact_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body: FactCheckBody = decode_body(&headers, body)?;
    let missing_text = || ApiError::bad_request("Text content is required").flagged();

    let text = body.text.or(body.claim).unwrap_or_default();
    let request = build_request(
        text,
        body.kind.as_deref(),
        ExplanationKind::Claim,
        body.language.as_deref(),
    )
    .map_err(|_| missing_text())?;
    tracing::info!(kind = request.kind().as_str(), "factcheck.request");

    match state.explainer.fact_check(&request).await {
        Ok(result) => Ok(Json(result).into_response()),
        Err(ExplainError::Validation(_)) => Err(missing_text()),
        Err(e) => {
            tracing::error!(error = %e, "factcheck.failed");
            Err(ApiError::internal("Failed to analyze content")
                .flagged()
                .with_details(&e))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthView> {
    Json(HealthView {
        status: "ok",
        model: state.explainer.model_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Read a JSON body leniently: no body, a blank body or a non-JSON content
/// type all read as `{}`, so the route reports the missing field. Only a
/// JSON body that fails to parse is rejected.
fn decode_body<T: DeserializeOwned + Default>(
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ApiError> {
    let bytes = body.map_err(ApiError::invalid_body)?;
    if !is_json(headers) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(ApiError::invalid_body)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn build_request(
    text: String,
    kind: Option<&str>,
    default_kind: ExplanationKind,
    language: Option<&str>,
) -> Result<ExplanationRequest, ExplainError> {
    let kind = kind.map(ExplanationKind::from).unwrap_or(default_kind);
    let request = ExplanationRequest::new(text)?.with_kind(kind);
    Ok(match language {
        Some(language) => request.with_language(language),
        None => request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_body_reads_type_field() {
        let body: ExplainPolicyBody =
            serde_json::from_str(r#"{"text":"t","type":"document","format":"simple"}"#).unwrap();
        assert_eq!(body.kind.as_deref(), Some("document"));
        assert_eq!(body.format.as_deref(), Some("simple"));
        assert!(body.query.is_none());
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        headers
    }

    #[test]
    fn missing_or_non_json_body_reads_as_empty_object() {
        let body: FactCheckBody = decode_body(&HeaderMap::new(), Ok(Bytes::new())).unwrap();
        assert!(body.text.is_none() && body.claim.is_none());

        let body: FactCheckBody =
            decode_body(&json_headers(), Ok(Bytes::from_static(b"  \n"))).unwrap();
        assert!(body.text.is_none());

        let body: ExplainPolicyBody =
            decode_body(&HeaderMap::new(), Ok(Bytes::from_static(br#"{"text":"x"}"#))).unwrap();
        assert!(body.text.is_none(), "non-JSON content type is not parsed");
    }

    #[test]
    fn broken_json_body_is_rejected() {
        let broken = Bytes::from_static(b"{not json");
        let err = decode_body::<ExplainPolicyBody>(&json_headers(), Ok(broken)).unwrap_err();
        assert_eq!(err.body.message, "Invalid request body");
        assert_eq!(err.body.error, Some(true));
    }

    #[test]
    fn request_defaults_follow_route() {
        let req = build_request("x".into(), None, ExplanationKind::Claim, None).unwrap();
        assert_eq!(req.kind(), ExplanationKind::Claim);
        assert_eq!(req.language(), "en");

        let req = build_request("x".into(), Some("policy"), ExplanationKind::Claim, Some("ta"))
            .unwrap();
        assert_eq!(req.kind(), ExplanationKind::Policy);
        assert_eq!(req.language(), "ta");
    }

    #[test]
    fn blank_text_is_a_validation_error() {
        let err = build_request(" \t".into(), None, ExplanationKind::Policy, None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn view_drops_timestamp() {
        let view = ExplanationView::from(ExplanationResult {
            id: 7,
            query: "q".into(),
            summary: "s".into(),
            explanation: "e".into(),
            key_points: vec!["k".into()],
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        });
        let json = serde_json::to_value(view).unwrap();
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["keyPoints"][0], "k");
    }
}
