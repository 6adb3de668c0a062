//! JSON error envelopes.
//!
//! Every failure is answered with `{error?, message, details?}`. The
//! `error` flag is only present on the routes whose clients expect it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use civic_llm::model::truncate_with_ellipsis;
use serde::Serialize;
use std::any::Any;
use std::fmt::Display;

const DETAILS_LIMIT: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: None,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Set `error: true` in the envelope.
    pub fn flagged(mut self) -> Self {
        self.body.error = Some(true);
        self
    }

    /// Attach `details`, cut to 300 characters.
    pub fn with_details(mut self, details: impl Display) -> Self {
        self.body.details = Some(truncate_with_ellipsis(&details.to_string(), DETAILS_LIMIT));
        self
    }
}

impl ApiError {
    /// A body that was sent as JSON but could not be read or decoded.
    pub fn invalid_body(err: impl Display) -> Self {
        tracing::debug!(error = %err, "api.request.rejected");
        ApiError::bad_request("Invalid request body")
            .flagged()
            .with_details(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Response used by `CatchPanicLayer` when a handler panics.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(%details, "api.handler.panicked");
    ApiError::internal("Failed to process request")
        .flagged()
        .with_details(details)
        .into_response()
}
