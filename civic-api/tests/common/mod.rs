#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use civic_api::{router, AppState};
use civic_common::observability::LogConfig;
use civic_llm::cache::MemoryExplanationCache;
use civic_llm::{LlmError, LlmResponse, PolicyExplainer, TextCompletion};
use serde_json::Value;
use tower::ServiceExt;

pub const DPDP_REPLY: &str = r#"Here you go: {"summary":"A data law.","explanation":"It protects personal data and sets rules for processors.","keyPoints":["Defines rights","Sets obligations","Creates an authority"]}"#;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "civicsense-api-tests",
            log_dir: Some(std::env::temp_dir().join("civicsense-tests")),
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };
        civic_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub enum Script {
    Reply(String),
    Fail,
    Panic,
}

/// Stub provider that counts how often it was called.
pub struct CountingClient {
    script: Script,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CountingClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextCompletion for CountingClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("stub".into()),
                tokens_used: None,
                finish_reason: Some("STOP".into()),
            }),
            Script::Fail => Err(LlmError::Api {
                status: 503,
                message: "The model is overloaded.".into(),
            }),
            Script::Panic => panic!("stub provider exploded"),
        }
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

pub fn app(script: Script) -> (Router, Arc<CountingClient>) {
    init_test_tracing();
    let llm = Arc::new(CountingClient {
        script,
        calls: AtomicUsize::new(0),
        prompts: Mutex::new(Vec::new()),
    });
    let explainer = PolicyExplainer::new(llm.clone(), Arc::new(MemoryExplanationCache::new()));
    (router(AppState::new(Arc::new(explainer))), llm)
}

pub fn reply(text: &str) -> Script {
    Script::Reply(text.to_string())
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body and no content type.
pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
