use civic_llm::PolicyExplainer;
use std::sync::Arc;
use std::time::Instant;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub explainer: Arc<PolicyExplainer>,
    /// Process start, for the uptime reported by `/api/health`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(explainer: Arc<PolicyExplainer>) -> Self {
        Self {
            explainer,
            started_at: Instant::now(),
        }
    }
}
