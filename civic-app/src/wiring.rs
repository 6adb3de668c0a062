use anyhow::{Context, Result};
use civic_api::AppState;
use civic_config::{CivicConfig, LlmProvider};
use civic_llm::PolicyExplainer;
use civic_llm::cache::MemoryExplanationCache;
use civic_llm::gemini::{GeminiClient, GeminiOptions};
use civic_llm::traits::TextCompletion;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Build the provider client, cache and explainer from config.
pub fn build_state(cfg: &CivicConfig) -> Result<AppState> {
    let api_key = cfg.llm.resolve_api_key()?;

    let llm: Arc<dyn TextCompletion> = match cfg.llm.provider {
        LlmProvider::Gemini => {
            let options = GeminiOptions {
                base_url: cfg.llm.base_url.clone(),
                connect_timeout: Duration::from_secs(cfg.llm.connect_timeout_secs),
                timeout: Duration::from_secs(cfg.llm.timeout_secs),
                temperature: cfg.llm.temperature,
                max_output_tokens: cfg.llm.max_output_tokens,
            };
            Arc::new(
                GeminiClient::with_options(api_key, cfg.llm.model.clone(), options)
                    .context("building Gemini client")?,
            )
        }
    };
    tracing::info!(provider = ?cfg.llm.provider, model = llm.model_name(), "llm.ready");

    let explainer = PolicyExplainer::new(llm, Arc::new(MemoryExplanationCache::new()));
    Ok(AppState::new(Arc::new(explainer)))
}

pub async fn run_until_ctrl_c(cfg: &CivicConfig, state: AppState) -> Result<()> {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown.requested");
                trigger.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "shutdown.signal_unavailable"),
        }
    });

    civic_api::serve(&cfg.server, state, shutdown).await?;
    Ok(())
}
