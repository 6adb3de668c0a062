use axum::routing::{get, post};
use axum::Router;
use civic_common::CivicError;
use civic_config::ServerSettings;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::panic_response;
use crate::handlers;
use crate::state::AppState;

/// Build the `/api` router with logging, CORS and panic recovery applied.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/explain-policy", post(handlers::explain_policy))
        .route("/fact-check", post(handlers::fact_check))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn serve(
    settings: &ServerSettings,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), CivicError> {
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CivicError::Server(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, model = state.explainer.model_name(), "server.listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| CivicError::Server(format!("server error: {e}")))?;

    tracing::info!("server.stopped");
    Ok(())
}
