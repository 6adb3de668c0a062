//! HTTP surface of CivicSense.
//!
//! Every route lives under `/api`:
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /api/explain-policy` | [`handlers::explain_policy`] |
//! | `POST /api/fact-check` | [`handlers::fact_check`] |
//! | `GET /api/health` | [`handlers::health`] |
//!
//! Handlers validate input, delegate to [`civic_llm::PolicyExplainer`] and
//! map its errors onto the JSON envelopes in [`error`].
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, serve};
pub use state::AppState;
