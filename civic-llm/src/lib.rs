//! Plain-language explanation pipeline for CivicSense.
//!
//! A request flows through the crate leaf-first:
//!
//! 1. [`prompt::build_explanation_prompt`] turns an [`model::ExplanationRequest`]
//!    into an instruction string.
//! 2. A [`traits::TextCompletion`] implementation (the [`gemini::GeminiClient`]
//!    in production) returns raw model text.
//! 3. [`extract::extract_explanation`] finds the embedded JSON object and
//!    checks its shape.
//! 4. [`model::ExplanationResult::assemble`] stamps an id, query echo and
//!    timestamp onto the validated payload.
//! 5. For fact checks, [`rating::classify`] derives a [`rating::FactRating`].
//!
//! [`explainer::PolicyExplainer`] wires these stages together with an
//! [`cache::ExplanationCache`].
//!
//! # Examples
//! ```no_run
//! use civic_llm::cache::MemoryExplanationCache;
//! use civic_llm::explainer::PolicyExplainer;
//! use civic_llm::gemini::GeminiClient;
//! use civic_llm::model::ExplanationRequest;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key".into(), "gemini-2.0-flash".into())?;
//! let explainer = PolicyExplainer::new(Arc::new(client), Arc::new(MemoryExplanationCache::new()));
//! let request = ExplanationRequest::new("Right to Information Act, 2005")?;
//! let result = explainer.explain_by_text(&request).await?;
//! println!("{}", result.summary);
//! # Ok(())
//! # }
//! ```
pub mod cache;
pub mod explainer;
pub mod extract;
pub mod gemini;
pub mod model;
pub mod prompt;
pub mod rating;
pub mod traits;

pub use explainer::{ExplainError, PolicyExplainer};
pub use traits::{LlmError, LlmResponse, TextCompletion};
