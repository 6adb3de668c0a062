//! Common types and utilities shared across CivicSense crates.
//!
//! This crate holds the workspace-wide error type and the observability
//! helpers. It is intentionally lightweight so that every crate can depend
//! on it without pulling in the HTTP or LLM stacks.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`CivicError`] and [`Result`]: Startup and infrastructure errors
//!
//! # Examples
//!
//! ```rust
//! use civic_common::CivicError;
//!
//! let err = CivicError::MissingCredential("GEMINI_API_KEY".into());
//! assert_eq!(err.to_string(), "Missing credential: GEMINI_API_KEY is not set");
//! ```

pub mod observability;

/// Error types for process-level concerns (configuration, startup, serving).
///
/// Per-request pipeline failures live in `civic-llm` so the HTTP layer can
/// match on them directly.
#[derive(thiserror::Error, Debug)]
pub enum CivicError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required secret was not supplied. Fatal at startup.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    /// The HTTP server failed to bind or stopped with an error.
    #[error("Server error: {0}")]
    Server(String),
}

/// Convenient alias for results that use [`CivicError`].
pub type Result<T> = std::result::Result<T, CivicError>;
