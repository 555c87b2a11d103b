//! Top-level error type the demo binary and cross-crate call sites
//! converge on. Each engine crate keeps its own narrow error enum at its
//! own boundary (`sisyphus::BackendError`, `minos::GenerationError`,
//! `horus::SessionError`, ...) and implements `From<ThatError> for
//! EngineError` locally, since the target type lives here and the source
//! type lives there — no circular crate dependency is needed.

use thiserror::Error;

/// Narrow top-level error type. Not meant to be pattern-matched upon by
/// the engine's own logic (that happens against the narrower per-crate
/// errors); this exists so the demo binary has one error type to bubble
/// up to `main` via `anyhow`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Execution backend failure (transport, timeout, I/O).
    #[error("backend error: {0}")]
    Backend(String),

    /// Input generation failed outright.
    #[error("generation error: {0}")]
    Generation(String),

    /// Judge invocation failed at the transport level (not a WA verdict).
    #[error("judge error: {0}")]
    Judge(String),

    /// Session guard rejected an action (budget, lifetime, argument).
    #[error("session error: {0}")]
    Session(String),

    /// Anything else that doesn't fit a narrower kind.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
