//! Error type for the Session State Machine (§7.1).

use thiserror::Error;

/// Failures a [`crate::session::Session`] action can raise. Every
/// variant but `Generation`/`Judge` originates inside the guard checks
/// themselves; user-program failures (CE/RE/TLE/MLE/WA) never surface
/// here, they arrive encoded in a `CaseResult` instead (§7).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the session has already finished")]
    SessionFinished,

    #[error("exceeded the maximum resource usage for `{action}`")]
    BudgetExceeded { action: &'static str },

    #[error("the next `{action}` is not allowed yet")]
    SubmissionIntervalViolation { action: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("`{0}` is not available on Session")]
    NotAvailable(&'static str),

    #[error("input generation failed: {0}")]
    Generation(#[from] minos::GenerationError),

    #[error("judge invocation failed: {0}")]
    Judge(#[from] minos::JudgeError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for olympus_common::EngineError {
    fn from(e: SessionError) -> Self {
        olympus_common::EngineError::Session(e.to_string())
    }
}
