//! Error types for the Execution Backend and Profile Parser (§7.1).

use thiserror::Error;

/// Failures surfaced by a [`crate::backend::Backend`] operation. Every
/// variant maps to "transport error" in the Case Runner's failure model
/// (§4.A) — callers that need a `JudgeVerdict` reduce this themselves.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend I/O error: {0}")]
    Io(String),
    #[error("command timed out after {0}s")]
    Timeout(u64),
    #[error("backend transport error: {0}")]
    Transport(String),
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e.to_string())
    }
}

impl From<BackendError> for olympus_common::EngineError {
    fn from(e: BackendError) -> Self {
        olympus_common::EngineError::Backend(e.to_string())
    }
}

/// Failures the Profile Parser cannot translate into a `JudgeVerdict`
/// by itself (§4.B rule 4: "fields missing/invalid" is instead surfaced
/// to the Case Runner as `JudgeVerdict::InternalError` directly, so this
/// type is only for malformed input the caller never even gets to rule
/// 4 with — e.g. the record isn't even attemptable as text).
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile record is not valid UTF-8")]
    NotUtf8,
}
