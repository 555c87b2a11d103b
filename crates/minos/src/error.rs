//! Error types for the Case Runner and Input Generator Wrapper (§7.1).

use thiserror::Error;

/// A failure that prevents producing even one `CaseResult` for a case
/// because there is no case to attach it to yet (§4.D.1).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator exited with non-zero status: {0}")]
    NonZeroExit(String),
    #[error("generator did not produce an `in/` directory")]
    MissingOutputDir,
    #[error("generator output file names did not match the zero-padded sequential scheme: {0}")]
    NamingMismatch(String),
    #[error("generator timed out after {0}s")]
    Timeout(u64),
    #[error("backend error during generation: {0}")]
    Backend(#[from] sisyphus::BackendError),
}

impl From<GenerationError> for olympus_common::EngineError {
    fn from(e: GenerationError) -> Self {
        olympus_common::EngineError::Generation(e.to_string())
    }
}

/// Failures in the Case Runner that aren't representable as a
/// `CaseResult` for a single case — i.e. compilation-phase failures
/// that apply uniformly to every case, or backend-level transport
/// errors the runner can't reduce to a verdict itself.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("backend error: {0}")]
    Backend(#[from] sisyphus::BackendError),
    #[error("unsupported language/toolchain combination: {0:?} / {1}")]
    UnsupportedToolchain(olympus_common::Language, String),
}

impl From<JudgeError> for olympus_common::EngineError {
    fn from(e: JudgeError) -> Self {
        olympus_common::EngineError::Judge(e.to_string())
    }
}
