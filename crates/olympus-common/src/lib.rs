//! Shared data model and error types for the benchmarking engine.
//!
//! This crate owns every type that crosses a crate boundary inside the
//! workspace: the problem/session data model (§3 of the design doc), the
//! judge verdict vocabulary, and the top-level error enum other crates
//! convert into at their own boundary.

pub mod case_result;
pub mod error;
pub mod problem;
pub mod resource;
pub mod standings;
pub mod types;
pub mod wire;

pub use case_result::{CaseResult, EvaluationResult, JudgeVerdict, Visualisation, REJECTED_SENTINEL};
pub use error::EngineError;
pub use problem::{Language, Problem, ProblemType, ScoreType, ToolchainVersion};
pub use resource::ResourceUsage;
pub use standings::{RankPerformanceMap, RelativeResults, RelativeScoreType, Standings};
pub use types::*;
