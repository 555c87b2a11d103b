//! A session-oriented benchmarking engine for score-based heuristic
//! programming contests.
//!
//! This crate is the facade over the engine workspace: it wires the
//! Execution Backend (`sisyphus`), Case Runner and Input Generator
//! (`minos`), and Session State Machine (`horus`) together behind one
//! `Config` and one `SessionRegistry`, the way a deployment would. The
//! actual pipeline logic lives in those crates; this crate only
//! provides the env-driven configuration layer (§6, §6.1) and
//! re-exports the public surface a caller drives a benchmarking run
//! through.

pub mod config;
pub mod loader;

pub use config::{Config, ConfigError};
pub use loader::FileProblemLoader;

pub use horus::{LoadedProblem, ProblemLoader, RunCasesArgs, Session, SessionConfig, SessionError, SessionId, SessionRegistry};
pub use minos::{generate_inputs, run_cases, run_code, CodeRunOutcome, CodeRunRequest, GenerationError, JudgeError, RunCasesRequest};
pub use olympus_common::error::EngineResult;
pub use olympus_common::{CaseResult, EngineError, EvaluationResult, Problem, ResourceUsage};
pub use sisyphus::{Backend, LocalBackend, SandboxBackend};

#[cfg(any(test, feature = "fixtures"))]
pub use horus::FixtureLoader;
