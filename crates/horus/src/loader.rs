//! Problem loader interface (§6 "Problem loader interface").
//!
//! The engine defines the loading contract as a trait with no bundled
//! implementation: fetching problem statements, seed lists and
//! standings from wherever they actually live is deployment-specific
//! and out of scope. A [`FixtureLoader`] is provided for tests (and for
//! downstream crates exercising `Session` without a real backing
//! store), built entirely from in-memory data.

use async_trait::async_trait;
use olympus_common::{Problem, RankPerformanceMap, RelativeResults, Standings};

use crate::error::SessionError;

/// Everything [`crate::registry::SessionRegistry::start_session`] needs
/// to construct a `Session` (§6 "Problem loader interface" return
/// tuple, plus the optional one-per-contest `RelativeResults` table
/// §3.1 describes private_eval as needing).
#[derive(Debug, Clone)]
pub struct LoadedProblem {
    pub problem: Problem,
    pub public_seeds: Vec<u64>,
    pub private_seeds: Vec<u64>,
    pub standings: Standings,
    pub rank_performance_map: RankPerformanceMap,
    pub relative_results: Option<RelativeResults>,
}

/// Loads everything about a problem needed to start a session. The
/// engine ships no implementation that reaches a real database or
/// object store; a caller's deployment wires one up (§6.1).
///
/// Implementations should be idempotent and may cache: `load_problem`
/// can be called once per session start, or once per server and reused
/// across many sessions for the same `problem_id`.
#[async_trait]
pub trait ProblemLoader: Send + Sync {
    async fn load_problem(&self, problem_id: &str, lite: bool) -> Result<LoadedProblem, SessionError>;
}

/// In-memory [`ProblemLoader`] over a fixed table of problems, useful
/// for tests and for exercising `Session` without a real loader.
#[cfg(any(test, feature = "fixtures"))]
pub struct FixtureLoader {
    problems: std::collections::HashMap<String, LoadedProblem>,
}

#[cfg(any(test, feature = "fixtures"))]
impl FixtureLoader {
    pub fn new() -> Self {
        Self {
            problems: std::collections::HashMap::new(),
        }
    }

    pub fn with_problem(mut self, loaded: LoadedProblem) -> Self {
        self.problems.insert(loaded.problem.problem_id.clone(), loaded);
        self
    }
}

#[cfg(any(test, feature = "fixtures"))]
impl Default for FixtureLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "fixtures"))]
#[async_trait]
impl ProblemLoader for FixtureLoader {
    async fn load_problem(&self, problem_id: &str, _lite: bool) -> Result<LoadedProblem, SessionError> {
        self.problems
            .get(problem_id)
            .cloned()
            .ok_or_else(|| SessionError::InvalidArgument(format!("unknown problem_id `{problem_id}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use olympus_common::{ProblemType, ScoreType};
    use std::path::PathBuf;

    fn sample_problem() -> LoadedProblem {
        let now = Utc::now();
        LoadedProblem {
            problem: Problem {
                problem_id: "p1".to_string(),
                problem_type: ProblemType::Batch,
                score_type: ScoreType::Maximize,
                time_limit_seconds: 2.0,
                memory_limit_bytes: 256 * 1024 * 1024,
                tool_dir: PathBuf::from("/tmp/p1"),
                start_at: now,
                end_at: now + Duration::hours(2),
                lenient_public_scoring: false,
                visualisation_known_empty: false,
            },
            public_seeds: vec![1, 2, 3],
            private_seeds: vec![4, 5, 6],
            standings: Standings::new(vec![(1, 100), (2, 80)]).unwrap(),
            rank_performance_map: RankPerformanceMap::new(vec![(1.0, 3000.0), (2.0, 2500.0)]).unwrap(),
            relative_results: None,
        }
    }

    #[tokio::test]
    async fn fixture_loader_returns_registered_problem() {
        let loader = FixtureLoader::new().with_problem(sample_problem());
        let loaded = loader.load_problem("p1", false).await.unwrap();
        assert_eq!(loaded.public_seeds, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fixture_loader_rejects_unknown_problem() {
        let loader = FixtureLoader::new();
        assert!(loader.load_problem("missing", false).await.is_err());
    }
}
